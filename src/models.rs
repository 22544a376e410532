use serde::Serialize;

use crate::types::Device;

/// Display-oriented projection of a device, as listed by `get-minibrew-devices`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSummary {
    #[serde(rename = "Serial Number")]
    pub serial_number: Option<String>,
    #[serde(rename = "Nickname")]
    pub title: Option<String>,
    #[serde(rename = "Version")]
    pub software_version: Option<String>,
    #[serde(rename = "Is online")]
    pub online: Option<bool>,
    #[serde(rename = "Stage")]
    pub stage: Option<String>,
}

impl From<&Device> for DeviceSummary {
    fn from(device: &Device) -> Self {
        Self {
            serial_number: device.serial_number.clone(),
            title: device.title.clone(),
            software_version: device.software_version.clone(),
            online: device.online,
            stage: device.stage.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_serializes_with_display_keys() {
        let device = Device {
            uuid: Some("abc".to_string()),
            serial_number: Some("MB001".to_string()),
            title: Some("Craft One".to_string()),
            software_version: Some("2.1.0".to_string()),
            online: Some(true),
            stage: Some("Serving".to_string()),
            ..Device::default()
        };

        let json = serde_json::to_value(DeviceSummary::from(&device)).unwrap();
        assert_eq!(json["Serial Number"], "MB001");
        assert_eq!(json["Nickname"], "Craft One");
        assert_eq!(json["Version"], "2.1.0");
        assert_eq!(json["Is online"], true);
        assert_eq!(json["Stage"], "Serving");
        assert!(json.get("uuid").is_none());
    }
}
