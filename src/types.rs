use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One entry of the brewery overview.
///
/// The portal sends partial records for some devices, so nothing here is
/// required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Device {
    pub uuid: Option<String>,
    pub serial_number: Option<String>,
    pub device_type: Option<i64>,
    pub user_action: Option<i64>,
    pub process_type: Option<i64>,
    pub title: Option<String>,
    pub sub_title: Option<String>,
    pub session_id: Option<i64>,
    pub image: Option<String>,
    pub status_time: Option<i64>,
    pub stage: Option<String>,
    pub beer_name: Option<String>,
    pub recipe_version: Option<String>,
    pub beer_style: Option<String>,
    pub gravity: Option<String>,
    pub target_temp: Option<f64>,
    pub current_temp: Option<f64>,
    pub online: Option<bool>,
    pub updating: Option<bool>,
    pub needs_acid_cleaning: Option<bool>,
    pub is_starting: Option<bool>,
    pub software_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreweryOverview {
    pub brew_clean_idle: Vec<Device>,
    pub fermenting: Vec<Device>,
    pub serving: Vec<Device>,
    pub brew_acid_clean_idle: Vec<Device>,
}

impl BreweryOverview {
    /// Every device across the four status lists
    pub fn all_devices(&self) -> impl Iterator<Item = &Device> {
        self.brew_clean_idle
            .iter()
            .chain(self.fermenting.iter())
            .chain(self.serving.iter())
            .chain(self.brew_acid_clean_idle.iter())
    }

    /// Devices with a uuid, each uuid kept once at its first position.
    pub fn unique_devices(&self) -> Vec<&Device> {
        let mut seen = HashSet::new();
        self.all_devices()
            .filter(|&device| match device.uuid.as_deref() {
                Some(uuid) => seen.insert(uuid),
                None => false,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beer {
    pub id: i64,
    pub name: String,
    pub style_name: String,
    pub image: Option<String>,
}

/// Device state as embedded in a session record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDetails {
    pub uuid: String,
    pub serial_number: String,
    pub current_state: i64,
    pub process_type: i64,
    pub process_state: i64,
    pub user_action: i64,
    pub device_type: i64,
    pub connection_status: i64,
    pub last_time_online: String,
    pub software_version: String,
    pub custom_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub profile: i64,
    pub beer: Beer,
    pub device: DeviceDetails,
    pub status: i64,
    pub session_type: i64,
    pub pending_command_seq: i64,
    pub pending_command_type: i64,
    pub pending_command_error: i64,
    pub beer_recipe_id: i64,
    pub beer_recipe_version: String,
    pub brew_timestamp: Option<f64>,
    pub original_gravity: Option<f64>,
    pub timestamp_original_gravity: Option<f64>,
    pub is_brewpack: bool,
}
