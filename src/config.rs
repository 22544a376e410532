use dirs::home_dir;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Optional defaults stored in ~/.mbrew.yml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Get the path to the default configuration file (~/.mbrew.yml)
pub fn get_config_path() -> Result<PathBuf> {
    let home =
        home_dir().ok_or_else(|| Error::Config("Failed to determine home directory".to_string()))?;
    Ok(home.join(".mbrew.yml"))
}

/// Load configuration from `path`. A missing file yields an empty config.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        debug!("No configuration file at {}", path.display());
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)?;

    // An empty file parses as YAML null, treat it like a missing one
    if content.trim().is_empty() {
        return Ok(Config::default());
    }

    let config: Config = serde_yaml::from_str(&content)?;
    debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Load configuration from ~/.mbrew.yml
pub fn load_config() -> Result<Config> {
    load_config_from(&get_config_path()?)
}
