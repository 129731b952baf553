//! Configuration management for sensor-registry.
//!
//! Configuration is a JSON document holding registry settings and the list
//! of sensors to register at startup. Sensor entries stay raw JSON here; they
//! are checked against the sensor spec schema when added, so one bad entry
//! is reported without rejecting the whole file.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::error::{Error, Result};
use crate::tracing::prelude::*;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "SENSOR_REGISTRY_CONFIG";

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Registry behaviour
    #[serde(default)]
    pub registry: RegistrySettings,

    /// Sensor specs, in registration order
    #[serde(default)]
    pub sensors: Vec<Value>,
}

/// Registry behaviour settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegistrySettings {
    /// Reject sensors whose alias is already registered. Off by default:
    /// aliases should be unique, but duplicates are accepted and lookups
    /// return the first match.
    #[serde(default)]
    pub unique_aliases: bool,
}

impl Config {
    /// Load configuration from the file named by `SENSOR_REGISTRY_CONFIG`,
    /// or defaults when it is unset.
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) => Self::load_from(path),
            Err(_) => {
                debug!("{} not set, using default configuration", CONFIG_ENV_VAR);
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Config = serde_json::from_str(&text)?;
        debug!(
            path = %path.display(),
            sensors = config.sensors.len(),
            "Loaded configuration"
        );
        Ok(config)
    }
}
