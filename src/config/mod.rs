#[cfg(test)]
pub mod config_test;
pub mod path;

use std::{io, path::Path, time::Duration};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants::{
        DEFAULT_JOYSTICK_ID, DEFAULT_PACING_INTERVAL_MS, DEFAULT_POLL_TIMEOUT_MS, IO4_PID, IO4_VID,
        MAX_JOYSTICK_ID, MAX_POLL_TIMEOUT_MS,
    },
    input::mapping::{default_bindings, AxisBinding, AxisMapping},
};

/// Represents all possible errors loading a [FeederConfig]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Hardware identity of the board to feed from
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case", default)]
pub struct DeviceMatch {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl Default for DeviceMatch {
    fn default() -> Self {
        Self {
            vendor_id: IO4_VID,
            product_id: IO4_PID,
        }
    }
}

/// Configuration of the feeder. Every field is optional in YAML.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case", default)]
pub struct FeederConfig {
    pub version: u32,
    pub kind: String,
    pub name: String,
    pub device: DeviceMatch,
    /// Virtual joystick device id (1-16)
    pub joystick_id: u8,
    /// Maximum time to wait for a single input report (1-100)
    pub poll_timeout_ms: u64,
    /// Delay at the end of every polling iteration. 0 disables pacing.
    pub pacing_interval_ms: u64,
    /// Axis bindings. Buttons are always mapped 1:1.
    pub axes: Vec<AxisBinding>,
}

impl Default for FeederConfig {
    fn default() -> Self {
        Self {
            version: 1,
            kind: "FeederConfig".to_string(),
            name: "Sega IO4".to_string(),
            device: DeviceMatch::default(),
            joystick_id: DEFAULT_JOYSTICK_ID,
            poll_timeout_ms: DEFAULT_POLL_TIMEOUT_MS,
            pacing_interval_ms: DEFAULT_PACING_INTERVAL_MS,
            axes: default_bindings(),
        }
    }
}

impl FeederConfig {
    /// Load a [FeederConfig] from the given YAML string
    pub fn from_yaml(content: String) -> Result<FeederConfig, LoadError> {
        let config: FeederConfig = serde_yaml::from_str(content.as_str())?;
        config.validate()?;
        Ok(config)
    }

    /// Load a [FeederConfig] from the given YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<FeederConfig, LoadError> {
        let file = std::fs::File::open(path)?;
        let config: FeederConfig = serde_yaml::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config as YAML
    pub fn to_yaml(&self) -> Result<String, LoadError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check that all values are within the ranges the feeder supports
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.joystick_id == 0 || self.joystick_id > MAX_JOYSTICK_ID {
            return Err(LoadError::Invalid(format!(
                "joystick_id must be between 1 and {MAX_JOYSTICK_ID}, got {}",
                self.joystick_id
            )));
        }
        if self.poll_timeout_ms == 0 || self.poll_timeout_ms > MAX_POLL_TIMEOUT_MS {
            return Err(LoadError::Invalid(format!(
                "poll_timeout_ms must be between 1 and {MAX_POLL_TIMEOUT_MS}, got {}",
                self.poll_timeout_ms
            )));
        }
        for binding in self.axes.iter() {
            if !binding.source.is_valid() {
                return Err(LoadError::Invalid(format!(
                    "axis '{}' is bound to a channel that does not exist: {:?}",
                    binding.axis, binding.source
                )));
            }
        }

        Ok(())
    }

    /// Returns the bounded wait for a single report
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    /// Returns the delay applied after every polling iteration
    pub fn pacing_interval(&self) -> Duration {
        Duration::from_millis(self.pacing_interval_ms)
    }

    /// Returns the axis mapping described by this config
    pub fn mapping(&self) -> AxisMapping {
        AxisMapping::new(self.axes.clone())
    }
}
