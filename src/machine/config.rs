// Configuration management
//
// Host-tunable settings for a machine, persisted as TOML. Every field has a
// default, so partial files are fine.

use std::fs;
use std::io;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default configuration file name
pub const CONFIG_FILE: &str = "madnes.toml";

/// Errors from loading, saving or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Machine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Host audio sample rate in Hz
    pub sample_rate: u32,

    /// Samples held before the oldest are dropped
    pub audio_buffer_capacity: usize,

    /// Entries kept by the execution log
    pub trace_capacity: usize,

    /// Master volume (0.0-1.0)
    pub volume: f32,
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig {
            sample_rate: 44_100,
            audio_buffer_capacity: 4096,
            trace_capacity: 1024,
            volume: 1.0,
        }
    }
}

impl MachineConfig {
    /// Parse and validate a TOML document
    ///
    /// # Example
    ///
    /// ```
    /// use madnes::machine::MachineConfig;
    ///
    /// let config = MachineConfig::from_toml_str("sample_rate = 48000").unwrap();
    /// assert_eq!(config.sample_rate, 48000);
    /// assert_eq!(config.audio_buffer_capacity, 4096);
    /// ```
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: MachineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Load configuration from a file, falling back to defaults
    ///
    /// A missing file is not an error; an unreadable or invalid one is logged.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                warn!("Ignoring configuration {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Check every setting is in range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(8_000..=192_000).contains(&self.sample_rate) {
            return Err(ConfigError::Invalid(format!(
                "sample_rate {} is outside 8000-192000",
                self.sample_rate
            )));
        }
        if self.audio_buffer_capacity == 0 {
            return Err(ConfigError::Invalid(
                "audio_buffer_capacity must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(ConfigError::Invalid(format!(
                "volume {} is outside 0.0-1.0",
                self.volume
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MachineConfig::default();
        assert_eq!(config.sample_rate, 44_100);
        assert_eq!(config.audio_buffer_capacity, 4096);
        assert_eq!(config.trace_capacity, 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = MachineConfig {
            sample_rate: 48_000,
            trace_capacity: 16,
            ..MachineConfig::default()
        };
        let toml_str = config.to_toml_string().expect("Failed to serialize");
        let deserialized = MachineConfig::from_toml_str(&toml_str).expect("Failed to deserialize");
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = MachineConfig::from_toml_str("trace_capacity = 8\n").expect("parse");
        assert_eq!(config.trace_capacity, 8);
        assert_eq!(config.sample_rate, 44_100);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            MachineConfig::from_toml_str("sample_rate = 12"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            MachineConfig::from_toml_str("audio_buffer_capacity = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            MachineConfig::from_toml_str("sample_rate = \"fast\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("madnes-config-{}.toml", std::process::id()));
        let config = MachineConfig {
            volume: 0.25,
            ..MachineConfig::default()
        };
        config.save(&path).expect("save");
        assert_eq!(MachineConfig::load(&path).expect("load"), config);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = MachineConfig::load_or_default("/nonexistent/madnes/config.toml");
        assert_eq!(config, MachineConfig::default());
    }
}
