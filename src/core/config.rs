//! Facility configuration
//!
//! Process-wide limits for the message facility, read once at startup and
//! immutable for the facility's lifetime. Values can come from a TOML
//! configuration file (an explicitly given path, or a discovered default
//! location) or be constructed directly.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default upper bound on the size of a single message payload, in bytes.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 32;

/// Default upper bound on outstanding (accepted but undelivered) messages
/// per group.
pub const DEFAULT_MAX_GROUP_MESSAGES: usize = 64;

/// Default number of addressable groups; valid ids are `0..max_groups`.
pub const DEFAULT_MAX_GROUPS: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration file does not exist: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("configuration value `{field}` must be greater than zero")]
    ZeroValue { field: &'static str },
}

/// Immutable limits applied to every group managed by one facility.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FacilityConfig {
    /// Maximum size of a single message; longer payloads are truncated at
    /// write time.
    pub max_message_size: usize,
    /// Maximum number of outstanding messages per group (pending + visible).
    pub max_group_messages: usize,
    /// Number of addressable groups.
    pub max_groups: usize,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_group_messages: DEFAULT_MAX_GROUP_MESSAGES,
            max_groups: DEFAULT_MAX_GROUPS,
        }
    }
}

impl FacilityConfig {
    /// Parse a configuration from TOML text. Unspecified keys keep their
    /// default values.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    ///
    /// With an explicit path the file must exist. Without one, the default
    /// location under the user configuration directory is used if present,
    /// otherwise the built-in defaults apply.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.to_path_buf(),
                    });
                }
                Some(path.to_path_buf())
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Some(path),
                _ => None,
            },
        };

        match config_path {
            Some(path) => {
                let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                let config = Self::from_toml_str(&contents)?;
                log::info!("loaded facility configuration from {}", path.display());
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Default config file location: `<config dir>/groupmsg/groupmsg.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("groupmsg").join("groupmsg.toml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_message_size == 0 {
            return Err(ConfigError::ZeroValue {
                field: "max-message-size",
            });
        }
        if self.max_group_messages == 0 {
            return Err(ConfigError::ZeroValue {
                field: "max-group-messages",
            });
        }
        if self.max_groups == 0 {
            return Err(ConfigError::ZeroValue { field: "max-groups" });
        }
        Ok(())
    }
}
