//! Daemon configuration file.
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no
//! file at all) yields a working configuration:
//!
//! ```toml
//! listen = "0.0.0.0:8443"
//! hint_capacity = 64
//!
//! [host]
//! ip_cmd = "/sbin/ip"
//! arping_cmd = "/usr/sbin/arping"
//! sysfs_net = "/sys/class/net"
//! ```

use lwotg_host::HostConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::hint::DEFAULT_HINT_CAPACITY;

/// Default listen address for the API.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8443";

/// Errors from loading the daemon configuration.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub listen: SocketAddr,
    pub hint_capacity: usize,
    pub host: HostConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            hint_capacity: DEFAULT_HINT_CAPACITY,
            host: HostConfig::default(),
        }
    }
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8443))
}

impl DaemonConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: DaemonConfig =
            toml::from_str(&content).map_err(|source| ConfigFileError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigFileError> {
        if self.hint_capacity == 0 {
            return Err(ConfigFileError::Invalid(
                "hint_capacity must be at least 1".to_string(),
            ));
        }
        if self.host.ip_cmd.is_empty() {
            return Err(ConfigFileError::Invalid("host.ip_cmd must not be empty".to_string()));
        }
        Ok(())
    }
}
