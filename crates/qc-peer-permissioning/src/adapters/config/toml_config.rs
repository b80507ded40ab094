use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use super::{parse_addresses, validate, ConfigError};
use crate::domain::PermissionConfig;
use crate::ports::ConfigProvider;

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    permissions: PermissionsSection,
    #[serde(default)]
    limits: LimitsSection,
    #[serde(default)]
    reconcile: ReconcileSection,
}

#[derive(Debug, Deserialize, Default)]
struct PermissionsSection {
    /// Absent key means unrestricted; an empty array restricts to self.
    addresses: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
struct LimitsSection {
    max_peers: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct ReconcileSection {
    enforcement_interval_secs: Option<u64>,
    rediscovery_interval_secs: Option<u64>,
}

/// TOML-based configuration provider.
///
/// # Config File Format
///
/// ```toml
/// [permissions]
/// # Omit `addresses` entirely to run unrestricted.
/// addresses = [
///     "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf",
/// ]
///
/// [limits]
/// max_peers = 50
///
/// [reconcile]
/// enforcement_interval_secs = 2
/// rediscovery_interval_secs = 15
/// ```
#[derive(Debug, Clone)]
pub struct TomlConfigProvider {
    config: PermissionConfig,
}

impl TomlConfigProvider {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let defaults = PermissionConfig::default();
        let permitted = file
            .permissions
            .addresses
            .as_ref()
            .map(|list| parse_addresses(list.iter().map(String::as_str)))
            .transpose()?;

        let config = PermissionConfig {
            permitted,
            max_peers: file.limits.max_peers.unwrap_or(defaults.max_peers),
            enforcement_interval: file
                .reconcile
                .enforcement_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.enforcement_interval),
            rediscovery_interval: file
                .reconcile
                .rediscovery_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.rediscovery_interval),
        };
        validate(&config)?;

        Ok(Self { config })
    }
}

impl ConfigProvider for TomlConfigProvider {
    fn get_permission_config(&self) -> PermissionConfig {
        self.config.clone()
    }
}
