//! Configuration providers.
//!
//! - `StaticConfigProvider` - builder-style config for tests and embedding
//! - `TomlConfigProvider` - config file loading (requires "network" feature)
//! - `apply_env_overrides` - `QC_PERMISSIONED_ADDRESSES` override

use std::time::Duration;

use thiserror::Error;

use crate::domain::{Address, PermissionConfig};
use crate::ports::ConfigProvider;

#[cfg(feature = "network")]
mod toml_config;

#[cfg(feature = "network")]
pub use toml_config::TomlConfigProvider;

/// Environment variable holding a comma-separated allow-list.
///
/// An empty value restricts the node to itself.
pub const PERMISSIONED_ADDRESSES_ENV: &str = "QC_PERMISSIONED_ADDRESSES";

/// Errors that can occur during config loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read {path}: {error}")]
    Io {
        /// Path of the file that failed to load.
        path: String,
        /// Error message from the I/O operation.
        error: String,
    },
    /// TOML parsing error.
    #[error("failed to parse config: {0}")]
    Parse(String),
    /// An allow-list entry is not a valid address.
    #[error("invalid permitted address {0:?}")]
    InvalidAddress(String),
    /// A value is out of range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: &'static str,
    },
}

/// Parse a list of address strings, failing on the first bad entry.
pub fn parse_addresses<'a>(
    entries: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<Address>, ConfigError> {
    entries
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<Address>()
                .map_err(|_| ConfigError::InvalidAddress(s.to_string()))
        })
        .collect()
}

/// Reject configurations the reconciliation loop cannot run with.
pub fn validate(config: &PermissionConfig) -> Result<(), ConfigError> {
    if config.enforcement_interval.is_zero() {
        return Err(ConfigError::InvalidValue {
            field: "enforcement_interval_secs",
            reason: "must be greater than zero",
        });
    }
    if config.rediscovery_interval.is_zero() {
        return Err(ConfigError::InvalidValue {
            field: "rediscovery_interval_secs",
            reason: "must be greater than zero",
        });
    }
    if config.max_peers == 0 {
        return Err(ConfigError::InvalidValue {
            field: "max_peers",
            reason: "must be greater than zero",
        });
    }
    Ok(())
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: &mut PermissionConfig) -> Result<(), ConfigError> {
    apply_overrides_from(config, |key| std::env::var(key).ok())
}

/// Apply overrides from an arbitrary key lookup.
pub fn apply_overrides_from(
    config: &mut PermissionConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(raw) = lookup(PERMISSIONED_ADDRESSES_ENV) {
        let addresses = parse_addresses(raw.split(','))?;
        tracing::info!(
            count = addresses.len(),
            "allow-list overridden from {}",
            PERMISSIONED_ADDRESSES_ENV
        );
        config.permitted = Some(addresses);
    }
    Ok(())
}

// ============================================================================
// StaticConfigProvider - Hardcoded config for testing/development
// ============================================================================

/// Static configuration provider.
///
/// Useful for testing and embedding. For files, use `TomlConfigProvider`.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    config: PermissionConfig,
}

impl StaticConfigProvider {
    /// Create with default (unrestricted) config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to the given addresses.
    #[must_use]
    pub fn with_permitted(mut self, addresses: Vec<Address>) -> Self {
        self.config.permitted = Some(addresses);
        self
    }

    /// Set the peer limit.
    #[must_use]
    pub fn with_max_peers(mut self, max_peers: usize) -> Self {
        self.config.max_peers = max_peers;
        self
    }

    /// Set both reconciliation periods.
    #[must_use]
    pub fn with_intervals(mut self, enforcement: Duration, rediscovery: Duration) -> Self {
        self.config.enforcement_interval = enforcement;
        self.config.rediscovery_interval = rediscovery;
        self
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn get_permission_config(&self) -> PermissionConfig {
        self.config.clone()
    }
}
