//! # Adapters
//!
//! Concrete implementations around the service:
//!
//! - `config` - static, environment and TOML configuration sources
//! - `time` - system clock
//! - `reconciler` - enforcement and rediscovery timers (requires "reconcile")

pub mod config;
pub mod time;

#[cfg(feature = "reconcile")]
pub mod reconciler;

pub use config::{
    apply_env_overrides, apply_overrides_from, parse_addresses, validate, ConfigError,
    StaticConfigProvider, PERMISSIONED_ADDRESSES_ENV,
};
#[cfg(feature = "network")]
pub use config::TomlConfigProvider;
pub use time::SystemTimeSource;

#[cfg(feature = "reconcile")]
pub use reconciler::{ReconcilerHandle, ReconciliationLoop};
