//! Configuration management
//!
//! A single JSON file holds workflow settings and per-provider API
//! credentials, read on startup and saved on every accepted change.

mod store;

pub use store::{
    ConfigError, ConfigResult, ConfigStore, Provider, ProviderCredentials, Settings,
};
