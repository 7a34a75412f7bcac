//! Persisted configuration store
//!
//! One JSON blob on disk: the workflow origin, optional overrides, and the
//! credentials entered for each analysis provider. A provider counts as
//! "configured" once its credentials satisfy that provider's validity rule.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::analysis::endpoint::DEFAULT_ORIGIN;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("{0}")]
    Invalid(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Supported analysis providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Google,
    Clarifai,
    N8n,
    Nutritionix,
}

impl Provider {
    pub const ALL: [Provider; 5] = [
        Provider::OpenAi,
        Provider::Google,
        Provider::Clarifai,
        Provider::N8n,
        Provider::Nutritionix,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Google => "google",
            Provider::Clarifai => "clarifai",
            Provider::N8n => "n8n",
            Provider::Nutritionix => "nutritionix",
        }
    }

    pub fn from_str(s: &str) -> ConfigResult<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "google" => Ok(Provider::Google),
            "clarifai" => Ok(Provider::Clarifai),
            "n8n" => Ok(Provider::N8n),
            "nutritionix" => Ok(Provider::Nutritionix),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// Credentials entered for one provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderCredentials {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub app_id: String,
}

impl ProviderCredentials {
    /// Per-provider validity rule: key-only providers need a key, n8n needs
    /// a webhook endpoint, nutritionix needs both key and application id
    pub fn is_valid_for(&self, provider: Provider) -> bool {
        match provider {
            Provider::OpenAi | Provider::Google | Provider::Clarifai => !self.api_key.is_empty(),
            Provider::N8n => !self.endpoint.is_empty(),
            Provider::Nutritionix => !self.api_key.is_empty() && !self.app_id.is_empty(),
        }
    }
}

/// The persisted settings blob
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Origin the companion app is served from; drives endpoint selection
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Replaces the built-in tunnel endpoint when set
    #[serde(default)]
    pub direct_endpoint: Option<String>,
    /// External capture command template, `{output}`/`{facing}` placeholders
    #[serde(default)]
    pub camera_command: Option<String>,
    /// Credentials keyed by provider name
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderCredentials>,
}

fn default_origin() -> String {
    DEFAULT_ORIGIN.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            direct_endpoint: None,
            camera_command: None,
            providers: BTreeMap::new(),
        }
    }
}

/// File-backed configuration store
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    settings: Settings,
}

impl ConfigStore {
    /// Load the store, falling back to defaults when the file is missing
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        let settings = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            let settings: Settings = serde_json::from_str(&raw)?;
            info!(path = %path.display(), providers = settings.providers.len(), "loaded configuration");
            settings
        } else {
            Settings::default()
        };
        Ok(Self { path, settings })
    }

    /// Persist the current settings
    pub fn save(&self) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&self.settings)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Store credentials for a provider after checking its validity rule,
    /// then persist
    pub fn set_provider(
        &mut self,
        provider: Provider,
        credentials: ProviderCredentials,
    ) -> ConfigResult<()> {
        if !credentials.is_valid_for(provider) {
            return Err(ConfigError::Invalid(format!(
                "Incomplete credentials for {}: please fill in all required fields",
                provider.as_str()
            )));
        }
        self.settings
            .providers
            .insert(provider.as_str().to_string(), credentials);
        self.save()
    }

    pub fn provider(&self, provider: Provider) -> Option<&ProviderCredentials> {
        self.settings.providers.get(provider.as_str())
    }

    /// Providers whose stored credentials satisfy their validity rule
    pub fn configured_providers(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| {
                self.provider(*p)
                    .map(|c| c.is_valid_for(*p))
                    .unwrap_or(false)
            })
            .collect()
    }

    pub fn set_origin(&mut self, origin: String) -> ConfigResult<()> {
        self.settings.origin = origin;
        self.save()
    }

    pub fn set_camera_command(&mut self, command: Option<String>) -> ConfigResult<()> {
        self.settings.camera_command = command;
        self.save()
    }
}
