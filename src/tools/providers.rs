//! Provider configuration tools
//!
//! Configure, list, and connectivity-test the analysis providers. API keys
//! never leave the store unmasked.

use serde::Serialize;

use crate::analysis::client::shared_client;
use crate::config::{ConfigStore, Provider, ProviderCredentials};

/// Summary of one provider for listing
#[derive(Debug, Serialize)]
pub struct ProviderSummary {
    pub provider: &'static str,
    pub configured: bool,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub app_id: Option<String>,
}

/// Response for list_providers
#[derive(Debug, Serialize)]
pub struct ListProvidersResponse {
    pub providers: Vec<ProviderSummary>,
    pub config_path: String,
}

/// Response for configure_provider
#[derive(Debug, Serialize)]
pub struct ConfigureProviderResponse {
    pub success: bool,
    pub provider: &'static str,
    pub message: String,
}

/// Response for test_provider
#[derive(Debug, Serialize)]
pub struct TestProviderResponse {
    pub provider: &'static str,
    pub reachable: bool,
    pub detail: String,
}

/// Store credentials for a provider; fields left out keep their stored value
pub fn configure_provider(
    store: &mut ConfigStore,
    provider: &str,
    api_key: Option<String>,
    endpoint: Option<String>,
    app_id: Option<String>,
) -> Result<ConfigureProviderResponse, String> {
    let provider = Provider::from_str(provider).map_err(|e| e.to_string())?;

    let mut credentials = store.provider(provider).cloned().unwrap_or_default();
    if let Some(api_key) = api_key {
        credentials.api_key = api_key.trim().to_string();
    }
    if let Some(endpoint) = endpoint {
        credentials.endpoint = endpoint.trim().to_string();
    }
    if let Some(app_id) = app_id {
        credentials.app_id = app_id.trim().to_string();
    }

    store
        .set_provider(provider, credentials)
        .map_err(|e| e.to_string())?;

    Ok(ConfigureProviderResponse {
        success: true,
        provider: provider.as_str(),
        message: format!("Configuration saved for {}.", provider.as_str()),
    })
}

/// List all providers with configuration state and masked credentials
pub fn list_providers(store: &ConfigStore) -> ListProvidersResponse {
    let providers = Provider::ALL
        .into_iter()
        .map(|provider| {
            let credentials = store.provider(provider);
            ProviderSummary {
                provider: provider.as_str(),
                configured: credentials
                    .map(|c| c.is_valid_for(provider))
                    .unwrap_or(false),
                api_key: credentials
                    .filter(|c| !c.api_key.is_empty())
                    .map(|c| mask_key(&c.api_key)),
                endpoint: credentials
                    .filter(|c| !c.endpoint.is_empty())
                    .map(|c| c.endpoint.clone()),
                app_id: credentials
                    .filter(|c| !c.app_id.is_empty())
                    .map(|c| c.app_id.clone()),
            }
        })
        .collect();

    ListProvidersResponse {
        providers,
        config_path: store.path().display().to_string(),
    }
}

/// Connectivity test for a configured provider
pub async fn test_provider(
    store_snapshot: Option<ProviderCredentials>,
    provider: &str,
) -> Result<TestProviderResponse, String> {
    let provider = Provider::from_str(provider).map_err(|e| e.to_string())?;
    let credentials = store_snapshot.unwrap_or_default();

    if !credentials.is_valid_for(provider) {
        return Err(format!(
            "{} is not configured: please fill in all required fields first",
            provider.as_str()
        ));
    }

    let (reachable, detail) = match provider {
        Provider::OpenAi => {
            match shared_client()
                .get("https://api.openai.com/v1/models")
                .bearer_auth(&credentials.api_key)
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => {
                    (true, "Connection successful".to_string())
                }
                Ok(response) => (false, format!("API returned {}", response.status())),
                Err(e) => (false, format!("Connection failed: {}", e)),
            }
        }
        Provider::N8n => {
            match shared_client().head(&credentials.endpoint).send().await {
                // 405 on HEAD still means the webhook is reachable
                Ok(response)
                    if response.status().is_success() || response.status().as_u16() == 405 =>
                {
                    (true, "Webhook reachable".to_string())
                }
                Ok(response) => (false, format!("Webhook returned {}", response.status())),
                Err(e) => (false, format!("Connection failed: {}", e)),
            }
        }
        // No cheap unauthenticated probe for the rest; accept the credentials
        _ => (true, "Credentials accepted (no connectivity probe)".to_string()),
    };

    Ok(TestProviderResponse {
        provider: provider.as_str(),
        reachable,
        detail,
    })
}

/// Mask a stored API key down to its last four characters
pub fn mask_key(key: &str) -> String {
    if key.len() <= 4 {
        "****".to_string()
    } else {
        format!("****{}", &key[key.len() - 4..])
    }
}
