//! Webhook client
//!
//! Shared HTTP client with configured timeouts, plus the multipart request
//! that submits a selected image for analysis. The backend trait is the seam
//! the retry state machine is tested through.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, ClientBuilder};
use tracing::debug;

use crate::models::{AnalysisResult, SelectedImage};

use super::endpoint::is_tunnel_endpoint;
use super::error::AnalysisError;
use super::normalize;

/// Bounded wait for the analysis request; AI processing is slow
pub const REQUEST_TIMEOUT_SECS: u64 = 45;

/// Connection timeout in seconds
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Global shared HTTP client with configured timeouts
static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

/// Get the shared HTTP client for webhook calls
///
/// Uses connection pooling; the request timeout covers the whole exchange,
/// so a stalled analysis is cancelled and surfaces as a timeout failure.
pub fn shared_client() -> &'static Client {
    SHARED_CLIENT.get_or_init(|| {
        ClientBuilder::new()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}

/// One analysis request against some nutrition service
#[async_trait]
pub trait NutritionBackend: Send + Sync {
    async fn analyze(&self, image: &SelectedImage) -> Result<AnalysisResult, AnalysisError>;
}

/// The real webhook backend
pub struct WebhookClient {
    endpoint: String,
}

impl WebhookClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_form(image: &SelectedImage) -> Result<Form, AnalysisError> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime)?;
        Ok(Form::new()
            .part("image", part)
            .text("timestamp", Utc::now().to_rfc3339())
            .text("source", image.source.as_str()))
    }
}

#[async_trait]
impl NutritionBackend for WebhookClient {
    async fn analyze(&self, image: &SelectedImage) -> Result<AnalysisResult, AnalysisError> {
        debug!(
            endpoint = %self.endpoint,
            image_bytes = image.size_bytes,
            "sending analysis request"
        );

        let mut request = shared_client()
            .post(&self.endpoint)
            .header(ACCEPT, "application/json");
        if is_tunnel_endpoint(&self.endpoint) {
            request = request.header("ngrok-skip-browser-warning", "true");
        }

        let response = request.multipart(Self::build_form(image)?).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(AnalysisError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        // 2xx with an unparseable body is a format failure, not a network one
        let body = response.text().await?;
        let raw: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| AnalysisError::Format(format!("invalid JSON body: {}", e)))?;

        normalize::canonicalize(raw)
    }
}
