//! MealSnap MCP Server Implementation
//!
//! Implements the MCP server with all MealSnap tools.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::analysis::endpoint::select_endpoint;
use crate::analysis::workflow::{MealAnalyzer, RetryPolicy};
use crate::analysis::WebhookClient;
use crate::capture::{CameraCapture, Facing};
use crate::config::{ConfigStore, ProviderCredentials};
use crate::tools::analyze;
use crate::tools::images;
use crate::tools::providers;
use crate::tools::status::StatusTracker;

/// MealSnap MCP Service
#[derive(Clone)]
pub struct MealSnapService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    analyzer: Arc<Mutex<MealAnalyzer>>,
    config: Arc<std::sync::Mutex<ConfigStore>>,
    /// At most one analysis is in flight; a second request is a no-op
    in_flight: Arc<AtomicBool>,
    tool_router: ToolRouter<MealSnapService>,
}

impl MealSnapService {
    pub fn new(config_path: PathBuf, config: ConfigStore) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(config_path))),
            analyzer: Arc::new(Mutex::new(MealAnalyzer::new(RetryPolicy::default()))),
            config: Arc::new(std::sync::Mutex::new(config)),
            in_flight: Arc::new(AtomicBool::new(false)),
            tool_router: Self::tool_router(),
        }
    }

    /// Current webhook endpoint from the stored origin and overrides
    fn current_endpoint(&self) -> String {
        let config = self.config.lock().unwrap();
        let settings = config.settings();
        select_endpoint(&settings.origin, settings.direct_endpoint.as_deref())
    }

    fn current_camera(&self) -> CameraCapture {
        let config = self.config.lock().unwrap();
        CameraCapture::new(config.settings().camera_command.clone())
    }
}

/// Releases the in-flight flag on every exit path
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// ============================================================================
// Response Structs
// ============================================================================

#[derive(Debug, Serialize)]
struct BusyResponse {
    success: bool,
    message: String,
}

// ============================================================================
// Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SelectImageParams {
    /// Path to an image file (max 10 MB, type detected from content)
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CapturePhotoParams {
    /// Camera to use: "environment" (back, default) or "user" (front)
    pub facing: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConfigureProviderParams {
    /// Provider: openai, google, clarifai, n8n, or nutritionix
    pub provider: String,
    /// API key (openai/google/clarifai/nutritionix)
    pub api_key: Option<String>,
    /// Webhook endpoint URL (n8n)
    pub endpoint: Option<String>,
    /// Application ID (nutritionix)
    pub app_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TestProviderParams {
    /// Provider: openai, google, clarifai, n8n, or nutritionix
    pub provider: String,
}

fn to_json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl MealSnapService {
    // --- Status ---

    #[tool(description = "Get the current status of the MealSnap service including build info, configuration path, session statistics, and process information")]
    async fn mealsnap_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        to_json_result(&tracker.get_status())
    }

    #[tool(description = "Get step-by-step instructions for analyzing meal photos. Call this when starting a new analysis session or when unsure how to use the workflow tools.")]
    fn analysis_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::ANALYSIS_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(
            ANALYSIS_INSTRUCTIONS,
        )]))
    }

    // --- Image Acquisition ---

    #[tool(description = "Select an image file as the current meal photo. Validates size (max 10 MB) and that the content is a real image; replaces any previously selected photo.")]
    async fn select_image(
        &self,
        Parameters(p): Parameters<SelectImageParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut analyzer = self.analyzer.lock().await;
        let mut tracker = self.status_tracker.lock().await;
        let result = images::select_image(&mut analyzer, &mut tracker, &p.path)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json_result(&result)
    }

    #[tool(description = "Capture a meal photo with the configured camera command. Pass facing=\"user\" for the front camera. Falls back to select_image guidance when no camera is available.")]
    async fn capture_photo(
        &self,
        Parameters(p): Parameters<CapturePhotoParams>,
    ) -> Result<CallToolResult, McpError> {
        let camera = self.current_camera();
        let facing = p.facing.as_deref().map(Facing::from_str).unwrap_or_default();

        let mut analyzer = self.analyzer.lock().await;
        let mut tracker = self.status_tracker.lock().await;
        let result = images::capture_photo(&mut analyzer, &mut tracker, &camera, facing)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json_result(&result)
    }

    // --- Analysis ---

    #[tool(description = "Analyze the currently selected meal photo. Sends it to the nutrition webhook and returns macro totals plus detected food items. On failure a clearly marked sample result is returned instead, so this never dead-ends.")]
    async fn analyze_meal(&self) -> Result<CallToolResult, McpError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            // No queueing: the outstanding request keeps running untouched
            return to_json_result(&BusyResponse {
                success: false,
                message: "An analysis is already in progress. Please wait for it to finish."
                    .to_string(),
            });
        }
        let _guard = InFlightGuard(&self.in_flight);

        let client = WebhookClient::new(self.current_endpoint());

        let mut analyzer = self.analyzer.lock().await;
        let mut tracker = self.status_tracker.lock().await;
        let result = analyze::analyze_meal(&mut analyzer, &client, &mut tracker)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json_result(&result)
    }

    #[tool(description = "Show the results of the last analysis again without sending a new request")]
    async fn show_results(&self) -> Result<CallToolResult, McpError> {
        let analyzer = self.analyzer.lock().await;
        let result =
            analyze::show_results(&analyzer).map_err(|e| McpError::internal_error(e, None))?;
        to_json_result(&result)
    }

    #[tool(description = "Clear the selected image and analysis results")]
    async fn reset_analyzer(&self) -> Result<CallToolResult, McpError> {
        let mut analyzer = self.analyzer.lock().await;
        to_json_result(&analyze::reset_analyzer(&mut analyzer))
    }

    // --- Provider Configuration ---

    #[tool(description = "Store API credentials for an analysis provider (openai, google, clarifai, n8n, nutritionix). Fields left out keep their stored value. Saved to the configuration file immediately.")]
    fn configure_provider(
        &self,
        Parameters(p): Parameters<ConfigureProviderParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut config = self.config.lock().unwrap();
        let result =
            providers::configure_provider(&mut config, &p.provider, p.api_key, p.endpoint, p.app_id)
                .map_err(|e| McpError::internal_error(e, None))?;
        to_json_result(&result)
    }

    #[tool(description = "List all analysis providers with their configuration state. API keys are masked.")]
    fn list_providers(&self) -> Result<CallToolResult, McpError> {
        let config = self.config.lock().unwrap();
        to_json_result(&providers::list_providers(&config))
    }

    #[tool(description = "Run a connectivity test for a configured provider")]
    async fn test_provider(
        &self,
        Parameters(p): Parameters<TestProviderParams>,
    ) -> Result<CallToolResult, McpError> {
        let credentials: Option<ProviderCredentials> = {
            let config = self.config.lock().unwrap();
            crate::config::Provider::from_str(&p.provider)
                .ok()
                .and_then(|provider| config.provider(provider).cloned())
        };
        let result = providers::test_provider(credentials, &p.provider)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json_result(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> (tempfile::TempDir, MealSnapService) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mealsnap.json");
        let config = ConfigStore::load_or_default(&path).unwrap();
        (dir, MealSnapService::new(path, config))
    }

    #[tokio::test]
    async fn test_second_analyze_is_a_no_op() {
        let (_dir, service) = service();
        // Simulate an outstanding analysis
        service.in_flight.store(true, Ordering::SeqCst);

        let result = service.analyze_meal().await.unwrap();
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("already in progress"));

        // The outstanding request's flag is untouched
        assert!(service.in_flight.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_in_flight_flag_released_after_error() {
        let (_dir, service) = service();
        // No image selected: fails before any request is dispatched
        assert!(service.analyze_meal().await.is_err());
        assert!(!service.in_flight.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_show_results_before_any_analysis() {
        let (_dir, service) = service();
        assert!(service.show_results().await.is_err());
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for MealSnapService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mealsnap".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("MealSnap Nutrition Analyzer".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "MealSnap - AI meal photo nutrition analysis. \
                 IMPORTANT: Call analysis_instructions when starting a new session. \
                 Workflow: select_image (or capture_photo), then analyze_meal, then read the totals and food items. \
                 Failed analyses return a sample result with an advisory; always tell the user when results are samples. \
                 Results: show_results re-renders the last outcome, reset_analyzer clears everything. \
                 Providers: configure/list/test_provider manage API credentials for openai, google, clarifai, n8n, nutritionix. \
                 Status: mealsnap_status for build, session, and process information."
                    .into(),
            ),
        }
    }
}
