//! MealSnap
//!
//! An MCP server for AI meal photo nutrition analysis.

use std::path::PathBuf;
use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

mod analysis;
mod build_info;
mod capture;
mod config;
mod mcp;
mod models;
mod nutrition;
mod render;
mod tools;

use config::ConfigStore;
use mcp::MealSnapService;

/// Get the configuration path from environment or use default
fn get_config_path() -> PathBuf {
    std::env::var("MEALSNAP_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            path.push("mealsnap.json");
            path
        })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mealsnap=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    // Get configuration path
    let config_path = get_config_path();
    eprintln!("Config path: {}", config_path.display());

    // Ensure config directory exists
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Load persisted configuration (providers, origin, camera command)
    let config = ConfigStore::load_or_default(&config_path)?;
    eprintln!(
        "Configured providers: {}",
        config.configured_providers().len()
    );

    // Create the MealSnap service
    let service = MealSnapService::new(config_path, config);

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
