//! Endpoint selection
//!
//! The webhook endpoint is chosen from the configured origin: development
//! and static-hosting origins go straight to the external tunnel, anything
//! else goes through the same-origin proxy path.

use reqwest::Url;

/// Default origin assumed when none is configured
pub const DEFAULT_ORIGIN: &str = "http://localhost:8000";

/// Fixed external tunnel endpoint used for dev/static-hosting origins
pub const TUNNEL_ENDPOINT: &str =
    "https://danny-supercrowned-shawnda.ngrok-free.dev/webhook/Meal";

/// Same-origin proxy path used in production
pub const PROXY_PATH: &str = "/webhook/Meal";

/// Hosting suffix that marks a static deployment without a proxy
const STATIC_HOST_SUFFIX: &str = ".github.io";

/// Select the webhook endpoint for the given origin
///
/// `direct_override` replaces the built-in tunnel endpoint when set.
pub fn select_endpoint(origin: &str, direct_override: Option<&str>) -> String {
    let direct = direct_override.unwrap_or(TUNNEL_ENDPOINT);

    let url = match Url::parse(origin) {
        Ok(url) => url,
        // An unparseable origin cannot host a proxy path
        Err(_) => return direct.to_string(),
    };

    let host = url.host_str().unwrap_or("");
    let is_dev = host == "localhost" || host == "127.0.0.1" || url.port() == Some(8000);
    let is_static_hosting = host.ends_with(STATIC_HOST_SUFFIX);

    if is_dev || is_static_hosting {
        direct.to_string()
    } else {
        format!("{}{}", origin.trim_end_matches('/'), PROXY_PATH)
    }
}

/// Whether an endpoint goes through the tunnel (needs the warning-skip header)
pub fn is_tunnel_endpoint(endpoint: &str) -> bool {
    endpoint.contains("ngrok")
}
