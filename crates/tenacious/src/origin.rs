//! Resolution of the real-time origin (scheme + host).
//!
//! Resolution order: explicit configuration override, then derivation from
//! the application's HTTP origin, then a loopback default. Pure and
//! infallible; every input yields a usable origin string.

use url::Url;

use crate::config::RealtimeConfig;

/// Fallback origin when nothing is configured.
pub const DEFAULT_ORIGIN: &str = "ws://127.0.0.1:8000";

/// Resolves the origin used to build channel connection URLs.
pub fn resolve_origin(config: &RealtimeConfig) -> String {
    if let Some(origin) = &config.origin_override {
        return origin.trim_end_matches('/').to_string();
    }

    if let Some(http_origin) = &config.http_origin
        && let Some(derived) = derive_ws_origin(http_origin)
    {
        return derived;
    }

    DEFAULT_ORIGIN.to_string()
}

/// Maps an HTTP origin to its real-time counterpart, keeping the host and
/// port and using the secure scheme when the source origin is secure.
/// Returns `None` when the origin does not parse to something with a host.
fn derive_ws_origin(http_origin: &str) -> Option<String> {
    let url = Url::parse(http_origin).ok()?;
    let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
    let host = url.host_str()?;

    Some(match url.port() {
        Some(port) => format!("{scheme}://{host}:{port}"),
        None => format!("{scheme}://{host}"),
    })
}
