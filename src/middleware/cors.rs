use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};

use crate::config::SecurityConfig;

/// CORS policy for the router, or `None` when CORS is switched off.
///
/// With no configured origins the policy is fully permissive, which is what
/// the mobile and web clients in the field expect.
pub fn cors_layer(config: &SecurityConfig) -> Option<CorsLayer> {
    if !config.enable_cors {
        return None;
    }

    if config.cors_origins.is_empty() {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}
