use std::time::Duration;

use anyhow::Context;
use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::CorsConfig;

/// Builds the CORS layer applied to every route.
///
/// A `*` origin with credentials allowed mirrors the request origin, since
/// browsers reject a literal `*` alongside `Access-Control-Allow-Credentials`.
pub fn cors_layer(config: &CorsConfig) -> anyhow::Result<CorsLayer> {
    let origins = if config.allowed_origins.iter().any(|o| o == "*") {
        if config.allow_credentials {
            AllowOrigin::mirror_request()
        } else {
            AllowOrigin::any()
        }
    } else {
        let list = config
            .allowed_origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin: {o}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        AllowOrigin::list(list)
    };

    let methods = config
        .allowed_methods
        .iter()
        .map(|m| {
            Method::from_bytes(m.to_ascii_uppercase().as_bytes())
                .with_context(|| format!("Invalid CORS method: {m}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let headers = config
        .allowed_headers
        .iter()
        .map(|h| {
            HeaderName::from_bytes(h.as_bytes())
                .with_context(|| format!("Invalid CORS header: {h}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(config.allow_credentials)
        .max_age(Duration::from_secs(config.max_age_secs)))
}
