//! Cross-origin resource sharing.

use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::{AccessConfig, CorsConfig};

/// Build the CORS layer: a single origin when configured, any origin otherwise.
pub fn cors_layer(cors: &CorsConfig, access: &AccessConfig) -> CorsLayer {
    let origin = match cors
        .allowed_origin
        .as_deref()
        .and_then(|o| HeaderValue::from_str(o).ok())
    {
        Some(origin) => AllowOrigin::exact(origin),
        None => {
            if let Some(raw) = &cors.allowed_origin {
                tracing::warn!(origin = %raw, "Ignoring unparsable CORS origin, allowing any");
            }
            AllowOrigin::from(Any)
        }
    };

    let mut headers = vec![header::CONTENT_TYPE];
    if let Ok(name) = HeaderName::from_bytes(access.header.as_bytes()) {
        headers.push(name);
    }

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(headers)
}
