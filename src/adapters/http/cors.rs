//! CORS layer configuration.

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

use crate::config::ServerConfig;

/// Builds a CORS layer from `server.allowed_origins`.
///
/// No configured origins, or a `*` entry, allows any origin.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins = config.origins();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;

    async fn preflight_origin(config: &ServerConfig, origin: &str) -> Option<String> {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(build_cors_layer(config));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("origin", origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        response
            .headers()
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn no_origins_allows_any() {
        let config = ServerConfig::default();
        assert_eq!(
            preflight_origin(&config, "http://example.com").await.as_deref(),
            Some("*")
        );
    }

    #[tokio::test]
    async fn listed_origins_are_echoed_and_others_refused() {
        let config = ServerConfig {
            allowed_origins: Some("http://admin.local".to_string()),
            ..Default::default()
        };
        assert_eq!(
            preflight_origin(&config, "http://admin.local").await.as_deref(),
            Some("http://admin.local")
        );
        assert_eq!(preflight_origin(&config, "http://evil.local").await, None);
    }
}
