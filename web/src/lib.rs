//! HTTP surface of the meeting minutes service.

use axum::http::{HeaderValue, Method};
use log::*;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub use error::{Error, Result};
pub use service::AppState;

mod controller;
mod error;
mod params;
mod response;
pub mod router;

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let bind_address = app_state.config.bind_address();
    let cors_layer = cors_layer(&app_state.config.allowed_origins);

    let listener = TcpListener::bind(&bind_address).await?;
    info!("Server starting... listening for connections on http://{bind_address}");

    axum::serve(listener, router::define_routes(app_state).layer(cors_layer)).await
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if allowed_origins.iter().any(|origin| origin.trim() == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.trim().parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid allowed origin: {origin}");
                None
            }
        })
        .collect();
    debug!("CORS allowed origins: {origins:?}");

    layer.allow_origin(AllowOrigin::list(origins))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Request, StatusCode};
    use axum::{body::Body, routing::get, Router};
    use tower::ServiceExt;

    async fn preflight(allowed: &[&str], origin: &str) -> Option<HeaderValue> {
        let allowed: Vec<String> = allowed.iter().map(|o| o.to_string()).collect();
        let router = Router::new()
            .route("/health", get(|| async { "ok" }))
            .layer(cors_layer(&allowed));
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/health")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .cloned()
    }

    #[tokio::test]
    async fn test_wildcard_allows_any_origin() {
        let allowed = preflight(&["*"], "http://meetings.example.com").await;
        assert_eq!(allowed.unwrap(), "*");
    }

    #[tokio::test]
    async fn test_listed_origin_is_echoed_back() {
        let allowed = preflight(
            &["http://localhost:3000", "http://meetings.example.com"],
            "http://meetings.example.com",
        )
        .await;
        assert_eq!(allowed.unwrap(), "http://meetings.example.com");
    }

    #[tokio::test]
    async fn test_unlisted_origin_is_not_allowed() {
        let allowed = preflight(&["http://localhost:3000"], "http://evil.example.com").await;
        assert!(allowed.is_none());
    }
}
