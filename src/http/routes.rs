//! HTTP route definitions

use axum::{extract::State, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};

use crate::app::AppState;
use crate::util::time::uptime_secs;
use crate::ws::handler::ws_handler;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // Everything that isn't an API route is a client asset
    let assets = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .fallback_service(assets)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    players: usize,
    coins: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        players: state.arena.player_count(),
        coins: state.arena.coin_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::game::{Arena, ArenaSettings, SequentialIds};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let config = Config::from_lookup(|key| match key {
            "STATIC_DIR" => Some("does-not-exist".to_string()),
            _ => None,
        })
        .unwrap();
        let (_arena, handle) = Arena::new(
            ArenaSettings {
                latency: Duration::ZERO,
                seed: 1,
            },
            Box::new(SequentialIds::new()),
        );
        AppState::new(config, handle)
    }

    #[tokio::test]
    async fn health_reports_counts() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["players"], 0);
        assert_eq!(json["coins"], 0);
    }

    #[tokio::test]
    async fn ws_route_requires_upgrade() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::get("/ws").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn missing_asset_is_not_found() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::get("/nope.js").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
