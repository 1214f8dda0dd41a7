pub mod auth;
pub mod error;
pub mod normalize;
pub mod routes;
pub mod state;

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::AppError;
pub use state::AppState;

/// Assembles the full C5 surface (spec §4.5): the unauthenticated agent
/// registration and session-ingest routes sit outside the auth gate, the
/// read/write dashboard routes and the WebSocket upgrade sit inside it.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/agents", get(routes::agents::list_agents))
        .route("/sessions", get(routes::sessions::list_sessions))
        .route("/sessions/:id", get(routes::sessions::get_session).delete(routes::sessions::delete_session))
        .route("/sessions/:id/steps/:step_id", delete(routes::sessions::delete_step))
        .route("/audit-logs", get(routes::audit::get_audit_logs))
        .route("/stats", get(routes::stats::get_stats))
        .route("/config", get(routes::config::get_config).put(routes::config::put_config))
        .route("/swarms", get(routes::swarms::list_swarms))
        .route("/swarms/:id", get(routes::swarms::get_swarm))
        .layer(middleware::from_fn_with_state(state.clone(), auth::require_api_key));

    let unauthenticated = Router::new()
        .route("/agents/register", post(routes::agents::register_agent))
        .route("/sessions/ingest", post(routes::sessions::ingest_session))
        .route("/sessions/:id/step", post(routes::sessions::add_step))
        .route("/sessions/:id/complete", post(routes::sessions::complete_session))
        .route("/ws/sessions", get(routes::websocket::ws_sessions))
        .route("/healthz", get(routes::health::healthz));

    Router::new()
        .merge(protected)
        .merge(unauthenticated)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_state(api_key: Option<&str>) -> AppState {
        let dir = tempfile::tempdir().unwrap();
        let store = ward_store::Store::open(dir.path()).unwrap();
        std::mem::forget(dir); // keep the tempdir alive for the router's lifetime
        AppState::new(store, api_key.map(str::to_string)).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn healthz_is_unauthenticated() {
        let app = build_router(test_state(Some("secret")));
        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_route_without_key_is_unauthorized() {
        let app = build_router(test_state(Some("secret")));
        let response = app
            .oneshot(Request::builder().uri("/sessions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn protected_route_with_correct_key_succeeds() {
        let app = build_router(test_state(Some("secret")));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/sessions")
                    .header("x-api-key", "secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ingest_then_get_round_trips_without_auth_configured() {
        let app = build_router(test_state(None));
        let ingest_body = Body::from(json!({"session_id": "s1", "agent_name": "bot"}).to_string());
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/sessions/ingest")
                    .header("content-type", "application/json")
                    .body(ingest_body)
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::builder().uri("/sessions/s1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let value = body_json(response).await;
        assert_eq!(value["session_id"], json!("s1"));
        assert_eq!(value["status"], json!("active"));
    }

    #[tokio::test]
    async fn resume_clears_ended_at() {
        let app = build_router(test_state(None));
        let create = Body::from(json!({"session_id": "s1", "agent_name": "bot"}).to_string());
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/sessions/ingest")
                    .header("content-type", "application/json")
                    .body(create)
                    .unwrap(),
            )
            .await
            .unwrap();

        let complete = Body::from(json!({"overall_quality": "GOOD", "ended_at": "2026-01-01T00:00:00Z"}).to_string());
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/sessions/s1/complete")
                    .header("content-type", "application/json")
                    .body(complete)
                    .unwrap(),
            )
            .await
            .unwrap();

        let resume = Body::from(json!({"session_id": "s1"}).to_string());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/sessions/ingest")
                    .header("content-type", "application/json")
                    .body(resume)
                    .unwrap(),
            )
            .await
            .unwrap();
        let value = body_json(response).await;
        assert!(value["ended_at"].is_null());
        assert_eq!(value["status"], json!("active"));
    }

    #[tokio::test]
    async fn config_put_respects_allow_list() {
        let app = build_router(test_state(None));
        let patch = Body::from(json!({"max_steps": 99, "not_a_real_key": true}).to_string());
        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/config")
                    .header("content-type", "application/json")
                    .body(patch)
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let value = body_json(response).await;
        assert_eq!(value["max_steps"], json!(99));
        assert!(value.get("not_a_real_key").is_none());
    }
}
