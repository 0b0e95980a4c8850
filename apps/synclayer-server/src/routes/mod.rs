//! Route modules for SyncLayer Server

pub mod health;
pub mod sync;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error;
use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(health::router())
        .nest("/sync", sync::router())
        .fallback(error::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = app(AppState::default());

        let (status, body) = send(&app, Method::GET, "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["collections"], 0);
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_push_and_pull() {
        let app = app(AppState::default());

        let (status, body) = send(
            &app,
            Method::POST,
            "/sync/todos",
            Some(json!({"recordId": "1", "data": {"text": "buy milk"}, "timestamp": "2026-01-01T00:00:00Z"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "recordId": "1", "version": 1}));

        let (status, body) = send(&app, Method::GET, "/sync/todos", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"][0]["data"]["text"], "buy milk");
        assert_eq!(body["records"][0]["updatedAt"], "2026-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn test_delete_unknown_record() {
        let app = app(AppState::default());

        let (status, body) = send(&app, Method::DELETE, "/sync/todos/nope", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "recordId": "nope"}));
    }

    #[tokio::test]
    async fn test_debug_endpoint() {
        let app = app(AppState::default());
        send(&app, Method::POST, "/sync/notes", Some(json!({"recordId": "a", "data": 1}))).await;
        send(&app, Method::POST, "/sync/notes", Some(json!({"recordId": "a", "data": 2}))).await;

        let (status, body) = send(&app, Method::GET, "/debug/notes", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["collection"], "notes");
        assert_eq!(body["count"], 1);
        assert_eq!(body["records"][0], json!({"recordId": "a", "data": 2, "version": 2}));
    }

    #[tokio::test]
    async fn test_push_with_loose_fields_succeeds() {
        let app = app(AppState::default());

        let (status, body) = send(&app, Method::POST, "/sync/todos", Some(json!({"data": 1}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "version": 1}));

        let (status, body) = send(
            &app,
            Method::POST,
            "/sync/todos",
            Some(json!({"recordId": 7, "data": 1, "timestamp": 1767225600000u64})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "recordId": 7, "version": 1}));

        let (_, body) = send(&app, Method::GET, "/debug/todos", None).await;
        assert_eq!(body["count"], 2);
    }

    #[tokio::test]
    async fn test_push_with_non_json_body_is_rejected() {
        let app = app(AppState::default());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/sync/todos")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = app(AppState::default());

        let (status, body) = send(&app, Method::GET, "/nowhere", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }
}
