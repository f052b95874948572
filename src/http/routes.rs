// Route assembly for the moderation gateway.
//
// - POST /moderate        - run the decision pipeline
// - GET  /moderate/recent - recent decision log entries
// - GET  /health          - liveness probe
//
// A permissive CORS layer answers the preflight OPTIONS contract; the
// trace layer emits one span per request.

use crate::http::handlers::{health, moderate, recent};
use crate::http::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/moderate", post(moderate))
        .route("/moderate/recent", get(recent))
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::{
        ModerationConfig, ModerationLogStore, ModerationOracle, ModerationService,
    };
    use crate::http::state::AppService;
    use crate::infra::moderation::InMemoryModerationLogStore;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let store: Box<dyn ModerationLogStore> = Box::new(InMemoryModerationLogStore::new());
        let service: AppService =
            ModerationService::new(store, None::<Box<dyn ModerationOracle>>, ModerationConfig::default());
        create_router(AppState::new(Arc::new(service)))
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/moderate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn clean_content_gets_an_approving_decision() {
        let response = test_router()
            .oneshot(post_json(
                r#"{"content":"This is a normal comment about the weather","type":"text"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["approved"], true);
        assert_eq!(json["confidence"], 0.95);
        assert_eq!(json["categories"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn rejected_content_still_returns_200() {
        let response = test_router()
            .oneshot(post_json(
                r#"{"content":"you are fake and this is a scam","type":"text"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["approved"], false);
        assert_eq!(json["categories"], serde_json::json!(["inappropriate_language"]));
    }

    #[tokio::test]
    async fn missing_type_is_a_bad_request() {
        let response = test_router()
            .oneshot(post_json(r#"{"content":"hello over there"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn empty_content_is_a_bad_request() {
        let response = test_router()
            .oneshot(post_json(r#"{"content":"","type":"text"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // The fail-open contract: when the request cannot even be parsed the
    // caller gets a 500 whose payload approves the content by default.
    #[tokio::test]
    async fn malformed_body_fails_open() {
        let response = test_router()
            .oneshot(post_json("{not json at all"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["approved"], true);
        assert_eq!(json["confidence"], 0.5);
        assert_eq!(json["categories"], serde_json::json!(["error"]));
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn unknown_media_type_fails_open() {
        let response = test_router()
            .oneshot(post_json(r#"{"content":"some content","type":"video"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["approved"], true);
    }

    #[tokio::test]
    async fn health_endpoint_answers() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn cors_preflight_is_answered() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/moderate")
                    .header(header::ORIGIN, "https://app.example")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn recent_lists_logged_decisions() {
        let router = test_router();

        router
            .clone()
            .oneshot(post_json(
                r#"{"content":"This is a normal comment about the weather","type":"text"}"#,
            ))
            .await
            .unwrap();

        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/moderate/recent?limit=5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["approved"], true);
        assert_eq!(entries[0]["media_type"], "text");
    }
}
