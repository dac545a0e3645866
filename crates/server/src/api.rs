//! HTTP API: health check and chat passthrough

use crate::chat::{ChatClient, ChatError};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Shared application state
pub struct AppState {
    pub chat: ChatClient,
}

impl AppState {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatInput {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatAnswer {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// Forward a chat question upstream and relay the answer.
///
/// A blank question is the caller's fault (400); everything the upstream
/// does wrong surfaces as a 502 so browser clients can distinguish "fix
/// your question" from "try again later".
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(input): Json<ChatInput>,
) -> Result<Json<ChatAnswer>, (StatusCode, Json<ErrorResponse>)> {
    match state.chat.ask(&input.message).await {
        Ok(answer) => Ok(Json(ChatAnswer { answer })),
        Err(e @ ChatError::EmptyQuestion) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
        Err(e) => {
            warn!(error = %e, "Chat passthrough failed");
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>, cors_permissive: bool) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .with_state(state);

    if cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>, cors_permissive: bool) -> anyhow::Result<()> {
    let app = create_router(state, cors_permissive);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app_with_cors(upstream: &str, cors_permissive: bool) -> Router {
        let chat = ChatClient::new(
            upstream,
            "test-key",
            "test-model",
            "context de prova".to_string(),
            5,
        )
        .unwrap();
        create_router(Arc::new(AppState::new(chat)), cors_permissive)
    }

    fn app(upstream: &str) -> Router {
        app_with_cors(upstream, true)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_returns_ok() {
        let app = app("http://127.0.0.1:1/v1/chat/completions");

        let response = app
            .oneshot(
                Request::builder()
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
    async fn test_cors_headers_follow_configuration() {
        let open = app_with_cors("http://127.0.0.1:1/v1/chat/completions", true);
        let response = open
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", "http://localhost:5500")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));

        let closed = app_with_cors("http://127.0.0.1:1/v1/chat/completions", false);
        let response = closed
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", "http://localhost:5500")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!response
            .headers()
            .contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn test_blank_question_is_bad_request() {
        let app = app("http://127.0.0.1:1/v1/chat/completions");

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"message": "  "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_chat_relays_upstream_answer() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(
                r#"{"choices": [{"message": {"role": "assistant", "content": "Resposta"}}]}"#,
            )
            .create_async()
            .await;

        let app = app(&format!("{}/v1/chat/completions", server.url()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"message": "Quin AP falla?"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["answer"], "Resposta");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let app = app(&format!("{}/v1/chat/completions", server.url()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"message": "pregunta"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
