//! Chat passthrough to the upstream language-model API
//!
//! The server never interprets questions itself. It wraps each one in a
//! fixed Catalan system prompt plus the campus context document, forwards
//! the completion request upstream with bearer auth, and relays the first
//! choice's content back.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const SYSTEM_PROMPT: &str = "Ets un assistent expert de la xarxa WiFi de la UAB. \
    Respon en català i cita dades concretes quan sigui possible.";

/// Chat passthrough failures, mapped to HTTP statuses by the API layer.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Cal proporcionar una pregunta")]
    EmptyQuestion,

    #[error("Failed to contact the upstream API")]
    Transport(#[source] reqwest::Error),

    #[error("Upstream API returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Upstream API returned an invalid response shape")]
    InvalidResponse,
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Client for the upstream chat-completion API.
pub struct ChatClient {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
    context: String,
}

impl ChatClient {
    /// Create a client. `context` is the document every question is grounded
    /// in; it is read once at startup, never re-read per request.
    pub fn new(
        endpoint: &str,
        api_key: &str,
        model: &str,
        context: String,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;
        let endpoint = Url::parse(endpoint).context("Invalid upstream URL")?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.to_string(),
            model: model.to_string(),
            context,
        })
    }

    /// Forward one question upstream and return the answer text.
    pub async fn ask(&self, question: &str) -> Result<String, ChatError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ChatError::EmptyQuestion);
        }

        let user_prompt = format!(
            "Basant-te exclusivament en el següent context respon la pregunta:\n\n\
             --- CONTEXT ---\n{}\n--- PREGUNTA ---\n{}",
            self.context, question
        );
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: user_prompt,
                },
            ],
            max_tokens: 500,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(ChatError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let completion: CompletionResponse =
            response.json().await.map_err(|_| ChatError::InvalidResponse)?;
        let answer = completion
            .choices
            .into_iter()
            .next()
            .ok_or(ChatError::InvalidResponse)?
            .message
            .content;

        Ok(answer.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> ChatClient {
        ChatClient::new(
            endpoint,
            "test-key",
            "test-model",
            "APs del campus".to_string(),
            5,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_blank_question_rejected_before_any_request() {
        let chat = client("http://127.0.0.1:1/v1/chat/completions");
        let err = chat.ask("   ").await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyQuestion));
    }

    #[tokio::test]
    async fn test_answer_relayed_from_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_body(
                r#"{"choices": [{"message": {"role": "assistant", "content": " L'AP més carregat és AP-C1-01. "}}]}"#,
            )
            .create_async()
            .await;

        let chat = client(&format!("{}/v1/chat/completions", server.url()));
        let answer = chat.ask("Quin AP està més carregat?").await.unwrap();

        mock.assert_async().await;
        assert_eq!(answer, "L'AP més carregat és AP-C1-01.");
    }

    #[tokio::test]
    async fn test_upstream_error_carries_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let chat = client(&format!("{}/v1/chat/completions", server.url()));
        let err = chat.ask("pregunta").await.unwrap_err();

        match err {
            ChatError::Upstream { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let chat = client(&format!("{}/v1/chat/completions", server.url()));
        let err = chat.ask("pregunta").await.unwrap_err();
        assert!(matches!(err, ChatError::InvalidResponse));
    }
}
