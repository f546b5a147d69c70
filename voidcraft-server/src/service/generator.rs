//! Story generator
//!
//! The story generation pipeline is an external collaborator. The service
//! only knows it through `StoryGenerator::generate`, which may take an
//! arbitrary amount of time and may fail.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use voidcraft_core::domain::inputs::{CraftInputs, KickoffPayload};
use voidcraft_core::domain::job::StoryResult;

/// Capability that turns crafting inputs into a story
#[async_trait]
pub trait StoryGenerator: Send + Sync {
    /// Runs the generation pipeline once
    ///
    /// # Arguments
    /// * `inputs` - Validated crafting inputs
    ///
    /// # Returns
    /// The raw result, structured or plain text
    async fn generate(&self, inputs: &CraftInputs) -> Result<StoryResult>;
}

/// StoryGenerator backed by an HTTP kickoff endpoint
///
/// Sends `{"inputs": {...}}` as JSON. A JSON response becomes a structured
/// result, any other body is kept as text.
pub struct HttpStoryGenerator {
    client: Client,
    url: String,
}

impl HttpStoryGenerator {
    /// Creates a new HTTP story generator
    ///
    /// # Arguments
    /// * `url` - Kickoff endpoint (e.g., "http://localhost:8001/kickoff")
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl StoryGenerator for HttpStoryGenerator {
    async fn generate(&self, inputs: &CraftInputs) -> Result<StoryResult> {
        let response = self
            .client
            .post(&self.url)
            .json(&KickoffRequest {
                inputs: inputs.kickoff_payload(),
            })
            .send()
            .await
            .context("Failed to reach story generator")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Story generator returned {}: {}", status, body);
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        let body = response
            .text()
            .await
            .context("Failed to read story generator response")?;

        if is_json {
            if let Ok(value) = serde_json::from_str(&body) {
                return Ok(StoryResult::Structured(value));
            }
        }

        Ok(StoryResult::Text(body))
    }
}

#[derive(Debug, Serialize)]
struct KickoffRequest<'a> {
    inputs: KickoffPayload<'a>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::{Value, json};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/kickoff", addr)
    }

    fn inputs() -> CraftInputs {
        CraftInputs::new(
            "medieval".to_string(),
            vec!["Arthur".to_string(), "Merlin".to_string()],
            2026,
        )
    }

    #[tokio::test]
    async fn test_json_response_is_structured() {
        let app = Router::new().route(
            "/kickoff",
            post(|Json(body): Json<Value>| async move {
                Json(json!({ "echo": body["inputs"] }))
            }),
        );
        let generator = HttpStoryGenerator::new(serve(app).await);

        let result = generator.generate(&inputs()).await.unwrap();
        assert_eq!(
            result,
            StoryResult::Structured(json!({
                "echo": {
                    "age": "medieval",
                    "names": "Arthur, Merlin",
                    "names_array": ["Arthur", "Merlin"],
                    "current_year": "2026",
                }
            }))
        );
    }

    #[tokio::test]
    async fn test_plain_response_is_text() {
        let app = Router::new().route("/kickoff", post(|| async { "A knight rode out." }));
        let generator = HttpStoryGenerator::new(serve(app).await);

        let result = generator.generate(&inputs()).await.unwrap();
        assert_eq!(result, StoryResult::Text("A knight rode out.".to_string()));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let app = Router::new().route(
            "/kickoff",
            post(|| async { (StatusCode::BAD_GATEWAY, "llm offline") }),
        );
        let generator = HttpStoryGenerator::new(serve(app).await);

        let err = generator.generate(&inputs()).await.unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("502"));
        assert!(message.contains("llm offline"));
    }

    #[tokio::test]
    async fn test_unreachable_generator_fails() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let generator = HttpStoryGenerator::new(format!("http://{}/kickoff", addr));
        let err = generator.generate(&inputs()).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to reach story generator"));
    }
}
