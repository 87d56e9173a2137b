/// OpenAI embeddings provider
///
/// API Flow:
/// `POST /v1/embeddings` with `{model, input}` → `{data: [{embedding: [...]}]}`
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::{
    error::{AppError, AppResult},
    services::embedding::EmbeddingService,
};

#[derive(Clone)]
pub struct OpenAiEmbedder {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl OpenAiEmbedder {
    pub fn new(
        api_key: String,
        api_url: String,
        model: String,
        dimensions: usize,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url,
            model,
            dimensions,
        })
    }

    /// Pulls the first embedding out of a response body and checks its size
    fn parse_embedding(&self, body: &str) -> AppResult<Vec<f32>> {
        let parsed: EmbeddingResponse = serde_json::from_str(body).map_err(|e| {
            AppError::Upstream(format!("Failed to parse embedding response: {}", e))
        })?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| AppError::Upstream("No embedding returned from OpenAI".to_string()))?;

        if embedding.len() != self.dimensions {
            return Err(AppError::Upstream(format!(
                "Embedding has {} dimensions, expected {}",
                embedding.len(),
                self.dimensions
            )));
        }

        Ok(embedding)
    }
}

/// Human-readable message from an OpenAI error body, falling back to the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

#[async_trait::async_trait]
impl EmbeddingService for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Cannot embed empty text".to_string(),
            ));
        }

        let start = Instant::now();

        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout("Embedding request timed out".to_string())
                } else {
                    AppError::HttpClient(e)
                }
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body);
            tracing::error!(status = %status, error = %message, "OpenAI embedding request failed");
            return Err(AppError::Upstream(format!(
                "OpenAI API error: {}",
                message
            )));
        }

        let embedding = self.parse_embedding(&body)?;

        tracing::info!(
            model = %self.model,
            dimensions = embedding.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            provider = "openai",
            "Query embedded"
        );

        Ok(embedding)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
