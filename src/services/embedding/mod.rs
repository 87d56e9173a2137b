/// Text embedding abstraction
///
/// Free-text queries are embedded at request time and compared against the
/// embeddings stored with each item, so the service must produce vectors from
/// the same model and dimension the catalog was built with.
use crate::error::{AppError, AppResult};

pub mod openai;

pub use openai::OpenAiEmbedder;

/// Trait for embedding providers
///
/// Failures must surface as errors; an empty vector is never a valid answer.
#[async_trait::async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embeds a single text
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Stand-in used when no embedding credentials are configured
///
/// Requests that never need an embedding keep working; those that do fail
/// loudly instead of returning an empty result.
#[derive(Debug, Default, Clone)]
pub struct UnconfiguredEmbedder;

#[async_trait::async_trait]
impl EmbeddingService for UnconfiguredEmbedder {
    async fn embed(&self, _text: &str) -> AppResult<Vec<f32>> {
        Err(AppError::Upstream(
            "Embedding service is not configured (set OPENAI_API_KEY)".to_string(),
        ))
    }

    fn name(&self) -> &'static str {
        "unconfigured"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_embedder_fails() {
        let result = UnconfiguredEmbedder.embed("space opera").await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }
}
