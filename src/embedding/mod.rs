//! Text embedding backends.
//!
//! `EmbeddingProvider` mirrors [`LlmProvider`](crate::llm::LlmProvider):
//! an enum over concrete backends, built once at startup and cloned freely.
//!
//! - **hashing**: local, deterministic feature-hashing vectors. No network.
//! - **openai**: any OpenAI-compatible `/v1/embeddings` endpoint.

pub mod providers;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("unknown embedding provider: {0}")]
    UnknownProvider(String),
    #[error("embedding request failed: {0}")]
    Request(String),
    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone)]
pub enum EmbeddingProvider {
    Hashing(providers::hashing::HashingEmbedder),
    OpenAi(providers::openai::OpenAiEmbedder),
}

impl EmbeddingProvider {
    pub fn name(&self) -> &'static str {
        match self {
            EmbeddingProvider::Hashing(_) => "hashing",
            EmbeddingProvider::OpenAi(_) => "openai",
        }
    }

    /// Expected vector length. Remote backends report what they were configured with.
    pub fn dimension(&self) -> usize {
        match self {
            EmbeddingProvider::Hashing(p) => p.dimension(),
            EmbeddingProvider::OpenAi(p) => p.dimension(),
        }
    }

    /// Embed every text, preserving input order. Empty input yields an empty result.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        match self {
            EmbeddingProvider::Hashing(p) => Ok(texts.iter().map(|t| p.embed(t)).collect()),
            EmbeddingProvider::OpenAi(p) => p.embed_batch(texts).await,
        }
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match self {
            EmbeddingProvider::Hashing(p) => Ok(p.embed(text)),
            EmbeddingProvider::OpenAi(p) => p
                .embed_batch(&[text.to_string()])
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| EmbeddingError::InvalidResponse("empty embedding response".into())),
        }
    }
}
