//! Embedding backend implementations and the startup factory.

pub mod hashing;
pub mod openai;

use crate::core::config::EmbeddingConfig;
use crate::embedding::{EmbeddingError, EmbeddingProvider};

/// Construct an `EmbeddingProvider` from config.
///
/// `api_key` comes from `EMBEDDING_API_KEY` and is optional so local
/// OpenAI-compatible servers work without one.
pub fn build(
    config: &EmbeddingConfig,
    api_key: Option<String>,
) -> Result<EmbeddingProvider, EmbeddingError> {
    match config.provider.as_str() {
        "hashing" => Ok(EmbeddingProvider::Hashing(hashing::HashingEmbedder::new(
            config.hashing.dimension,
        ))),
        "openai" | "openai-compatible" => {
            let o = &config.openai;
            let p = openai::OpenAiEmbedder::new(
                o.api_base_url.clone(),
                o.model.clone(),
                o.dimension,
                o.timeout_seconds,
                o.max_batch_size,
                api_key,
            )?;
            Ok(EmbeddingProvider::OpenAi(p))
        }
        other => Err(EmbeddingError::UnknownProvider(other.to_string())),
    }
}
