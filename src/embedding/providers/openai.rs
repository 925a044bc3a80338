//! OpenAI-compatible embeddings client (`POST {base}/embeddings`).

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingError;
use crate::llm::ProviderError;
use crate::llm::providers::openai_compatible::check_status;

#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    url: String,
    model: String,
    dimension: usize,
    max_batch_size: usize,
    api_key: Option<String>,
}

impl OpenAiEmbedder {
    pub fn new(
        api_base_url: String,
        model: String,
        dimension: usize,
        timeout_seconds: u64,
        max_batch_size: usize,
        api_key: Option<String>,
    ) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| EmbeddingError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: format!("{}/embeddings", api_base_url.trim_end_matches('/')),
            model,
            dimension,
            max_batch_size: max_batch_size.max(1),
            api_key,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embed `texts` in slices of at most `max_batch_size`, keeping input order.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.max_batch_size) {
            let vectors = self.call(batch).await?;
            if vectors.len() != batch.len() {
                return Err(EmbeddingError::InvalidResponse(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }
            out.extend(vectors);
        }
        Ok(out)
    }

    async fn call(&self, batch: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let body = EmbeddingsRequest {
            model: &self.model,
            input: batch,
        };
        debug!(model = %self.model, inputs = batch.len(), "sending embedding request");

        let mut req = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await.map_err(|e| {
            error!(url = %self.url, error = %e, "embedding HTTP request failed (transport)");
            EmbeddingError::Request(e.to_string())
        })?;

        let response = check_status(response).await.map_err(|e| match e {
            ProviderError::Request(m) => EmbeddingError::Request(m),
            other => EmbeddingError::Request(other.to_string()),
        })?;

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(format!("failed to parse response body: {e}")))?;

        // Servers may return entries out of order.
        let mut data = parsed.data;
        data.sort_by_key(|d| d.index);
        if let Some(bad) = data
            .iter()
            .find(|d| d.embedding.is_empty() || d.embedding.iter().any(|v| !v.is_finite()))
        {
            return Err(EmbeddingError::InvalidResponse(format!(
                "embedding {} is empty or has non-finite components",
                bad.index
            )));
        }
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}
