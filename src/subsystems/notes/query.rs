//! Student questions: retrieve the nearest chunks, then ask the LLM.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::prompt::{PromptBuilder, SYSTEM_PROMPT};
use super::{NoteTags, NotesService, ServiceError, blocking};
use crate::subsystems::memory::{Collection, QueryHit};

/// Returned instead of calling the LLM when the collection holds no chunks.
const EMPTY_RESPONSE: &str = "Empty Response";

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub answer: String,
    /// Retrieved chunks, best first.
    pub sources: Vec<String>,
}

impl NotesService {
    /// Answer `question` from the notes filed under `tags`.
    ///
    /// `k` defaults to `[query] default_k`; zero is treated as one. A namespace
    /// that was never ingested is [`ServiceError::NotFound`].
    pub async fn answer(
        &self,
        question: &str,
        tags: &NoteTags,
        k: Option<usize>,
    ) -> Result<Answer, ServiceError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ServiceError::Validation("question must not be empty".into()));
        }

        let key = tags.namespace();
        let k = k.unwrap_or(self.settings.default_k).max(1);

        let store = self.store.clone();
        let lookup = key.clone();
        let collection = blocking(move || store.get_collection(&lookup))
            .await
            .map_err(query_failed)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Collection '{key}' not found. Did you ingest notes first?"
                ))
            })?;

        self.retrieve_and_synthesize(question, collection, k)
            .await
            .map_err(|e| {
                warn!(collection = %key, error = %e, "query failed");
                query_failed(e)
            })
    }

    async fn retrieve_and_synthesize(
        &self,
        question: &str,
        collection: Collection,
        k: usize,
    ) -> Result<Answer, ServiceError> {
        let vector = self.embedder.embed(question).await?;

        let store = self.store.clone();
        let name = collection.name.clone();
        let hits = blocking(move || store.query(&collection, &vector, k)).await?;
        debug!(collection = %name, k, hits = hits.len(), "retrieved chunks");

        if hits.is_empty() {
            return Ok(Answer {
                answer: EMPTY_RESPONSE.to_string(),
                sources: Vec::new(),
            });
        }

        let context = hits
            .iter()
            .map(|h| h.record.document.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let prompt = PromptBuilder::new(self.settings.qa_template.as_str())
            .var("context", context)
            .var("question", question)
            .build();

        let response = self.llm.complete(&prompt, Some(SYSTEM_PROMPT)).await?;
        info!(
            collection = %name,
            k,
            sources = hits.len(),
            input_tokens = response.usage.map(|u| u.input_tokens),
            output_tokens = response.usage.map(|u| u.output_tokens),
            "question answered"
        );

        Ok(Answer {
            answer: response.text,
            sources: hits.iter().map(render_source).collect(),
        })
    }
}

fn query_failed(e: ServiceError) -> ServiceError {
    match e {
        ServiceError::Dependency(m) => ServiceError::Dependency(format!("Query failed: {m}")),
        other => other,
    }
}

/// `Node ID / Text / Score` block shown under an answer.
pub(super) fn render_source(hit: &QueryHit) -> String {
    format!(
        "Node ID: {}\nText: {}\nScore: {:.3}",
        hit.record.id, hit.record.document, hit.score
    )
}
