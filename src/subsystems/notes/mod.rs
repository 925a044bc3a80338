//! Notes subsystem: ingestion, question answering and record previews over
//! per-namespace vector collections.
//!
//! [`NotesService`] is built once at startup and shared (it is cheap to clone)
//! by the HTTP handlers and the control CLI. Every operation is a single
//! stateless request against the store and the providers.
//!
//! - **namespace**: tag triple to collection key.
//! - **ingest**: upload validation, chunking, embedding, append.
//! - **query**: retrieval plus answer synthesis.
//! - **records**: bounded raw preview of a collection.

mod error;
mod ingest;
pub mod namespace;
pub mod prompt;
mod query;
mod records;

use std::path::PathBuf;

use tracing::info;

use crate::core::config::Config;
use crate::core::error::AppError;
use crate::embedding::{self, EmbeddingProvider};
use crate::llm::{self, LlmProvider};
use crate::subsystems::memory::VectorStore;

pub use error::ServiceError;
pub use ingest::{IngestSummary, sanitize_file_name, validate_file_name};
pub use namespace::{NoteTags, namespace_key};
pub use query::Answer;
pub use records::RecordPreview;

/// Knobs the service reads on every request.
#[derive(Debug, Clone)]
pub struct NotesSettings {
    pub chunk_size: usize,
    /// Extension without the dot, lowercase.
    pub allowed_extension: String,
    pub default_k: usize,
    pub preview_limit: usize,
    pub qa_template: String,
    pub uploads_dir: PathBuf,
}

impl NotesSettings {
    pub fn from_config(cfg: &Config) -> Result<Self, AppError> {
        Ok(Self {
            chunk_size: cfg.ingest.chunk_size,
            allowed_extension: cfg.ingest.allowed_extension.clone(),
            default_k: cfg.query.default_k,
            preview_limit: cfg.query.preview_limit,
            qa_template: prompt::load_template(cfg.query.prompt_template.as_deref())?,
            uploads_dir: cfg.uploads_dir(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct NotesService {
    store: VectorStore,
    embedder: EmbeddingProvider,
    llm: LlmProvider,
    settings: NotesSettings,
}

impl NotesService {
    pub fn new(
        store: VectorStore,
        embedder: EmbeddingProvider,
        llm: LlmProvider,
        settings: NotesSettings,
    ) -> Self {
        Self {
            store,
            embedder,
            llm,
            settings,
        }
    }

    /// Open the store and build both providers from `cfg`.
    pub fn from_config(cfg: &Config) -> Result<Self, AppError> {
        let store = VectorStore::open(&cfg.store_dir())?;
        let embedder = embedding::providers::build(&cfg.embedding, cfg.embedding_api_key.clone())
            .map_err(|e| AppError::Provider(e.to_string()))?;
        let llm = llm::providers::build(&cfg.llm, cfg.llm_api_key.clone())
            .map_err(|e| AppError::Provider(e.to_string()))?;
        let settings = NotesSettings::from_config(cfg)?;

        info!(
            store = %store.root_dir().display(),
            embedder = embedder.name(),
            dimension = embedder.dimension(),
            llm = llm.name(),
            "notes service ready"
        );
        Ok(Self::new(store, embedder, llm, settings))
    }

    pub fn settings(&self) -> &NotesSettings {
        &self.settings
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    pub fn llm(&self) -> &LlmProvider {
        &self.llm
    }

    pub fn embedder(&self) -> &EmbeddingProvider {
        &self.embedder
    }
}

/// Run a blocking store call off the async runtime.
async fn blocking<T, F>(f: F) -> Result<T, ServiceError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServiceError::Dependency(format!("store task failed: {e}")))?
        .map_err(ServiceError::from)
}
