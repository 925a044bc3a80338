//! Public configuration types.
//!
//! These are the resolved, ready-to-use structs that subsystems consume.
//! Raw TOML deserialization types live in `raw.rs`.

use std::path::PathBuf;

// ── HTTP ─────────────────────────────────────────────────────────────────────

/// HTTP front-end configuration (from `[server]`).
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Socket address the axum listener binds to.
    pub bind: String,
    /// Allow any origin / method / header.
    pub cors_permissive: bool,
}

// ── Ingestion / query ────────────────────────────────────────────────────────

/// Ingestion settings (from `[ingest]`).
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Approximate maximum characters per chunk handed to the embedder.
    pub chunk_size: usize,
    /// File extension accepted for uploads, without the dot (e.g. `"txt"`).
    pub allowed_extension: String,
    /// Request body cap for `/ingest`.
    pub max_upload_bytes: usize,
}

/// Query settings (from `[query]`).
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Number of chunks retrieved when the caller does not pass `k`.
    pub default_k: usize,
    /// Number of records returned by the `/records` preview.
    pub preview_limit: usize,
    /// Optional template file with `{{context}}` and `{{question}}` placeholders.
    pub prompt_template: Option<PathBuf>,
}

// ── Embedding ────────────────────────────────────────────────────────────────

/// OpenAI-compatible embeddings endpoint (`[embedding.openai]`).
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingConfig {
    /// Base URL; `/embeddings` is appended.
    pub api_base_url: String,
    pub model: String,
    /// Expected vector dimension (informational; the server decides).
    pub dimension: usize,
    pub timeout_seconds: u64,
    /// Maximum texts per request.
    pub max_batch_size: usize,
}

/// Local feature-hashing embedder (`[embedding.hashing]`).
#[derive(Debug, Clone)]
pub struct HashingEmbeddingConfig {
    pub dimension: usize,
}

/// Embedding subsystem configuration.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Which provider is active (`"hashing"` or `"openai"`).
    pub provider: String,
    pub openai: OpenAiEmbeddingConfig,
    pub hashing: HashingEmbeddingConfig,
}

// ── LLM ──────────────────────────────────────────────────────────────────────

/// OpenAI / OpenAI-compatible provider configuration.
/// Populated from `[llm.openai]` in the TOML.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    /// Sampling temperature (ignored for models that forbid it).
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// LLM subsystem configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (e.g. `"dummy"`, `"openai"`, `"groq"`).
    pub provider: String,
    /// Config for the OpenAI-compatible provider (`[llm.openai]`).
    pub openai: OpenAiConfig,
}

// ── Top level ────────────────────────────────────────────────────────────────

/// Fully-resolved service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub name: String,
    /// Working directory for all persistent data (already expanded, no `~`).
    pub work_dir: PathBuf,
    pub log_level: String,
    /// Append logs to this file instead of stderr.
    pub log_file: Option<PathBuf>,
    pub http: HttpConfig,
    pub ingest: IngestConfig,
    pub query: QueryConfig,
    pub embedding: EmbeddingConfig,
    /// API key from `EMBEDDING_API_KEY` env var. Never sourced from TOML.
    pub embedding_api_key: Option<String>,
    pub llm: LlmConfig,
    /// API key from `LLM_API_KEY` env var; `None` for keyless local models.
    /// Never sourced from TOML.
    pub llm_api_key: Option<String>,
}

impl Config {
    /// Directory owned by the vector store.
    pub fn store_dir(&self) -> PathBuf {
        self.work_dir.join("vectors")
    }

    /// Directory where uploaded note files are kept.
    pub fn uploads_dir(&self) -> PathBuf {
        self.work_dir.join("uploads")
    }
}
