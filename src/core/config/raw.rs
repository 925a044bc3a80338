//! Raw TOML deserialization types.
//!
//! These structs mirror the TOML file shape and use `serde` defaults.
//! The `load` module converts them into the public `types` structs.

use serde::Deserialize;

// ── Top-level ────────────────────────────────────────────────────────────────

/// Raw TOML shape, the serde target before resolution.
#[derive(Deserialize, Default)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub server: RawServer,
    #[serde(default)]
    pub ingest: RawIngest,
    #[serde(default)]
    pub query: RawQuery,
    #[serde(default)]
    pub embedding: RawEmbedding,
    #[serde(default)]
    pub llm: RawLlm,
}

#[derive(Deserialize)]
pub(super) struct RawServer {
    #[serde(default = "default_server_name")]
    pub name: String,
    #[serde(default = "default_work_dir")]
    pub work_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default = "default_http_bind")]
    pub bind: String,
    #[serde(default = "default_true")]
    pub cors_permissive: bool,
}

impl Default for RawServer {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            work_dir: default_work_dir(),
            log_level: default_log_level(),
            log_file: None,
            bind: default_http_bind(),
            cors_permissive: true,
        }
    }
}

// ── Ingest / query ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawIngest {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_allowed_extension")]
    pub allowed_extension: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for RawIngest {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            allowed_extension: default_allowed_extension(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawQuery {
    #[serde(default = "default_k")]
    pub default_k: usize,
    #[serde(default = "default_preview_limit")]
    pub preview_limit: usize,
    #[serde(default)]
    pub prompt_template: Option<String>,
}

impl Default for RawQuery {
    fn default() -> Self {
        Self {
            default_k: default_k(),
            preview_limit: default_preview_limit(),
            prompt_template: None,
        }
    }
}

// ── Embedding ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawEmbedding {
    #[serde(rename = "default", default = "default_embedding_provider")]
    pub provider: String,
    #[serde(default)]
    pub openai: RawOpenAiEmbedding,
    #[serde(default)]
    pub hashing: RawHashingEmbedding,
}

impl Default for RawEmbedding {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            openai: RawOpenAiEmbedding::default(),
            hashing: RawHashingEmbedding::default(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawOpenAiEmbedding {
    #[serde(default = "default_embedding_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

impl Default for RawOpenAiEmbedding {
    fn default() -> Self {
        Self {
            api_base_url: default_embedding_api_base_url(),
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            timeout_seconds: default_timeout_seconds(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawHashingEmbedding {
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
}

impl Default for RawHashingEmbedding {
    fn default() -> Self {
        Self {
            dimension: default_embedding_dimension(),
        }
    }
}

// ── LLM ─────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawLlm {
    #[serde(rename = "default", default = "default_llm_provider")]
    pub provider: String,
    #[serde(default)]
    pub openai: RawOpenAiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            openai: RawOpenAiConfig::default(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            temperature: default_openai_temperature(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

// ── Defaults ────────────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

pub(super) fn default_server_name() -> String {
    "classnotes".to_string()
}

pub(super) fn default_work_dir() -> String {
    "~/.classnotes".to_string()
}

pub(super) fn default_log_level() -> String {
    "info".to_string()
}

pub(super) fn default_http_bind() -> String {
    "127.0.0.1:8000".to_string()
}

pub(super) fn default_chunk_size() -> usize {
    1024
}

pub(super) fn default_allowed_extension() -> String {
    "txt".to_string()
}

pub(super) fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

pub(super) fn default_k() -> usize {
    3
}

pub(super) fn default_preview_limit() -> usize {
    10
}

pub(super) fn default_embedding_provider() -> String {
    "hashing".to_string()
}

pub(super) fn default_embedding_api_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

pub(super) fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

pub(super) fn default_embedding_dimension() -> usize {
    384
}

pub(super) fn default_max_batch_size() -> usize {
    64
}

pub(super) fn default_timeout_seconds() -> u64 {
    60
}

pub(super) fn default_llm_provider() -> String {
    "dummy".to_string()
}

pub(super) fn default_openai_api_base_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

pub(super) fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

pub(super) fn default_openai_temperature() -> f32 {
    0.2
}
