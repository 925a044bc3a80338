//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies `CLASSNOTES_*` env overrides. API keys come only from the
//! environment (`LLM_API_KEY`, `EMBEDDING_API_KEY`).
//!
//! # Module layout
//!
//! - **types**: public structs consumed by subsystems (`Config`, `LlmConfig`,
//!   `EmbeddingConfig`, ...).
//! - **raw**: TOML deserialization types with serde defaults; kept private.
//! - **load**: `merge_toml`, `load_raw_merged`, `load`, `load_from`,
//!   `expand_home`.

mod load;
mod raw;
mod types;

pub use load::{EnvOverrides, defaults_at, expand_home, load, load_from};
pub use types::*;
