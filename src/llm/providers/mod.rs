//! LLM provider implementations.
//!
//! `build(config, api_key)` is the factory called at startup.

pub mod dummy;
pub mod openai_compatible;

use crate::core::config::LlmConfig;
use crate::llm::{LlmProvider, ProviderError};

/// Construct an `LlmProvider` from config and an optional API key.
///
/// `api_key` is sourced from `LLM_API_KEY` (never TOML) and is `None` for
/// keyless local models such as Ollama. Groq and Ollama both speak the
/// OpenAI chat-completions dialect, so they share one backend.
pub fn build(config: &LlmConfig, api_key: Option<String>) -> Result<LlmProvider, ProviderError> {
    match config.provider.as_str() {
        "dummy" => Ok(LlmProvider::Dummy(dummy::DummyProvider)),
        "openai" | "openai-compatible" | "groq" | "ollama" => {
            let oai = &config.openai;
            let p = openai_compatible::OpenAiCompatibleProvider::new(
                oai.api_base_url.clone(),
                oai.model.clone(),
                oai.temperature,
                oai.timeout_seconds,
                api_key,
            )?;
            Ok(LlmProvider::OpenAiCompatible(p))
        }
        _ => Err(ProviderError::UnknownProvider(config.provider.clone())),
    }
}
