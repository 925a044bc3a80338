//! Dummy LLM provider: echoes the prompt back prefixed with `[echo]`.
//! Lets the whole ask flow run without an API key.

use crate::llm::{LlmResponse, ProviderError};

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn complete(
        &self,
        content: &str,
        _system: Option<&str>,
    ) -> Result<LlmResponse, ProviderError> {
        Ok(LlmResponse {
            text: format!("[echo] {content}"),
            usage: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn complete_prefixes_echo() {
        let p = DummyProvider;
        assert_eq!(p.complete("hello", None).await.unwrap().text, "[echo] hello");
    }

    #[tokio::test]
    async fn system_prompt_ignored() {
        let p = DummyProvider;
        let r = p.complete("q", Some("be brief")).await.unwrap();
        assert_eq!(r.text, "[echo] q");
        assert!(r.usage.is_none());
    }
}
