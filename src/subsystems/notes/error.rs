//! Request-level error taxonomy for the notes service.
//!
//! Only the HTTP layer maps these to status codes.

use thiserror::Error;

use crate::core::error::AppError;
use crate::embedding::EmbeddingError;
use crate::llm::ProviderError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Bad input, rejected before any external call.
    #[error("{0}")]
    Validation(String),

    /// The namespace has never been ingested into.
    #[error("{0}")]
    NotFound(String),

    /// Embedding, store, LLM or filesystem failure.
    #[error("{0}")]
    Dependency(String),
}

impl ServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Dependency(_) => "dependency",
        }
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::Dependency(e.to_string())
    }
}

impl From<ProviderError> for ServiceError {
    fn from(e: ProviderError) -> Self {
        ServiceError::Dependency(e.to_string())
    }
}

impl From<EmbeddingError> for ServiceError {
    fn from(e: EmbeddingError) -> Self {
        ServiceError::Dependency(e.to_string())
    }
}
