//! Application-wide error types.
//!
//! `AppError` covers startup and infrastructure failures.  Request-level
//! failures use [`ServiceError`](crate::subsystems::notes::ServiceError),
//! which wraps these at the service boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
