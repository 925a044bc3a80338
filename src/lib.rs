//! classnotes: question answering over teacher-uploaded class notes.
//!
//! Library root shared by the `classnotes` server, the `classnotes-ctl`
//! operator CLI and the integration tests.

pub mod bootstrap;
pub mod core;
pub mod embedding;
pub mod llm;
pub mod subsystems;

pub use crate::bootstrap::logger;
pub use crate::core::{config, error};
