//! Memory store implementations.

pub(crate) mod vector_core;
pub mod vector_store;
