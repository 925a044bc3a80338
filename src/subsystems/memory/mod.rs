//! Memory subsystem: persistent storage for ingested notes.
//!
//! ```text
//! {work_dir}/
//! ├── vectors/
//! │   └── vectors.db     collections + records (embeddings, metadata)
//! └── uploads/           raw files received by /ingest
//! ```

pub mod stores;

pub use stores::vector_store::{
    Collection, Metadata, QueryHit, RecordInput, StoredRecord, VectorStore,
};
