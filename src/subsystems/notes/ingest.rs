//! Teacher uploads: validate, save, chunk, embed, append.

use std::path::{Path, PathBuf};

use serde::Serialize;
use text_splitter::TextSplitter;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{NoteTags, NotesService, ServiceError, blocking};
use crate::subsystems::memory::{Metadata, RecordInput};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub status: String,
    pub collection: String,
    /// Input files processed by this call.
    pub docs: usize,
    /// Chunks written to the collection.
    pub chunks: usize,
}

/// Accept `file_name` only when its extension matches `allowed_extension`
/// (case-insensitive).
pub fn validate_file_name(file_name: &str, allowed_extension: &str) -> Result<(), ServiceError> {
    let ok = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(allowed_extension));
    if ok {
        Ok(())
    } else {
        Err(ServiceError::Validation(format!("Only .{allowed_extension} allowed")))
    }
}

/// Strip directory components (either separator) from a client-supplied name.
/// `None` when nothing usable is left.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let name = raw.rsplit(['/', '\\']).next()?.trim();
    match name {
        "" | "." | ".." => None,
        n => Some(n.to_string()),
    }
}

impl NotesService {
    /// Keep a copy of an uploaded file under the uploads directory and return
    /// its path. Rejects disallowed extensions before touching the disk.
    ///
    /// Each upload gets its own `{uuid}-{name}` file, so concurrent uploads
    /// sharing a client file name never overwrite each other.
    pub async fn save_upload(&self, raw_name: &str, bytes: &[u8]) -> Result<PathBuf, ServiceError> {
        let file_name = sanitize_file_name(raw_name)
            .ok_or_else(|| ServiceError::Validation("missing file name".into()))?;
        validate_file_name(&file_name, &self.settings.allowed_extension)?;

        let dir = &self.settings.uploads_dir;
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            ServiceError::Dependency(format!("cannot create {}: {e}", dir.display()))
        })?;
        let path = dir.join(format!("{}-{file_name}", Uuid::now_v7()));
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            ServiceError::Dependency(format!("cannot save {}: {e}", path.display()))
        })?;

        debug!(path = %path.display(), bytes = bytes.len(), "upload saved");
        Ok(path)
    }

    /// Ingest one text file from disk into the namespace derived from `tags`.
    ///
    /// The file type is checked before the file is read.
    pub async fn ingest_text_file(
        &self,
        path: &Path,
        tags: &NoteTags,
    ) -> Result<IngestSummary, ServiceError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        validate_file_name(&file_name, &self.settings.allowed_extension)?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ServiceError::Dependency(format!("cannot read {}: {e}", path.display())))?;
        self.ingest_text(&file_name, &bytes, tags).await
    }

    /// Ingest the contents of one text document into the namespace derived
    /// from `tags`. `file_name` is recorded in each chunk's metadata.
    ///
    /// The name is checked before any embedding or store call. The collection
    /// and its chunks are written in one transaction, so a failure leaves no
    /// trace. An empty document still creates the collection and reports zero
    /// chunks.
    pub async fn ingest_text(
        &self,
        file_name: &str,
        bytes: &[u8],
        tags: &NoteTags,
    ) -> Result<IngestSummary, ServiceError> {
        let file_name = sanitize_file_name(file_name)
            .ok_or_else(|| ServiceError::Validation("missing file name".into()))?;
        validate_file_name(&file_name, &self.settings.allowed_extension)?;

        let collection_name = tags.namespace();

        let text = std::str::from_utf8(bytes)
            .map_err(|_| ServiceError::Validation(format!("{file_name} is not valid UTF-8 text")))?;

        let chunks: Vec<String> = TextSplitter::new(self.settings.chunk_size)
            .chunks(text)
            .map(str::to_string)
            .collect();

        let embeddings = self.embedder.embed_batch(&chunks).await?;
        if embeddings.len() != chunks.len() {
            return Err(ServiceError::Dependency(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let document_id = Uuid::now_v7().to_string();
        let records: Vec<RecordInput> = chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, (document, embedding))| RecordInput {
                document,
                embedding,
                metadata: chunk_metadata(tags, &file_name, &document_id, i),
            })
            .collect();
        let chunk_count = records.len();
        if chunk_count == 0 {
            warn!(collection = %collection_name, file = %file_name, "file has no text; collection created empty");
        }

        let store = self.store.clone();
        let name = collection_name.clone();
        blocking(move || store.add_to_collection(&name, records)).await?;

        info!(
            collection = %collection_name,
            file = %file_name,
            chunks = chunk_count,
            "notes ingested"
        );

        Ok(IngestSummary {
            status: "success".into(),
            collection: collection_name,
            docs: 1,
            chunks: chunk_count,
        })
    }
}

fn chunk_metadata(tags: &NoteTags, file_name: &str, document_id: &str, index: usize) -> Metadata {
    Metadata::from([
        ("class_name".to_string(), tags.class_name.clone()),
        ("subject".to_string(), tags.subject.clone()),
        ("topic".to_string(), tags.topic.clone()),
        ("file_name".to_string(), file_name.to_string()),
        ("document_id".to_string(), document_id.to_string()),
        ("chunk_index".to_string(), index.to_string()),
    ])
}
