use serde::Serialize;

use super::{NoteTags, NotesService, ServiceError, blocking};
use crate::subsystems::memory::Metadata;

/// First records of a collection, column-wise. The three vectors share one
/// length, reported as `count`.
#[derive(Debug, Clone, Serialize)]
pub struct RecordPreview {
    pub status: String,
    pub collection: String,
    pub count: usize,
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub metadatas: Vec<Metadata>,
}

impl NotesService {
    pub async fn preview_records(&self, tags: &NoteTags) -> Result<RecordPreview, ServiceError> {
        let key = tags.namespace();
        let limit = self.settings.preview_limit;

        let store = self.store.clone();
        let lookup = key.clone();
        let records = blocking(move || match store.get_collection(&lookup)? {
            Some(c) => store.peek(&c, limit).map(Some),
            None => Ok(None),
        })
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Collection not found: {key}")))?;

        let mut preview = RecordPreview {
            status: "success".into(),
            collection: key,
            count: records.len(),
            ids: Vec::with_capacity(records.len()),
            documents: Vec::with_capacity(records.len()),
            metadatas: Vec::with_capacity(records.len()),
        };
        for r in records {
            preview.ids.push(r.id);
            preview.documents.push(r.document);
            preview.metadatas.push(r.metadata);
        }
        Ok(preview)
    }
}
