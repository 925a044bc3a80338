//! `vector_store`: persistent, namespaced embedding store for note chunks.
//!
//! One SQLite file (`vectors.db`) under the store directory holds every
//! collection. Each call opens its own connection, so the handle is cheap to
//! clone and safe to use from `spawn_blocking` tasks concurrently; writers
//! serialize on SQLite's own lock.
//!
//! Similarity search is a brute-force cosine scan over one collection.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior, params};
use tracing::{debug, warn};

use crate::core::error::AppError;

use super::vector_core::{
    DB_FILENAME, cosine_similarity, decode_embedding, encode_embedding, init_db, now_iso8601,
    open_conn,
};

/// String tags attached to every record.
pub type Metadata = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

/// A record waiting to be appended. Its identifier is assigned by the store.
#[derive(Debug, Clone)]
pub struct RecordInput {
    pub document: String,
    pub embedding: Vec<f32>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: String,
    pub document: String,
    pub metadata: Metadata,
}

#[derive(Debug, Clone)]
pub struct QueryHit {
    pub record: StoredRecord,
    /// Cosine similarity in `[-1, 1]`.
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct VectorStore {
    dir: PathBuf,
    db_path: PathBuf,
}

impl VectorStore {
    /// Open (creating if needed) the store rooted at `dir`.
    pub fn open(dir: &Path) -> Result<Self, AppError> {
        fs::create_dir_all(dir).map_err(|e| {
            AppError::Store(format!("vector store: cannot create {}: {e}", dir.display()))
        })?;
        let store = Self {
            dir: dir.to_path_buf(),
            db_path: dir.join(DB_FILENAME),
        };
        let conn = store.conn()?;
        init_db(&conn)?;
        Ok(store)
    }

    pub fn root_dir(&self) -> &Path {
        &self.dir
    }

    fn conn(&self) -> Result<Connection, AppError> {
        open_conn(&self.db_path)
    }

    /// Look up a collection by name. `None` when it was never created.
    pub fn get_collection(&self, name: &str) -> Result<Option<Collection>, AppError> {
        let conn = self.conn()?;
        find_collection(&conn, name)
    }

    pub fn get_or_create_collection(&self, name: &str) -> Result<Collection, AppError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO collections (name, created_at) VALUES (?1, ?2)",
            params![name, now_iso8601()],
        )
        .map_err(|e| AppError::Store(format!("vector store: create collection {name}: {e}")))?;

        find_collection(&conn, name)?.ok_or_else(|| {
            AppError::Store(format!("vector store: collection {name} missing after create"))
        })
    }

    /// Names of every collection, alphabetically.
    pub fn list_collections(&self) -> Result<Vec<String>, AppError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT name FROM collections ORDER BY name")
            .map_err(|e| AppError::Store(format!("vector store: prepare list: {e}")))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| AppError::Store(format!("vector store: list collections: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Store(format!("vector store: decode collection row: {e}")))?;
        Ok(names)
    }

    /// Append `records` to `collection` in one transaction and return the
    /// assigned identifiers, `{collection}_doc_{n}` where `n` continues from
    /// the collection's current record count.
    ///
    /// Embeddings must be non-empty with finite components; one bad record
    /// rolls the whole batch back.
    pub fn add(
        &self,
        collection: &Collection,
        records: Vec<RecordInput>,
    ) -> Result<Vec<String>, AppError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| AppError::Store(format!("vector store: begin add tx: {e}")))?;
        let ids = insert_records(&tx, collection, records)?;
        tx.commit()
            .map_err(|e| AppError::Store(format!("vector store: commit add tx: {e}")))?;

        debug!(collection = %collection.name, added = ids.len(), "records appended");
        Ok(ids)
    }

    /// Create the collection `name` if needed and append `records` to it, all
    /// in one transaction. On error neither the collection nor any record is
    /// left behind.
    pub fn add_to_collection(
        &self,
        name: &str,
        records: Vec<RecordInput>,
    ) -> Result<(Collection, Vec<String>), AppError> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| AppError::Store(format!("vector store: begin add tx: {e}")))?;

        tx.execute(
            "INSERT OR IGNORE INTO collections (name, created_at) VALUES (?1, ?2)",
            params![name, now_iso8601()],
        )
        .map_err(|e| AppError::Store(format!("vector store: create collection {name}: {e}")))?;
        let collection = find_collection(&tx, name)?.ok_or_else(|| {
            AppError::Store(format!("vector store: collection {name} missing after create"))
        })?;

        let ids = insert_records(&tx, &collection, records)?;
        tx.commit()
            .map_err(|e| AppError::Store(format!("vector store: commit add tx: {e}")))?;

        debug!(collection = %collection.name, added = ids.len(), "records appended");
        Ok((collection, ids))
    }

    pub fn count(&self, collection: &Collection) -> Result<usize, AppError> {
        let conn = self.conn()?;
        count_in(&conn, collection.id)
    }

    /// The `k` records most similar to `vector`, best first. Equal scores keep
    /// insertion order. Records stored with a different dimension are skipped.
    pub fn query(
        &self,
        collection: &Collection,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<QueryHit>, AppError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT seq, record_id, document, embedding, dimension, metadata
                 FROM records WHERE collection_id = ?1 ORDER BY seq",
            )
            .map_err(|e| AppError::Store(format!("vector store: prepare query: {e}")))?;

        let rows = stmt
            .query_map(params![collection.id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Vec<u8>>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })
            .map_err(|e| AppError::Store(format!("vector store: run query: {e}")))?;

        let mut scored = Vec::new();
        let mut skipped = 0usize;
        for row in rows {
            let (seq, id, document, blob, dimension, metadata_json) =
                row.map_err(|e| AppError::Store(format!("vector store: read record row: {e}")))?;
            if dimension as usize != vector.len() {
                skipped += 1;
                continue;
            }
            let embedding = decode_embedding(&blob)?;
            let score = cosine_similarity(vector, &embedding);
            let record = StoredRecord {
                id,
                document,
                metadata: parse_metadata(&metadata_json)?,
            };
            scored.push((seq, QueryHit { record, score }));
        }

        if skipped > 0 {
            warn!(
                collection = %collection.name,
                skipped,
                expected = vector.len(),
                "skipped records with mismatched embedding dimension"
            );
        }

        scored.sort_by(|(seq_a, a), (seq_b, b)| {
            b.score.total_cmp(&a.score).then_with(|| seq_a.cmp(seq_b))
        });
        scored.truncate(k);
        Ok(scored.into_iter().map(|(_, hit)| hit).collect())
    }

    /// The first `limit` records of `collection` in insertion order.
    pub fn peek(&self, collection: &Collection, limit: usize) -> Result<Vec<StoredRecord>, AppError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT record_id, document, metadata FROM records
                 WHERE collection_id = ?1 ORDER BY seq LIMIT ?2",
            )
            .map_err(|e| AppError::Store(format!("vector store: prepare peek: {e}")))?;

        let rows = stmt
            .query_map(params![collection.id, limit as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(|e| AppError::Store(format!("vector store: run peek: {e}")))?;

        let mut out = Vec::new();
        for row in rows {
            let (id, document, metadata_json) =
                row.map_err(|e| AppError::Store(format!("vector store: read peek row: {e}")))?;
            out.push(StoredRecord {
                id,
                document,
                metadata: parse_metadata(&metadata_json)?,
            });
        }
        Ok(out)
    }
}

fn find_collection(conn: &Connection, name: &str) -> Result<Option<Collection>, AppError> {
    conn.query_row(
        "SELECT id, name, created_at FROM collections WHERE name = ?1",
        params![name],
        |row| {
            Ok(Collection {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: row.get(2)?,
            })
        },
    )
    .optional()
    .map_err(|e| AppError::Store(format!("vector store: find collection {name}: {e}")))
}

fn insert_records(
    tx: &Transaction<'_>,
    collection: &Collection,
    records: Vec<RecordInput>,
) -> Result<Vec<String>, AppError> {
    let existing = count_in(tx, collection.id)?;
    let created_at = now_iso8601();
    let mut ids = Vec::with_capacity(records.len());

    for (offset, record) in records.into_iter().enumerate() {
        let record_id = format!("{}_doc_{}", collection.name, existing + offset);
        if record.embedding.is_empty() {
            return Err(AppError::Store(format!(
                "vector store: {record_id} has an empty embedding"
            )));
        }
        if record.embedding.iter().any(|v| !v.is_finite()) {
            return Err(AppError::Store(format!(
                "vector store: {record_id} has a non-finite embedding component"
            )));
        }
        let metadata_json = serde_json::to_string(&record.metadata)
            .map_err(|e| AppError::Store(format!("vector store: serialize metadata: {e}")))?;
        tx.execute(
            "INSERT INTO records (collection_id, record_id, document, embedding, dimension, metadata, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                collection.id,
                record_id,
                record.document,
                encode_embedding(&record.embedding),
                record.embedding.len() as i64,
                metadata_json,
                created_at,
            ],
        )
        .map_err(|e| AppError::Store(format!("vector store: insert {record_id}: {e}")))?;
        ids.push(record_id);
    }
    Ok(ids)
}

fn count_in(conn: &Connection, collection_id: i64) -> Result<usize, AppError> {
    let n: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM records WHERE collection_id = ?1",
            params![collection_id],
            |row| row.get(0),
        )
        .map_err(|e| AppError::Store(format!("vector store: count records: {e}")))?;
    Ok(n as usize)
}

fn parse_metadata(json: &str) -> Result<Metadata, AppError> {
    serde_json::from_str(json)
        .map_err(|e| AppError::Store(format!("vector store: decode metadata: {e}")))
}
