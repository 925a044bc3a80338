//! `vector_core`: schema, connection factory and vector helpers for
//! [`VectorStore`](super::vector_store::VectorStore).
//!
//! ## What lives here
//! - **Schema**: `DB_FILENAME`, `SCHEMA_VERSION`, `init_db`.
//! - **Connection factory**: `open_conn` (WAL + foreign keys + busy timeout).
//! - **Vectors**: little-endian f32 blob codec and cosine similarity.

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;

use crate::core::error::AppError;

// ── Schema ────────────────────────────────────────────────────────────────────

pub(crate) const DB_FILENAME: &str = "vectors.db";

/// Stored in `PRAGMA user_version`. Bump when the DDL changes.
pub(crate) const SCHEMA_VERSION: i64 = 1;

/// Create the schema on a fresh database, or check the version of an existing one.
///
/// - `collections`: one row per namespace.
/// - `records`: chunks with their embedding blob and JSON metadata. `seq` is the
///   insertion order used for previews and score ties.
pub(crate) fn init_db(conn: &Connection) -> Result<(), AppError> {
    let version: i64 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .map_err(|e| AppError::Store(format!("vector store: read schema version: {e}")))?;

    if version == 0 {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS collections (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS records (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                collection_id INTEGER NOT NULL REFERENCES collections(id),
                record_id TEXT NOT NULL,
                document TEXT NOT NULL,
                embedding BLOB NOT NULL,
                dimension INTEGER NOT NULL,
                metadata TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (collection_id, record_id)
            );

            CREATE INDEX IF NOT EXISTS idx_records_collection
                ON records (collection_id, seq);

            PRAGMA user_version = 1;
            ",
        )
        .map_err(|e| AppError::Store(format!("vector store: initialize schema: {e}")))?;
        return Ok(());
    }

    if version != SCHEMA_VERSION {
        return Err(AppError::Store(format!(
            "vector store: unsupported schema version {version}, expected {SCHEMA_VERSION}"
        )));
    }
    Ok(())
}

// ── Connection helper ─────────────────────────────────────────────────────────

/// Open `db_path` with WAL journaling, foreign keys on and a 5 s busy timeout.
pub(crate) fn open_conn(db_path: &Path) -> Result<Connection, AppError> {
    let conn = Connection::open(db_path).map_err(|e| {
        AppError::Store(format!("vector store: open {}: {e}", db_path.display()))
    })?;

    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(|e| AppError::Store(format!("vector store: set journal_mode WAL: {e}")))?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(|e| AppError::Store(format!("vector store: set foreign_keys ON: {e}")))?;
    conn.pragma_update(None, "busy_timeout", 5000)
        .map_err(|e| AppError::Store(format!("vector store: set busy_timeout: {e}")))?;

    Ok(conn)
}

// ── Vector helpers ────────────────────────────────────────────────────────────

pub(crate) fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(std::mem::size_of_val(vector));
    for &value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

pub(crate) fn decode_embedding(blob: &[u8]) -> Result<Vec<f32>, AppError> {
    if blob.len() % 4 != 0 {
        return Err(AppError::Store(format!(
            "vector store: embedding blob length {} is not a multiple of 4",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Cosine similarity in f64. Zero-norm, mismatched or non-finite inputs score 0.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if !denom.is_finite() || denom <= f64::EPSILON {
        return 0.0;
    }
    let score = dot / denom;
    if score.is_finite() { score } else { 0.0 }
}

pub(crate) fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
