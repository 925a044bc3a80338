//! Integration tests for the per-namespace vector store.

use tempfile::TempDir;

use classnotes::subsystems::memory::{Metadata, RecordInput, VectorStore};

// ── helpers ──────────────────────────────────────────────────────────────────

fn open_store() -> (TempDir, VectorStore) {
    let tmp = TempDir::new().expect("tempdir");
    let store = VectorStore::open(&tmp.path().join("vectors")).expect("open store");
    (tmp, store)
}

fn record(document: &str, embedding: Vec<f32>) -> RecordInput {
    RecordInput {
        document: document.into(),
        embedding,
        metadata: Metadata::from([("topic".to_string(), "heat".to_string())]),
    }
}

// ── collections ──────────────────────────────────────────────────────────────

#[test]
fn open_creates_dir_and_db() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("nested").join("vectors");
    VectorStore::open(&dir).expect("open should succeed");
    assert!(dir.join("vectors.db").exists());
}

#[test]
fn missing_collection_is_none() {
    let (_tmp, store) = open_store();
    assert!(store.get_collection("class10_physics_heat").unwrap().is_none());
}

#[test]
fn get_or_create_is_idempotent() {
    let (_tmp, store) = open_store();
    let a = store.get_or_create_collection("class10_physics_heat").unwrap();
    let b = store.get_or_create_collection("class10_physics_heat").unwrap();
    assert_eq!(a.id, b.id);
    assert_eq!(store.list_collections().unwrap(), vec!["class10_physics_heat"]);
}

#[test]
fn list_collections_sorted() {
    let (_tmp, store) = open_store();
    store.get_or_create_collection("b_topic").unwrap();
    store.get_or_create_collection("a_topic").unwrap();
    assert_eq!(store.list_collections().unwrap(), vec!["a_topic", "b_topic"]);
}

#[test]
fn store_reopens_with_data() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("vectors");
    {
        let store = VectorStore::open(&dir).unwrap();
        let c = store.get_or_create_collection("ns").unwrap();
        store.add(&c, vec![record("persisted", vec![1.0, 0.0])]).unwrap();
    }
    let store = VectorStore::open(&dir).unwrap();
    let c = store.get_collection("ns").unwrap().expect("collection survives reopen");
    assert_eq!(store.count(&c).unwrap(), 1);
}

// ── add ──────────────────────────────────────────────────────────────────────

#[test]
fn add_assigns_sequential_ids_across_calls() {
    let (_tmp, store) = open_store();
    let c = store.get_or_create_collection("ns").unwrap();

    let first = store
        .add(&c, vec![record("one", vec![1.0, 0.0]), record("two", vec![0.0, 1.0])])
        .unwrap();
    let second = store.add(&c, vec![record("three", vec![1.0, 1.0])]).unwrap();

    assert_eq!(first, vec!["ns_doc_0", "ns_doc_1"]);
    assert_eq!(second, vec!["ns_doc_2"]);
    assert_eq!(store.count(&c).unwrap(), 3);
}

#[test]
fn add_empty_is_noop() {
    let (_tmp, store) = open_store();
    let c = store.get_or_create_collection("ns").unwrap();
    assert!(store.add(&c, Vec::new()).unwrap().is_empty());
    assert_eq!(store.count(&c).unwrap(), 0);
}

#[test]
fn collections_are_isolated() {
    let (_tmp, store) = open_store();
    let a = store.get_or_create_collection("a").unwrap();
    let b = store.get_or_create_collection("b").unwrap();
    store.add(&a, vec![record("only in a", vec![1.0])]).unwrap();

    assert_eq!(store.count(&a).unwrap(), 1);
    assert_eq!(store.count(&b).unwrap(), 0);
    assert!(store.query(&b, &[1.0], 5).unwrap().is_empty());
}

// ── query ────────────────────────────────────────────────────────────────────

#[test]
fn query_ranks_by_cosine_similarity() {
    let (_tmp, store) = open_store();
    let c = store.get_or_create_collection("ns").unwrap();
    store
        .add(
            &c,
            vec![
                record("east", vec![1.0, 0.0]),
                record("north", vec![0.0, 1.0]),
                record("north-east", vec![1.0, 1.0]),
            ],
        )
        .unwrap();

    let hits = store.query(&c, &[0.0, 2.0], 2).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].record.document, "north");
    assert_eq!(hits[1].record.document, "north-east");
    assert!((hits[0].score - 1.0).abs() < 1e-6);
    assert!(hits[0].score >= hits[1].score);
    assert_eq!(hits[0].record.metadata["topic"], "heat");
}

#[test]
fn query_large_k_returns_everything() {
    let (_tmp, store) = open_store();
    let c = store.get_or_create_collection("ns").unwrap();
    store
        .add(&c, vec![record("a", vec![1.0, 0.0]), record("b", vec![0.0, 1.0])])
        .unwrap();
    assert_eq!(store.query(&c, &[1.0, 0.0], 1000).unwrap().len(), 2);
}

#[test]
fn query_ties_keep_insertion_order() {
    let (_tmp, store) = open_store();
    let c = store.get_or_create_collection("ns").unwrap();
    store
        .add(&c, vec![record("first", vec![1.0, 0.0]), record("second", vec![2.0, 0.0])])
        .unwrap();
    let hits = store.query(&c, &[1.0, 0.0], 2).unwrap();
    assert_eq!(hits[0].record.document, "first");
    assert_eq!(hits[1].record.document, "second");
}

#[test]
fn query_skips_mismatched_dimension() {
    let (_tmp, store) = open_store();
    let c = store.get_or_create_collection("ns").unwrap();
    store
        .add(&c, vec![record("two-d", vec![1.0, 0.0]), record("three-d", vec![1.0, 0.0, 0.0])])
        .unwrap();
    let hits = store.query(&c, &[1.0, 0.0, 0.0], 5).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].record.document, "three-d");
}

#[test]
fn query_zero_k_is_empty() {
    let (_tmp, store) = open_store();
    let c = store.get_or_create_collection("ns").unwrap();
    store.add(&c, vec![record("a", vec![1.0])]).unwrap();
    assert!(store.query(&c, &[1.0], 0).unwrap().is_empty());
}

// ── peek ─────────────────────────────────────────────────────────────────────

#[test]
fn peek_is_bounded_and_ordered() {
    let (_tmp, store) = open_store();
    let c = store.get_or_create_collection("ns").unwrap();
    let records = (0..5).map(|i| record(&format!("chunk {i}"), vec![1.0])).collect();
    store.add(&c, records).unwrap();

    let preview = store.peek(&c, 3).unwrap();
    assert_eq!(preview.len(), 3);
    assert_eq!(preview[0].id, "ns_doc_0");
    assert_eq!(preview[2].document, "chunk 2");
}
