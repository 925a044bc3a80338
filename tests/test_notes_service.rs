//! Integration tests for the notes service: ingestion, answering and record
//! previews against a real on-disk store.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use classnotes::config;
use classnotes::embedding::EmbeddingProvider;
use classnotes::embedding::providers::hashing::HashingEmbedder;
use classnotes::embedding::providers::openai::OpenAiEmbedder;
use classnotes::llm::LlmProvider;
use classnotes::llm::providers::dummy::DummyProvider;
use classnotes::llm::providers::openai_compatible::OpenAiCompatibleProvider;
use classnotes::subsystems::memory::VectorStore;
use classnotes::subsystems::notes::prompt::DEFAULT_QA_TEMPLATE;
use classnotes::subsystems::notes::{NoteTags, NotesService, NotesSettings, ServiceError};

const HEAT_NOTES: &str = "\
Water boils at 100 degrees Celsius at sea level.

Photosynthesis turns sunlight into chemical energy inside green leaves.

The French Revolution began in 1789 with the storming of the Bastille.

Newton's third law: every action has an equal and opposite reaction.
";

// ── helpers ──────────────────────────────────────────────────────────────────

fn settings(tmp: &TempDir) -> NotesSettings {
    NotesSettings {
        chunk_size: 80,
        allowed_extension: "txt".into(),
        default_k: 3,
        preview_limit: 10,
        qa_template: DEFAULT_QA_TEMPLATE.to_string(),
        uploads_dir: tmp.path().join("uploads"),
    }
}

fn service_with(tmp: &TempDir, embedder: EmbeddingProvider, llm: LlmProvider) -> NotesService {
    let store = VectorStore::open(&tmp.path().join("vectors")).expect("open store");
    NotesService::new(store, embedder, llm, settings(tmp))
}

fn service(tmp: &TempDir) -> NotesService {
    service_with(
        tmp,
        EmbeddingProvider::Hashing(HashingEmbedder::new(256)),
        LlmProvider::Dummy(DummyProvider),
    )
}

fn write_notes(tmp: &TempDir, name: &str, text: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, text).expect("write notes");
    p
}

fn heat_tags() -> NoteTags {
    NoteTags::new("Class 10", "Physics", "Heat")
}

// ── ingestion ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ingest_reports_files_and_chunks() {
    let tmp = TempDir::new().unwrap();
    let svc = service(&tmp);
    let file = write_notes(&tmp, "heat.txt", HEAT_NOTES);

    let summary = svc.ingest_text_file(&file, &heat_tags()).await.unwrap();
    assert_eq!(summary.status, "success");
    assert_eq!(summary.collection, "class_10_physics_heat");
    assert_eq!(summary.docs, 1);
    assert!(summary.chunks >= 4, "expected one chunk per paragraph, got {}", summary.chunks);

    let c = svc.store().get_collection("class_10_physics_heat").unwrap().unwrap();
    assert_eq!(svc.store().count(&c).unwrap(), summary.chunks);
}

#[tokio::test]
async fn non_txt_rejected_before_any_store_call() {
    let tmp = TempDir::new().unwrap();
    let svc = service(&tmp);
    let file = write_notes(&tmp, "heat.pdf", HEAT_NOTES);

    let err = svc.ingest_text_file(&file, &heat_tags()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(err.to_string(), "Only .txt allowed");
    assert!(svc.store().list_collections().unwrap().is_empty());
}

#[tokio::test]
async fn non_txt_rejected_before_any_embedding_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let embedder = OpenAiEmbedder::new(server.uri(), "m".into(), 3, 5, 16, None).unwrap();
    let svc = service_with(
        &tmp,
        EmbeddingProvider::OpenAi(embedder),
        LlmProvider::Dummy(DummyProvider),
    );
    let file = write_notes(&tmp, "notes.docx", HEAT_NOTES);

    let err = svc.ingest_text_file(&file, &heat_tags()).await.unwrap_err();
    assert_eq!(err.kind(), "validation");
    server.verify().await;
}

#[tokio::test]
async fn ingesting_twice_appends() {
    let tmp = TempDir::new().unwrap();
    let svc = service(&tmp);
    let file = write_notes(&tmp, "heat.txt", HEAT_NOTES);

    let first = svc.ingest_text_file(&file, &heat_tags()).await.unwrap();
    let c = svc.store().get_collection(&first.collection).unwrap().unwrap();
    let after_first = svc.store().count(&c).unwrap();

    let second = svc.ingest_text_file(&file, &heat_tags()).await.unwrap();
    let after_second = svc.store().count(&c).unwrap();

    assert_eq!(second.status, "success");
    assert!(after_second >= after_first);
    assert_eq!(after_second, first.chunks + second.chunks);
}

#[tokio::test]
async fn empty_file_creates_empty_collection() {
    let tmp = TempDir::new().unwrap();
    let svc = service(&tmp);
    let file = write_notes(&tmp, "empty.txt", "");

    let summary = svc.ingest_text_file(&file, &heat_tags()).await.unwrap();
    assert_eq!(summary.chunks, 0);
    assert_eq!(summary.docs, 1);

    let answer = svc.answer("anything?", &heat_tags(), None).await.unwrap();
    assert_eq!(answer.answer, "Empty Response");
    assert!(answer.sources.is_empty());
}

#[tokio::test]
async fn non_utf8_file_is_validation_error() {
    let tmp = TempDir::new().unwrap();
    let svc = service(&tmp);
    let p = tmp.path().join("latin1.txt");
    fs::write(&p, [0x66, 0x6f, 0xff, 0xfe, 0x6f]).unwrap();

    let err = svc.ingest_text_file(&p, &heat_tags()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn embedding_failure_is_dependency_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let embedder = OpenAiEmbedder::new(server.uri(), "m".into(), 3, 5, 16, None).unwrap();
    let svc = service_with(
        &tmp,
        EmbeddingProvider::OpenAi(embedder),
        LlmProvider::Dummy(DummyProvider),
    );
    let file = write_notes(&tmp, "heat.txt", HEAT_NOTES);

    let err = svc.ingest_text_file(&file, &heat_tags()).await.unwrap_err();
    assert_eq!(err.kind(), "dependency");
    assert!(svc.store().list_collections().unwrap().is_empty());
}

#[tokio::test]
async fn non_finite_embeddings_leave_no_collection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json")
                .set_body_string(r#"{"data":[{"index":0,"embedding":[1e39,0.5,0.1]}]}"#),
        )
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let embedder = OpenAiEmbedder::new(server.uri(), "m".into(), 3, 5, 16, None).unwrap();
    let svc = service_with(
        &tmp,
        EmbeddingProvider::OpenAi(embedder),
        LlmProvider::Dummy(DummyProvider),
    );

    let err = svc
        .ingest_text("heat.txt", b"Heat.", &heat_tags())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "dependency");
    assert!(svc.store().list_collections().unwrap().is_empty());
}

// ── uploads ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_upload_writes_sanitized_name() {
    let tmp = TempDir::new().unwrap();
    let svc = service(&tmp);

    let saved = svc.save_upload("../../heat.txt", b"hot").await.unwrap();
    assert_eq!(saved.parent(), Some(tmp.path().join("uploads").as_path()));
    let name = saved.file_name().unwrap().to_str().unwrap();
    assert!(name.ends_with("-heat.txt"), "{name}");
    assert_eq!(fs::read_to_string(&saved).unwrap(), "hot");
}

#[tokio::test]
async fn same_name_uploads_do_not_collide() {
    let tmp = TempDir::new().unwrap();
    let svc = service(&tmp);
    let physics = "Heat flows from hot bodies to cold ones.";
    let history = "The Bastille fell in 1789.";

    let (a, b) = tokio::join!(
        svc.save_upload("notes.txt", physics.as_bytes()),
        svc.save_upload("notes.txt", history.as_bytes()),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_ne!(a, b);
    assert_eq!(fs::read_to_string(&a).unwrap(), physics);
    assert_eq!(fs::read_to_string(&b).unwrap(), history);

    let history_tags = NoteTags::new("Class 9", "History", "Revolution");
    let physics_tags = heat_tags();
    let (p, h) = tokio::join!(
        svc.ingest_text("notes.txt", physics.as_bytes(), &physics_tags),
        svc.ingest_text("notes.txt", history.as_bytes(), &history_tags),
    );
    p.unwrap();
    h.unwrap();

    let heat = svc.preview_records(&heat_tags()).await.unwrap();
    assert_eq!(heat.documents, vec![physics.to_string()]);
    let revolution = svc.preview_records(&history_tags).await.unwrap();
    assert_eq!(revolution.documents, vec![history.to_string()]);
}

#[tokio::test]
async fn ingest_text_checks_name_before_embedding() {
    let tmp = TempDir::new().unwrap();
    let svc = service(&tmp);

    let err = svc
        .ingest_text("../slides.pdf", b"%PDF", &heat_tags())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Only .txt allowed");
    assert!(svc.store().list_collections().unwrap().is_empty());
}

#[tokio::test]
async fn save_upload_rejects_before_writing() {
    let tmp = TempDir::new().unwrap();
    let svc = service(&tmp);

    let err = svc.save_upload("slides.pptx", b"...").await.unwrap_err();
    assert_eq!(err.kind(), "validation");
    assert!(!tmp.path().join("uploads").exists());
}

// ── answering ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_namespace_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let svc = service(&tmp);

    let err = svc
        .answer("What is heat?", &NoteTags::new("Class 9", "Chemistry", "Acids"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert_eq!(
        err.to_string(),
        "Collection 'class_9_chemistry_acids' not found. Did you ingest notes first?"
    );
}

#[tokio::test]
async fn tags_match_regardless_of_case_and_padding() {
    let tmp = TempDir::new().unwrap();
    let svc = service(&tmp);
    let file = write_notes(&tmp, "heat.txt", HEAT_NOTES);
    svc.ingest_text_file(&file, &heat_tags()).await.unwrap();

    let shouty = NoteTags::new("  CLASS 10 ", "physics", " heat");
    let answer = svc.answer("boiling point of water", &shouty, None).await.unwrap();
    assert!(!answer.sources.is_empty());
}

#[tokio::test]
async fn verbatim_line_is_among_sources() {
    let tmp = TempDir::new().unwrap();
    let svc = service(&tmp);
    let file = write_notes(&tmp, "heat.txt", HEAT_NOTES);
    svc.ingest_text_file(&file, &heat_tags()).await.unwrap();

    let line = "Water boils at 100 degrees Celsius at sea level.";
    let answer = svc
        .answer("At what temperature does water boil at sea level?", &heat_tags(), None)
        .await
        .unwrap();

    assert!(!answer.sources.is_empty());
    assert!(answer.sources.len() <= 3);
    assert!(
        answer.sources.iter().any(|s| s.contains(line)),
        "sources: {:?}",
        answer.sources
    );
    assert!(answer.sources[0].starts_with("Node ID: class_10_physics_heat_doc_"));
    assert!(answer.answer.starts_with("[echo] "));
    assert!(answer.answer.contains("Query: At what temperature does water boil at sea level?"));
}

#[tokio::test]
async fn k_limits_sources_and_zero_means_one() {
    let tmp = TempDir::new().unwrap();
    let svc = service(&tmp);
    let file = write_notes(&tmp, "heat.txt", HEAT_NOTES);
    svc.ingest_text_file(&file, &heat_tags()).await.unwrap();

    let one = svc.answer("water", &heat_tags(), Some(0)).await.unwrap();
    assert_eq!(one.sources.len(), 1);

    let all = svc.answer("water", &heat_tags(), Some(500)).await.unwrap();
    let c = svc.store().get_collection("class_10_physics_heat").unwrap().unwrap();
    assert_eq!(all.sources.len(), svc.store().count(&c).unwrap());
}

#[tokio::test]
async fn blank_question_is_validation_error() {
    let tmp = TempDir::new().unwrap();
    let svc = service(&tmp);
    let err = svc.answer("   ", &heat_tags(), None).await.unwrap_err();
    assert_eq!(err.kind(), "validation");
}

#[tokio::test]
async fn llm_failure_is_reported_as_query_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let llm = OpenAiCompatibleProvider::new(
        format!("{}/v1/chat/completions", server.uri()),
        "gpt-4o-mini".into(),
        0.2,
        5,
        None,
    )
    .unwrap();
    let svc = service_with(
        &tmp,
        EmbeddingProvider::Hashing(HashingEmbedder::new(256)),
        LlmProvider::OpenAiCompatible(llm),
    );
    let file = write_notes(&tmp, "heat.txt", HEAT_NOTES);
    svc.ingest_text_file(&file, &heat_tags()).await.unwrap();

    let err = svc.answer("water?", &heat_tags(), None).await.unwrap_err();
    assert!(matches!(err, ServiceError::Dependency(_)));
    assert!(err.to_string().starts_with("Query failed: "), "{err}");
}

// ── records ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn preview_columns_have_equal_length() {
    let tmp = TempDir::new().unwrap();
    let svc = service(&tmp);
    let file = write_notes(&tmp, "heat.txt", HEAT_NOTES);
    svc.ingest_text_file(&file, &heat_tags()).await.unwrap();

    let preview = svc.preview_records(&heat_tags()).await.unwrap();
    assert_eq!(preview.status, "success");
    assert_eq!(preview.collection, "class_10_physics_heat");
    assert!(preview.count > 0);
    assert_eq!(preview.ids.len(), preview.count);
    assert_eq!(preview.documents.len(), preview.count);
    assert_eq!(preview.metadatas.len(), preview.count);
    assert_eq!(preview.metadatas[0]["file_name"], "heat.txt");
    assert_eq!(preview.metadatas[0]["class_name"], "Class 10");
}

#[tokio::test]
async fn preview_is_bounded() {
    let tmp = TempDir::new().unwrap();
    let store = VectorStore::open(&tmp.path().join("vectors")).unwrap();
    let mut s = settings(&tmp);
    s.preview_limit = 2;
    let svc = NotesService::new(
        store,
        EmbeddingProvider::Hashing(HashingEmbedder::new(64)),
        LlmProvider::Dummy(DummyProvider),
        s,
    );
    let file = write_notes(&tmp, "heat.txt", HEAT_NOTES);
    svc.ingest_text_file(&file, &heat_tags()).await.unwrap();

    let preview = svc.preview_records(&heat_tags()).await.unwrap();
    assert_eq!(preview.count, 2);
    assert_eq!(preview.ids, vec!["class_10_physics_heat_doc_0", "class_10_physics_heat_doc_1"]);
}

#[tokio::test]
async fn preview_unknown_namespace_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let svc = service(&tmp);
    let err = svc.preview_records(&heat_tags()).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert_eq!(err.to_string(), "Collection not found: class_10_physics_heat");
}

// ── wiring ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn from_config_uses_work_dir() {
    let tmp = TempDir::new().unwrap();
    let cfg = config::defaults_at(tmp.path());
    let svc = NotesService::from_config(&cfg).unwrap();

    assert_eq!(svc.store().root_dir(), tmp.path().join("vectors"));
    assert_eq!(svc.embedder().name(), "hashing");
    assert_eq!(svc.llm().name(), "dummy");
    assert_eq!(svc.settings().default_k, 3);
    assert_eq!(svc.settings().qa_template, DEFAULT_QA_TEMPLATE);
}
