//! JSON and form handlers.

use axum::{
    Form, Json,
    extract::{Multipart, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::{AppState, ui};
use crate::subsystems::notes::{NoteTags, ServiceError};

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(super) struct TagQuery {
    class_name: Option<String>,
    subject: Option<String>,
    topic: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AskForm {
    class_name: Option<String>,
    subject: Option<String>,
    topic: Option<String>,
    question: Option<String>,
    /// Kept as text so an empty form field means "use the default".
    k: Option<String>,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn json_error(kind: &str, msg: impl std::fmt::Display) -> Json<serde_json::Value> {
    Json(json!({ "status": "error", "kind": kind, "message": format!("{msg}") }))
}

/// Map a service error to a response. `/ask` reports a missing namespace as
/// 400; everywhere else it is 404.
fn error_response(e: &ServiceError, not_found: StatusCode) -> Response {
    let status = match e {
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotFound(_) => not_found,
        ServiceError::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, json_error(e.kind(), e)).into_response()
}

fn validation(msg: impl Into<String>) -> Response {
    error_response(&ServiceError::Validation(msg.into()), StatusCode::NOT_FOUND)
}

/// Pull the three tags out of optional form fields; any missing one is a 400.
fn require_tags(
    class_name: Option<String>,
    subject: Option<String>,
    topic: Option<String>,
) -> Result<NoteTags, Response> {
    let mut missing = Vec::new();
    let mut take = |name: &'static str, v: Option<String>| match v {
        Some(v) if !v.trim().is_empty() => v,
        _ => {
            missing.push(name);
            String::new()
        }
    };
    let tags = NoteTags::new(
        take("class_name", class_name),
        take("subject", subject),
        take("topic", topic),
    );
    if missing.is_empty() {
        Ok(tags)
    } else {
        Err(validation(format!("missing field(s): {}", missing.join(", "))))
    }
}

fn parse_k(raw: Option<&str>) -> Result<Option<usize>, Response> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<usize>()
            .map(Some)
            .map_err(|_| validation(format!("k must be a non-negative integer, got '{s}'"))),
    }
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// POST /ingest
pub(super) async fn ingest(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut class_name = None;
    let mut subject = None;
    let mut topic = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => break,
            Err(e) => return validation(format!("malformed multipart body: {e}")),
        };
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(b) => file = Some((file_name, b.to_vec())),
                    Err(e) => return validation(format!("cannot read file field: {e}")),
                }
            }
            "class_name" | "subject" | "topic" => {
                let value = match field.text().await {
                    Ok(v) => v,
                    Err(e) => return validation(format!("cannot read field {name}: {e}")),
                };
                match name.as_str() {
                    "class_name" => class_name = Some(value),
                    "subject" => subject = Some(value),
                    _ => topic = Some(value),
                }
            }
            _ => {}
        }
    }

    let tags = match require_tags(class_name, subject, topic) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let Some((file_name, bytes)) = file else {
        return validation("missing field(s): file");
    };

    let notes = &state.notes;
    let result = async {
        notes.save_upload(&file_name, &bytes).await?;
        notes.ingest_text(&file_name, &bytes, &tags).await
    }
    .await;

    match result {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            warn!(file = %file_name, kind = e.kind(), error = %e, "ingest failed");
            error_response(&e, StatusCode::NOT_FOUND)
        }
    }
}

/// GET /records
pub(super) async fn records(State(state): State<AppState>, Query(q): Query<TagQuery>) -> Response {
    let tags = match require_tags(q.class_name, q.subject, q.topic) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    match state.notes.preview_records(&tags).await {
        Ok(preview) => (StatusCode::OK, Json(preview)).into_response(),
        Err(e) => error_response(&e, StatusCode::NOT_FOUND),
    }
}

/// POST /ask: JSON when the client accepts it, otherwise an HTML answer page.
pub(super) async fn ask(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<AskForm>,
) -> Response {
    let tags = match require_tags(form.class_name, form.subject, form.topic) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let k = match parse_k(form.k.as_deref()) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    let question = form.question.unwrap_or_default();

    match state.notes.answer(&question, &tags, k).await {
        Ok(answer) if wants_json(&headers) => (StatusCode::OK, Json(answer)).into_response(),
        Ok(answer) => Html(ui::render_answer(&question, &tags, &answer)).into_response(),
        Err(e) => error_response(&e, StatusCode::BAD_REQUEST),
    }
}

/// GET /health: always 200; `reachable` reports the LLM probe.
pub(super) async fn health(State(state): State<AppState>) -> Response {
    let llm = state.notes.llm();
    let (reachable, message) = match llm.ping().await {
        Ok(()) => (true, "ok".to_string()),
        Err(e) => (false, e.to_string()),
    };
    info!(provider = llm.name(), reachable, "health check");

    let embedder = state.notes.embedder();
    let body = json!({
        "status": "ok",
        "name": &*state.name,
        "llm": {
            "provider": llm.name(),
            "model": llm.model(),
            "reachable": reachable,
            "message": message,
        },
        "embedding": {
            "provider": embedder.name(),
            "dimension": embedder.dimension(),
        },
    });
    (StatusCode::OK, Json(body)).into_response()
}
