//! Axum HTTP front end: upload, ask and record-inspection endpoints plus the
//! teacher and student HTML pages.
//!
//! ## URL layout
//!
//! ```text
//! GET  /             → 303 /teacher
//! GET  /teacher      upload form
//! POST /ingest       multipart: class_name, subject, topic, file
//! GET  /records      ?class_name=&subject=&topic=
//! GET  /student      question form
//! POST /ask          form: class_name, subject, topic, question, k
//! GET  /health
//! GET  /favicon.ico  → 204
//! ```
//!
//! Handlers are thin: they parse input, call [`NotesService`] and map
//! [`ServiceError`](crate::subsystems::notes::ServiceError) to a status code.

mod api;
mod ui;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::core::config::HttpConfig;
use crate::core::error::AppError;
use crate::subsystems::notes::NotesService;

/// Router state injected into every handler via [`axum::extract::State`].
/// Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub notes: Arc<NotesService>,
    /// Service name shown in `/health`.
    pub name: Arc<str>,
}

impl AppState {
    pub fn new(notes: NotesService, name: &str) -> Self {
        Self {
            notes: Arc::new(notes),
            name: Arc::from(name),
        }
    }
}

/// Extra request limits and middleware switches for [`build_router`].
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub max_upload_bytes: usize,
    pub cors_permissive: bool,
}

pub fn build_router(state: AppState, opts: &RouterOptions) -> Router {
    let router = Router::new()
        .route("/", get(ui::root))
        .route("/teacher", get(ui::teacher))
        .route("/student", get(ui::student))
        .route("/ingest", post(api::ingest))
        .route("/records", get(api::records))
        .route("/ask", post(api::ask))
        .route("/health", get(api::health))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .layer(DefaultBodyLimit::max(opts.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if opts.cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Bind `http.bind` and serve until `shutdown` is cancelled.
pub async fn run_server(
    state: AppState,
    http: &HttpConfig,
    max_upload_bytes: usize,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let opts = RouterOptions {
        max_upload_bytes,
        cors_permissive: http.cors_permissive,
    };
    let router = build_router(state, &opts);
    let bind_addr = http.bind.as_str();

    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("bind failed on {bind_addr}: {e}")))?;

    info!(%bind_addr, "http server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Server(format!("axum server error: {e}")))?;

    info!("http server shut down");
    Ok(())
}
