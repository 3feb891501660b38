//! HTTP surface of the diagnosis service.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/questions` | Question catalogue records |
//! | POST | `/api/submit_diagnosis` | Score, stamp and persist a submission |
//! | POST | `/api/download_excel` | Spreadsheet report of a result payload |
//! | POST | `/api/download_pdf` | PDF report of a result payload |
//! | GET | `/*` | Static front-end (`index.html` at `/`) |
use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use indexmap::IndexMap;
use serde::Deserialize;
use tokio::sync::Mutex;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use diagnosis_core::catalogue::Catalogue;
use diagnosis_core::intake::Intake;
use diagnosis_core::model::{Answer, DiagnosisResult};
use diagnosis_core::report::{self, ReportRenderer};
use diagnosis_core::scoring;

use crate::error::AppError;

/// Shared application state. The catalogue is immutable after startup; the
/// intake is behind a mutex so one submission touches the files at a time.
#[derive(Clone)]
pub struct AppState {
    catalogue: Arc<Catalogue>,
    intake: Arc<Mutex<Intake>>,
    renderer: ReportRenderer,
}

impl AppState {
    pub fn new(catalogue: Arc<Catalogue>, intake: Intake, renderer: ReportRenderer) -> Self {
        Self {
            catalogue,
            intake: Arc::new(Mutex::new(intake)),
            renderer,
        }
    }
}

pub fn create_router(state: AppState, static_root: &Path) -> Router {
    Router::new()
        .route("/health", get(handle_health_check))
        .route("/api/questions", get(handle_get_questions))
        .route("/api/submit_diagnosis", post(handle_submit_diagnosis))
        .route("/api/download_excel", post(handle_download_excel))
        .route("/api/download_pdf", post(handle_download_pdf))
        .fallback_service(ServeDir::new(static_root))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest {
    surveyor_name: Option<String>,
    answers: Option<IndexMap<String, Answer>>,
}

async fn handle_health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK" }))
}

async fn handle_get_questions(State(state): State<AppState>) -> Json<Vec<serde_json::Value>> {
    Json(state.catalogue.records())
}

async fn handle_submit_diagnosis(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<DiagnosisResult>, AppError> {
    let Json(req) = payload?;
    let surveyor_name =
        scoring::validate_submission(req.surveyor_name.as_deref(), req.answers.as_ref())?
            .to_string();
    let answers = req.answers.unwrap_or_default();
    info!(surveyor = %surveyor_name, answers = answers.len(), "received diagnosis submission");

    let scorecard = scoring::score(&state.catalogue, &answers);
    info!(
        total_score = scorecard.total_score,
        categories = scorecard.category_scores.len(),
        "calculated category scores"
    );

    let intake = Arc::clone(&state.intake).lock_owned().await;
    let result = tokio::task::spawn_blocking(move || intake.record(surveyor_name, scorecard)).await??;
    info!(serial = %result.id, "diagnosis stored");
    Ok(Json(result))
}

async fn handle_download_excel(
    State(state): State<AppState>,
    payload: Result<Json<DiagnosisResult>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(result) = payload?;
    let renderer = state.renderer;
    let file_name = report::spreadsheet_file_name(&result);
    let bytes = tokio::task::spawn_blocking(move || renderer.spreadsheet(&result)).await??;
    info!(file = %file_name, bytes = bytes.len(), "spreadsheet report rendered");
    Ok(attachment(bytes, report::XLSX_CONTENT_TYPE, &file_name))
}

async fn handle_download_pdf(
    State(state): State<AppState>,
    payload: Result<Json<DiagnosisResult>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(result) = payload?;
    let renderer = state.renderer;
    let file_name = report::pdf_file_name(&result);
    let bytes = tokio::task::spawn_blocking(move || renderer.pdf(&result)).await??;
    info!(file = %file_name, bytes = bytes.len(), "pdf report rendered");
    Ok(attachment(bytes, report::PDF_CONTENT_TYPE, &file_name))
}

fn attachment(bytes: Vec<u8>, content_type: &'static str, file_name: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}
