//! Export endpoint

use axum::{extract::State, Json};
use quizgen_core::split_rendered;

use crate::error::{ApiError, Result};
use crate::models::{ExportRequest, ExportResponse};
use crate::services::export::write_exports;
use crate::AppState;

/// POST /api/export
/// Writes Markdown and TSV files and returns their paths
pub async fn export(
    State(state): State<AppState>,
    Json(payload): Json<ExportRequest>,
) -> Result<Json<ExportResponse>> {
    let (questions, answers) = match payload {
        ExportRequest {
            questions_text: Some(questions),
            answers_text: Some(answers),
            ..
        } => (questions, answers),
        ExportRequest {
            raw_text: Some(raw),
            ..
        } => split_rendered(&raw),
        _ => {
            return Err(ApiError::BadRequest(
                "provide questions_text and answers_text, or raw_text".to_string(),
            ))
        }
    };

    if questions.trim().is_empty() && answers.trim().is_empty() {
        return Err(ApiError::BadRequest("nothing to export".to_string()));
    }

    let export_dir = state.config.export_dir.clone();
    let paths = tokio::task::spawn_blocking(move || write_exports(&export_dir, &questions, &answers))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(ExportResponse {
        markdown_path: paths.markdown.display().to_string(),
        tsv_path: paths.tsv.display().to_string(),
    }))
}
