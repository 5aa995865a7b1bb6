//! Question generation endpoint

use axum::{
    extract::{multipart::Field, Multipart, State},
    Json,
};

use crate::config::CredentialOverrides;
use crate::error::{ApiError, Result};
use crate::models::GenerateResponse;
use crate::services::generation::{self, GenerateRequest};
use crate::services::staging::Upload;
use crate::AppState;

/// POST /api/generate
///
/// Multipart form fields:
/// - `files`: one or more uploads
/// - `question_types`: repeated, or one comma-separated value
/// - `num_questions`: positive integer
/// - `lang`: output language label or code
/// - `llm_key`, `baseurl`, `model`: optional credential overrides
pub async fn generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<GenerateResponse>> {
    let request = read_form(multipart).await?;
    let generated = generation::generate(&state, request).await?;

    tracing::info!(
        request_id = %generated.request_id,
        items = generated.items.len(),
        "generation complete"
    );

    Ok(Json(generated.into()))
}

async fn read_form(mut multipart: Multipart) -> Result<GenerateRequest> {
    let mut request = GenerateRequest::default();
    let mut num_questions = None;
    let mut language = None;
    let mut overrides = CredentialOverrides::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "files" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                // Browsers send an empty part when no file was chosen.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                request.uploads.push(Upload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            "question_types" => request.question_types.push(text(field).await?),
            "num_questions" => num_questions = Some(text(field).await?),
            "lang" => language = Some(text(field).await?),
            "llm_key" => overrides.api_key = Some(text(field).await?),
            "baseurl" => overrides.base_url = Some(text(field).await?),
            "model" => overrides.model = Some(text(field).await?),
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    let num_questions =
        num_questions.ok_or_else(|| ApiError::BadRequest("missing field num_questions".into()))?;
    request.num_questions = num_questions.trim().parse().map_err(|_| {
        ApiError::InvalidInput(format!(
            "num_questions must be a positive integer, got {:?}",
            num_questions
        ))
    })?;
    request.language = language.ok_or_else(|| ApiError::BadRequest("missing field lang".into()))?;
    request.overrides = overrides;

    Ok(request)
}

async fn text(field: Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}
