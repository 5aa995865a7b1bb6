//! Form options endpoint

use axum::{extract::State, Json};

use crate::models::OptionsResponse;
use crate::AppState;

/// GET /api/options
/// Languages and question types the form can offer
pub async fn list(State(state): State<AppState>) -> Json<OptionsResponse> {
    Json(OptionsResponse::new(
        state.config.response_format,
        state.config.max_upload_bytes,
    ))
}
