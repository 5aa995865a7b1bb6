//! End-to-end question generation for one request.
//!
//! Validation runs before any file is staged or any provider is contacted.
//! Staged files are released as soon as extraction finishes, and on every
//! error path.

use quizgen_core::{
    answers_text, normalize_question_types, parse_detailed, parse_inline, questions_text,
    Language, PromptBuilder, QaItem, ResponseFormat,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::CredentialOverrides;
use crate::error::{ApiError, Result};
use crate::services::staging::{stage, Upload};
use crate::AppState;

/// Validated-later input for one generation.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub uploads: Vec<Upload>,
    /// Raw selections; each entry may itself be a delimited list.
    pub question_types: Vec<String>,
    pub num_questions: u32,
    pub language: String,
    pub overrides: CredentialOverrides,
}

#[derive(Debug, Clone)]
pub struct Generated {
    pub request_id: Uuid,
    pub language: Language,
    pub items: Vec<QaItem>,
    pub questions_text: String,
    pub answers_text: String,
    pub raw_text: String,
}

pub async fn generate(state: &AppState, request: GenerateRequest) -> Result<Generated> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("generate", %request_id);
    run(state, request, request_id).instrument(span).await
}

async fn run(state: &AppState, request: GenerateRequest, request_id: Uuid) -> Result<Generated> {
    let language: Language = request.language.parse()?;
    let types = normalize_question_types(&request.question_types)?;
    let format = state.config.response_format;
    let builder = PromptBuilder::new(language, types, request.num_questions)
        .max_source_chars(state.config.max_source_chars)
        .format(format);
    builder.validate()?;

    if request.uploads.is_empty() {
        return Err(ApiError::InvalidInput(
            "at least one file must be uploaded".to_string(),
        ));
    }

    let credentials = state.config.resolve_credentials(&request.overrides)?;
    let provider = state.providers.provider(&credentials);

    tracing::info!(
        language = language.code(),
        count = request.num_questions,
        files = request.uploads.len(),
        model = %credentials.model,
        "starting generation"
    );

    let uploads = request.uploads;
    let staged = tokio::task::spawn_blocking(move || stage(uploads))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    let source = state.extractor.extract(&staged, provider.as_ref()).await;
    drop(staged);
    let source = source?;

    let prompt = builder.build(&source)?;
    tracing::info!(
        source_chars = source.chars().count(),
        prompt_chars = prompt.chars().count(),
        "prompt built"
    );

    let raw_text = provider.complete(&prompt).await?;
    tracing::debug!(reply_chars = raw_text.chars().count(), "completion received");

    let items = match format {
        ResponseFormat::Numbered => {
            let parsed = parse_detailed(&raw_text, language)?;
            tracing::info!(tier = ?parsed.tier, items = parsed.items.len(), "parsed reply");
            parsed.items
        }
        ResponseFormat::Inline => {
            let pairs = parse_inline(&raw_text, language)?;
            tracing::info!(items = pairs.len(), "parsed inline reply");
            pairs.into_items(language)
        }
    };

    if items.len() != request.num_questions as usize {
        tracing::warn!(
            requested = request.num_questions,
            returned = items.len(),
            "model returned a different number of questions"
        );
    }

    Ok(Generated {
        request_id,
        language,
        questions_text: questions_text(&items, language),
        answers_text: answers_text(&items, language),
        items,
        raw_text,
    })
}
