//! Error types for quizgen-core.

use thiserror::Error;

/// Result type alias using QuizError.
pub type Result<T> = std::result::Result<T, QuizError>;

/// Errors raised while validating a request, building a prompt or parsing
/// a model reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("invalid language: {value} (valid: {valid})")]
    InvalidLanguage { value: String, valid: String },

    #[error("invalid question type: {value} (valid: {valid})")]
    InvalidQuestionType { value: String, valid: String },

    #[error("no question types selected")]
    NoQuestionTypes,

    #[error("question count must be at least 1, got {0}")]
    InvalidCount(u32),

    #[error("invalid response format: {0} (valid: numbered, inline)")]
    InvalidResponseFormat(String),

    #[error("unable to parse model response")]
    UnparseableResponse,
}

impl QuizError {
    /// True for errors caused by the caller's input rather than the model.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::UnparseableResponse)
    }
}
