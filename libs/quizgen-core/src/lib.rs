//! Core quiz-generation library used by the backend.
//!
//! Provides:
//! - Question-type and language tables
//! - Prompt builder for the completion provider
//! - Reply parser (paired markers, line-scan fallback, legacy inline form)
//! - Plain-text rendering and Markdown/TSV export formatting

pub mod error;
pub mod export;
pub mod parser;
pub mod prompt;
pub mod types;

pub use error::{QuizError, Result};
pub use export::{
    answers_text, questions_text, render_plain_text, split_rendered, to_markdown, to_tsv,
};
pub use parser::{
    normalize_number, parse, parse_detailed, parse_inline, parse_response, Parsed, Tier,
};
pub use prompt::{
    build_prompt, normalize_question_types, parse_question_types, PromptBuilder, MAX_SOURCE_CHARS,
};
pub use types::{InlinePairs, Language, QaItem, QuestionType, ResponseFormat};
