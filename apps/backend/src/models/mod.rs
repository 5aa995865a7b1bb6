//! API request and response types

use quizgen_core::{Language, QaItem, QuestionType, ResponseFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::services::generation::Generated;

// === Generation ===

/// One numbered question or answer, as shown in the result lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NumberedText {
    pub number: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub request_id: Uuid,
    pub language: Language,
    pub questions: Vec<NumberedText>,
    pub answers: Vec<NumberedText>,
    pub items: Vec<QaItem>,
    /// Question blocks, a blank line, then answer blocks.
    pub raw_text: String,
    pub questions_text: String,
    pub answers_text: String,
}

impl From<Generated> for GenerateResponse {
    fn from(generated: Generated) -> Self {
        let questions = generated
            .items
            .iter()
            .map(|item| NumberedText {
                number: item.number.clone(),
                content: item.question.clone(),
            })
            .collect();
        let answers = generated
            .items
            .iter()
            .map(|item| NumberedText {
                number: item.number.clone(),
                content: item.answer.clone(),
            })
            .collect();

        Self {
            request_id: generated.request_id,
            language: generated.language,
            raw_text: format!("{}\n\n{}", generated.questions_text, generated.answers_text),
            questions,
            answers,
            items: generated.items,
            questions_text: generated.questions_text,
            answers_text: generated.answers_text,
        }
    }
}

// === Export ===

/// Either the two rendered parts, or one combined rendering to split.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportRequest {
    pub questions_text: Option<String>,
    pub answers_text: Option<String>,
    pub raw_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    pub markdown_path: String,
    pub tsv_path: String,
}

// === Options ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageOption {
    pub code: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionTypeOption {
    pub id: String,
    pub label: String,
    /// Display name per language code.
    pub localized: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsResponse {
    pub languages: Vec<LanguageOption>,
    pub question_types: Vec<QuestionTypeOption>,
    pub response_format: ResponseFormat,
    pub max_upload_bytes: usize,
}

impl OptionsResponse {
    pub fn new(response_format: ResponseFormat, max_upload_bytes: usize) -> Self {
        let languages = Language::ALL
            .into_iter()
            .map(|language| LanguageOption {
                code: language.code().to_string(),
                label: language.label().to_string(),
            })
            .collect();

        let question_types = QuestionType::ALL
            .into_iter()
            .map(|question_type| QuestionTypeOption {
                id: question_type.id().to_string(),
                label: question_type.label().to_string(),
                localized: Language::ALL
                    .into_iter()
                    .map(|language| {
                        (
                            language.code().to_string(),
                            question_type.localized(language).to_string(),
                        )
                    })
                    .collect(),
            })
            .collect();

        Self {
            languages,
            question_types,
            response_format,
            max_upload_bytes,
        }
    }
}
