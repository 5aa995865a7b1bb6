//! Core types for quiz generation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// Kind of exam question the model is asked to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    ShortAnswer,
    Essay,
}

impl QuestionType {
    pub const ALL: [Self; 4] = [
        Self::SingleChoice,
        Self::MultipleChoice,
        Self::ShortAnswer,
        Self::Essay,
    ];

    /// Canonical form label.
    pub fn label(self) -> &'static str {
        match self {
            Self::SingleChoice => "單選選擇題",
            Self::MultipleChoice => "多選選擇題",
            Self::ShortAnswer => "問答題",
            Self::Essay => "申論題",
        }
    }

    /// Stable machine id.
    pub fn id(self) -> &'static str {
        match self {
            Self::SingleChoice => "single_choice",
            Self::MultipleChoice => "multiple_choice",
            Self::ShortAnswer => "short_answer",
            Self::Essay => "essay",
        }
    }

    /// Phrase injected into the prompt for this type in `language`.
    pub fn localized(self, language: Language) -> &'static str {
        use Language::*;
        match (self, language) {
            (Self::SingleChoice, TraditionalChinese) => "單選選擇題（每題四個選項）",
            (Self::SingleChoice, SimplifiedChinese) => "单选选择题（每题四个选项）",
            (Self::SingleChoice, English) => "single choice question (4 options)",
            (Self::SingleChoice, Japanese) => "四択問題",
            (Self::MultipleChoice, TraditionalChinese) => "多選選擇題（每題四到五個選項）",
            (Self::MultipleChoice, SimplifiedChinese) => "多选选择题（每题四到五个选项）",
            (Self::MultipleChoice, English) => "multiple choice question (4-5 options)",
            (Self::MultipleChoice, Japanese) => "複数選択問題",
            (Self::ShortAnswer, TraditionalChinese) => "簡答題",
            (Self::ShortAnswer, SimplifiedChinese) => "简答题",
            (Self::ShortAnswer, English) => "short answer",
            (Self::ShortAnswer, Japanese) => "短答式問題",
            (Self::Essay, TraditionalChinese) => "申論題",
            (Self::Essay, SimplifiedChinese) => "申论题",
            (Self::Essay, English) => "essay question",
            (Self::Essay, Japanese) => "記述式問題",
        }
    }

    /// Comma-separated list of canonical labels, for error messages.
    pub fn valid_labels() -> String {
        Self::ALL
            .iter()
            .map(|t| t.label())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn from_alias(value: &str) -> Option<Self> {
        let lowered = value.to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| {
            let aliases: &[&str] = match t {
                Self::SingleChoice => &["單選選擇題", "单选选择题", "single choice"],
                Self::MultipleChoice => &["多選選擇題", "多选选择题", "multiple choice"],
                Self::ShortAnswer => &["問答題", "问答题", "short answer"],
                Self::Essay => &["申論題", "申论题", "essay"],
            };
            lowered == t.id() || aliases.contains(&lowered.as_str())
        })
    }
}

impl FromStr for QuestionType {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::from_alias(trimmed).ok_or_else(|| QuizError::InvalidQuestionType {
            value: trimmed.to_string(),
            valid: Self::valid_labels(),
        })
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Output language of the generated quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "zh-Hant")]
    TraditionalChinese,
    #[serde(rename = "zh-Hans")]
    SimplifiedChinese,
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ja")]
    Japanese,
}

/// Localized marker vocabulary a language uses in model replies.
///
/// The first entry of each list is the spelling used when rendering.
#[derive(Debug)]
pub struct Markers {
    pub question: &'static [&'static str],
    pub answer: &'static [&'static str],
    pub separator: &'static str,
    pub inline_answer: &'static [&'static str],
}

static TRADITIONAL_MARKERS: Markers = Markers {
    question: &["題目"],
    answer: &["答案"],
    separator: "：",
    inline_answer: &["【答案】"],
};

// Models answering in Simplified Chinese drift between both scripts.
static SIMPLIFIED_MARKERS: Markers = Markers {
    question: &["题目", "題目"],
    answer: &["答案"],
    separator: "：",
    inline_answer: &["【答案】"],
};

static ENGLISH_MARKERS: Markers = Markers {
    question: &["Question"],
    answer: &["Answer"],
    separator: ": ",
    inline_answer: &["[Answer:", "[Answer]"],
};

static JAPANESE_MARKERS: Markers = Markers {
    question: &["問題"],
    answer: &["回答"],
    separator: "：",
    inline_answer: &["【答え】"],
};

impl Language {
    pub const ALL: [Self; 4] = [
        Self::TraditionalChinese,
        Self::SimplifiedChinese,
        Self::English,
        Self::Japanese,
    ];

    /// Display label offered to users.
    pub fn label(self) -> &'static str {
        match self {
            Self::TraditionalChinese => "繁體中文",
            Self::SimplifiedChinese => "簡體中文",
            Self::English => "English",
            Self::Japanese => "日本語",
        }
    }

    /// Short language code.
    pub fn code(self) -> &'static str {
        match self {
            Self::TraditionalChinese => "zh-Hant",
            Self::SimplifiedChinese => "zh-Hans",
            Self::English => "en",
            Self::Japanese => "ja",
        }
    }

    pub fn markers(self) -> &'static Markers {
        match self {
            Self::TraditionalChinese => &TRADITIONAL_MARKERS,
            Self::SimplifiedChinese => &SIMPLIFIED_MARKERS,
            Self::English => &ENGLISH_MARKERS,
            Self::Japanese => &JAPANESE_MARKERS,
        }
    }

    /// Separator used to join localized question types.
    pub fn list_separator(self) -> &'static str {
        match self {
            Self::English => ", ",
            _ => "、",
        }
    }

    /// Placeholder for a question number that only has an answer.
    pub fn missing_question(self, number: &str) -> String {
        match self {
            Self::TraditionalChinese => format!("題目 {} 缺失", number),
            Self::SimplifiedChinese => format!("题目 {} 缺失", number),
            Self::English => format!("Question {} missing", number),
            Self::Japanese => format!("問題 {} 欠落", number),
        }
    }

    /// Placeholder for a question number that has no answer.
    pub fn missing_answer(self, number: &str) -> String {
        match self {
            Self::TraditionalChinese | Self::SimplifiedChinese => format!("答案 {} 缺失", number),
            Self::English => format!("Answer {} missing", number),
            Self::Japanese => format!("回答 {} 欠落", number),
        }
    }

    pub fn valid_labels() -> String {
        Self::ALL
            .iter()
            .map(|l| l.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Language {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lowered = trimmed.to_ascii_lowercase();
        let found = match lowered.as_str() {
            "繁體中文" | "繁体中文" | "zh-hant" | "zh-tw" => Some(Self::TraditionalChinese),
            "簡體中文" | "简体中文" | "zh-hans" | "zh-cn" => Some(Self::SimplifiedChinese),
            "english" | "en" => Some(Self::English),
            "日本語" | "日本语" | "ja" | "japanese" => Some(Self::Japanese),
            _ => None,
        };
        found.ok_or_else(|| QuizError::InvalidLanguage {
            value: trimmed.to_string(),
            valid: Self::valid_labels(),
        })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reply convention the model is asked for and parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// `Question1: ...` / `Answer1: ...` lines.
    #[default]
    Numbered,
    /// One line per item, question and answer split by an inline marker.
    Inline,
}

impl FromStr for ResponseFormat {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "numbered" => Ok(Self::Numbered),
            "inline" => Ok(Self::Inline),
            other => Err(QuizError::InvalidResponseFormat(other.to_string())),
        }
    }
}

/// One reconciled question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaItem {
    pub number: String,
    pub question: String,
    pub answer: String,
}

impl QaItem {
    pub fn new(
        number: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Parallel question/answer lists produced by the inline strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlinePairs {
    pub questions: Vec<String>,
    pub answers: Vec<String>,
}

impl InlinePairs {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Number items by position, starting at 1.
    ///
    /// A blank side gets the language's missing-item placeholder, as in the
    /// numbered strategies.
    pub fn into_items(self, language: Language) -> Vec<QaItem> {
        self.questions
            .into_iter()
            .zip(self.answers)
            .enumerate()
            .map(|(idx, (question, answer))| {
                let number = (idx + 1).to_string();
                let question = if question.trim().is_empty() {
                    language.missing_question(&number)
                } else {
                    question
                };
                let answer = if answer.trim().is_empty() {
                    language.missing_answer(&number)
                } else {
                    answer
                };
                QaItem::new(number, question, answer)
            })
            .collect()
    }
}
