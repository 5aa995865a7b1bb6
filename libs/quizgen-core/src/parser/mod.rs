//! Parser for model replies.
//!
//! # Format
//! ```text
//! Question1: What is 2+2?
//! Answer1: 4
//!
//! Question2: Capital of France?
//! Answer2: Paris
//! ```
//!
//! Numbered replies go through two strategies in order. [`paired`] scans
//! the whole reply for markers and lets item text span lines; [`line_scan`]
//! runs only when the first finds nothing and reads one line at a time.
//! Replies in the older one-line convention are handled by [`inline`].

pub mod inline;
pub mod line_scan;
pub mod paired;

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{QuizError, Result};
use crate::types::{InlinePairs, Language, QaItem, ResponseFormat};

/// Which strategy produced a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Paired,
    LineScan,
}

/// Items plus the strategy that found them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub items: Vec<QaItem>,
    pub tier: Tier,
}

/// Parse a numbered reply into aligned question/answer items.
pub fn parse(raw: &str, language: Language) -> Result<Vec<QaItem>> {
    parse_detailed(raw, language).map(|parsed| parsed.items)
}

/// Like [`parse`], also reporting which tier succeeded.
pub fn parse_detailed(raw: &str, language: Language) -> Result<Parsed> {
    let items = paired::extract(raw, language);
    if !items.is_empty() {
        return Ok(Parsed {
            items,
            tier: Tier::Paired,
        });
    }

    let items = line_scan::extract(raw, language);
    if !items.is_empty() {
        return Ok(Parsed {
            items,
            tier: Tier::LineScan,
        });
    }

    Err(QuizError::UnparseableResponse)
}

/// Parse a reply in the legacy one-line convention.
pub fn parse_inline(raw: &str, language: Language) -> Result<InlinePairs> {
    let pairs = inline::extract(raw, language);
    if pairs.is_empty() {
        return Err(QuizError::UnparseableResponse);
    }
    Ok(pairs)
}

/// Parse with the strategy matching `format`.
///
/// Inline pairs carry no numbers, so they are numbered by position.
pub fn parse_response(raw: &str, language: Language, format: ResponseFormat) -> Result<Vec<QaItem>> {
    match format {
        ResponseFormat::Numbered => parse(raw, language),
        ResponseFormat::Inline => {
            parse_inline(raw, language).map(|pairs| pairs.into_items(language))
        }
    }
}

/// Canonical spelling of an item number.
///
/// Full-width digits become ASCII and leading zeros are dropped, so
/// `Question01:`, `Question1:` and `題目１：` all name item `1`. Digits of
/// other scripts are kept as written.
pub fn normalize_number(number: &str) -> String {
    let folded: String = number.chars().map(fold_digit).collect();
    let trimmed = folded.trim_start_matches('0');
    if trimmed.is_empty() && !folded.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn fold_digit(c: char) -> char {
    match c {
        '０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
        _ => c,
    }
}

/// Compare digit strings by numeric value.
///
/// Both sides are normalized first and arbitrarily long numbers are
/// supported; equal values fall back to a lexical comparison so the order
/// is total.
pub fn compare_numbers(a: &str, b: &str) -> Ordering {
    let ta = normalize_number(a);
    let tb = normalize_number(b);
    ta.chars()
        .count()
        .cmp(&tb.chars().count())
        .then_with(|| ta.cmp(&tb))
        .then_with(|| a.cmp(b))
}

/// Compiled marker patterns for one language.
pub(crate) struct Patterns {
    /// Strict `Marker<N>:` token anywhere in the reply.
    pub token: Regex,
    /// Question line, whitespace tolerant, anchored to the line start.
    pub line_question: Regex,
    /// Answer line, whitespace tolerant, anchored to the line start.
    pub line_answer: Regex,
}

impl Patterns {
    fn new(language: Language) -> Self {
        let markers = language.markers();
        let question = alternation(markers.question);
        let answer = alternation(markers.answer);

        let token = format!(r"(?:(?P<q>{question})|(?P<a>{answer}))(?P<num>\d+)[:：]");
        let line_question = format!(r"^(?:{question})\s*(\d+)\s*[:：]\s*(.*)$");
        let line_answer = format!(r"^(?:{answer})\s*(\d+)\s*[:：]\s*(.*)$");

        // Patterns are built from escaped static marker tables.
        Self {
            token: Regex::new(&token).expect("valid token pattern"),
            line_question: Regex::new(&line_question).expect("valid question pattern"),
            line_answer: Regex::new(&line_answer).expect("valid answer pattern"),
        }
    }
}

fn alternation(words: &[&str]) -> String {
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
}

static TRADITIONAL: LazyLock<Patterns> = LazyLock::new(|| Patterns::new(Language::TraditionalChinese));
static SIMPLIFIED: LazyLock<Patterns> = LazyLock::new(|| Patterns::new(Language::SimplifiedChinese));
static ENGLISH: LazyLock<Patterns> = LazyLock::new(|| Patterns::new(Language::English));
static JAPANESE: LazyLock<Patterns> = LazyLock::new(|| Patterns::new(Language::Japanese));

pub(crate) fn patterns(language: Language) -> &'static Patterns {
    match language {
        Language::TraditionalChinese => &TRADITIONAL,
        Language::SimplifiedChinese => &SIMPLIFIED,
        Language::English => &ENGLISH,
        Language::Japanese => &JAPANESE,
    }
}
