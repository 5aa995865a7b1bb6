//! Paired marker extraction.
//!
//! Every `Marker<N>:` token in the reply opens a segment that runs up to
//! the next token of either kind, or the end of the reply. Segments are
//! collected into number-keyed question and answer maps, and the union of
//! both key sets becomes the output, ascending by numeric value. A number
//! seen on only one side gets a localized placeholder on the other.
//! Numbers are keyed by value, so `Question01:` pairs with `Answer1:`.

use std::collections::{BTreeSet, HashMap};

use super::{compare_numbers, normalize_number, patterns};
use crate::types::{Language, QaItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Question,
    Answer,
}

struct Token<'a> {
    side: Side,
    number: &'a str,
    start: usize,
    end: usize,
}

/// Extract aligned items; empty when the reply contains no tokens.
pub fn extract(raw: &str, language: Language) -> Vec<QaItem> {
    let tokens = tokenize(raw, language);
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut questions: HashMap<String, &str> = HashMap::new();
    let mut answers: HashMap<String, &str> = HashMap::new();

    for (idx, token) in tokens.iter().enumerate() {
        let text_end = tokens.get(idx + 1).map_or(raw.len(), |next| next.start);
        let text = raw[token.end..text_end].trim();
        let map = match token.side {
            Side::Question => &mut questions,
            Side::Answer => &mut answers,
        };
        // Repeated numbers: the later segment replaces the earlier one.
        map.insert(normalize_number(token.number), text);
    }

    let numbers: BTreeSet<&str> = questions
        .keys()
        .chain(answers.keys())
        .map(String::as_str)
        .collect();
    let mut numbers: Vec<&str> = numbers.into_iter().collect();
    numbers.sort_by(|a, b| compare_numbers(a, b));

    numbers
        .into_iter()
        .map(|number| {
            let question = non_empty(questions.get(number))
                .unwrap_or_else(|| language.missing_question(number));
            let answer = non_empty(answers.get(number))
                .unwrap_or_else(|| language.missing_answer(number));
            QaItem::new(number, question, answer)
        })
        .collect()
}

fn non_empty(text: Option<&&str>) -> Option<String> {
    text.filter(|t| !t.is_empty()).map(|t| t.to_string())
}

fn tokenize<'a>(raw: &'a str, language: Language) -> Vec<Token<'a>> {
    patterns(language)
        .token
        .captures_iter(raw)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let number = caps.name("num")?.as_str();
            let side = if caps.name("q").is_some() {
                Side::Question
            } else {
                Side::Answer
            };
            Some(Token {
                side,
                number,
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}
