//! Plain-text rendering and export formats.
//!
//! A rendering lists every question block, then every answer block, each
//! block written as `Marker<N>：text` and separated by a blank line.

use crate::types::{Language, QaItem};

const BLOCK_SEPARATOR: &str = "\n\n";

pub fn questions_text(items: &[QaItem], language: Language) -> String {
    let markers = language.markers();
    render_blocks(items, markers.question[0], markers.separator, |item| &item.question)
}

pub fn answers_text(items: &[QaItem], language: Language) -> String {
    let markers = language.markers();
    render_blocks(items, markers.answer[0], markers.separator, |item| &item.answer)
}

/// Question blocks, a blank line, then answer blocks.
pub fn render_plain_text(items: &[QaItem], language: Language) -> String {
    format!(
        "{}{}{}",
        questions_text(items, language),
        BLOCK_SEPARATOR,
        answers_text(items, language)
    )
}

fn render_blocks<F>(items: &[QaItem], marker: &str, separator: &str, text: F) -> String
where
    F: Fn(&QaItem) -> &str,
{
    items
        .iter()
        .map(|item| format!("{}{}{}{}", marker, item.number, separator, text(item)))
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

/// Split a rendering back into its question part and answer part.
///
/// Blocks are classified by the marker they start with, in any supported
/// language. Blocks starting with neither are dropped.
pub fn split_rendered(raw_text: &str) -> (String, String) {
    let mut questions = Vec::new();
    let mut answers = Vec::new();

    for block in raw_text.split(BLOCK_SEPARATOR) {
        let block = block.trim();
        if starts_with_any(block, |l| l.markers().question) {
            questions.push(block);
        } else if starts_with_any(block, |l| l.markers().answer) {
            answers.push(block);
        }
    }

    (questions.join(BLOCK_SEPARATOR), answers.join(BLOCK_SEPARATOR))
}

fn starts_with_any(block: &str, words: fn(Language) -> &'static [&'static str]) -> bool {
    Language::ALL
        .into_iter()
        .flat_map(words)
        .any(|word| block.starts_with(word))
}

/// Markdown document with a questions section and an answers section.
pub fn to_markdown(questions_text: &str, answers_text: &str) -> String {
    format!(
        "# 題目 Questions\n\n{}\n\n# 解答 Answers\n\n{}",
        questions_text, answers_text
    )
}

/// Tab-separated flashcards, pairing the Nth question block with the Nth
/// answer block. Line breaks inside a block become spaces; tabs are not
/// escaped.
pub fn to_tsv(questions_text: &str, answers_text: &str) -> String {
    questions_text
        .split(BLOCK_SEPARATOR)
        .zip(answers_text.split(BLOCK_SEPARATOR))
        .map(|(q, a)| format!("{}\t{}\n", flatten(q), flatten(a)))
        .collect()
}

fn flatten(block: &str) -> String {
    block.replace(['\n', '\r'], " ")
}
