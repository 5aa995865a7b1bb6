//! Legacy one-line convention: `question text【答案】answer text`.
//!
//! Order is purely positional; there are no numbers. A line without an
//! inline marker is a question with an empty answer. A line that starts
//! with the marker completes the previous question if it has no answer yet.

use crate::types::{InlinePairs, Language};

pub fn extract(raw: &str, language: Language) -> InlinePairs {
    let markers = language.markers().inline_answer;
    let mut pairs = InlinePairs::default();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((idx, marker)) = find_marker(line, markers) else {
            pairs.questions.push(line.to_string());
            pairs.answers.push(String::new());
            continue;
        };

        let question = line[..idx].trim();
        let answer = clean_answer(&line[idx + marker.len()..], marker);

        if question.is_empty() {
            if let Some(last) = pairs.answers.last_mut().filter(|a| a.is_empty()) {
                *last = answer;
            }
            continue;
        }

        pairs.questions.push(question.to_string());
        pairs.answers.push(answer);
    }

    pairs
}

/// Earliest marker occurrence in `line`.
fn find_marker<'m>(line: &str, markers: &[&'m str]) -> Option<(usize, &'m str)> {
    markers
        .iter()
        .filter_map(|m| line.find(m).map(|idx| (idx, *m)))
        .min_by_key(|(idx, _)| *idx)
}

fn clean_answer(rest: &str, marker: &str) -> String {
    let rest = rest.trim();
    // `[Answer: x]` opens a bracket the answer has to close.
    let rest = if marker.starts_with('[') && !marker.ends_with(']') {
        rest.strip_suffix(']').unwrap_or(rest).trim_end()
    } else {
        rest
    };
    rest.to_string()
}
