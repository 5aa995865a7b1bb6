//! Line-by-line fallback.
//!
//! Strictly line oriented: a question line opens an item, an answer line
//! fills the open item's answer only when its number matches, and every
//! other line is ignored.

use super::{normalize_number, patterns};
use crate::types::{Language, QaItem};

/// Extract items one line at a time.
pub fn extract(raw: &str, language: Language) -> Vec<QaItem> {
    let mut scanner = Scanner::new(language);
    for line in raw.lines() {
        scanner.process_line(line);
    }
    scanner.finish()
}

struct ItemBuilder {
    number: String,
    question: String,
    answer: String,
}

impl ItemBuilder {
    fn build(self, language: Language) -> Option<QaItem> {
        if self.number.is_empty() || self.question.is_empty() {
            return None;
        }
        let answer = if self.answer.is_empty() {
            language.missing_answer(&self.number)
        } else {
            self.answer
        };
        Some(QaItem::new(self.number, self.question, answer))
    }
}

struct Scanner {
    language: Language,
    current: Option<ItemBuilder>,
    items: Vec<QaItem>,
}

impl Scanner {
    fn new(language: Language) -> Self {
        Self {
            language,
            current: None,
            items: Vec::new(),
        }
    }

    fn process_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        let patterns = patterns(self.language);

        if let Some(caps) = patterns.line_question.captures(line) {
            self.flush();
            self.current = Some(ItemBuilder {
                number: normalize_number(&caps[1]),
                question: caps[2].trim().to_string(),
                answer: String::new(),
            });
            return;
        }

        if let Some(caps) = patterns.line_answer.captures(line) {
            if let Some(ref mut item) = self.current {
                if item.number == normalize_number(&caps[1]) {
                    item.answer = caps[2].trim().to_string();
                }
            }
        }
    }

    fn flush(&mut self) {
        if let Some(item) = self.current.take().and_then(|b| b.build(self.language)) {
            self.items.push(item);
        }
    }

    fn finish(mut self) -> Vec<QaItem> {
        self.flush();
        self.items
    }
}
