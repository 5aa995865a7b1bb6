//! Test fixtures for building generation forms.

use axum_test::multipart::{MultipartForm, Part};

pub const SOURCE_TEXT: &str = "Water boils at 100 degrees Celsius at sea level.\n\
The chemical formula of water is H2O.\n";

/// A well-formed English reply with two items.
pub const ENGLISH_REPLY: &str = "Question1: At what temperature does water boil at sea level?\n\
Answer1: 100 degrees Celsius\n\n\
Question2: What is the chemical formula of water?\n\
Answer2: H2O";

/// A text file part named `name`.
pub fn text_file(name: &str, content: &str) -> Part {
    Part::bytes(content.as_bytes().to_vec())
        .file_name(name)
        .mime_type("text/plain")
}

/// A complete form for `lang` with one source file.
pub fn generate_form(lang: &str, question_types: &str, count: &str) -> MultipartForm {
    MultipartForm::new()
        .add_part("files", text_file("notes.txt", SOURCE_TEXT))
        .add_text("question_types", question_types)
        .add_text("num_questions", count)
        .add_text("lang", lang)
}
