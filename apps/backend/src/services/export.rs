//! Writes Markdown and TSV exports to the export directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use quizgen_core::{to_markdown, to_tsv};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub markdown: PathBuf,
    pub tsv: PathBuf,
}

/// Write both export files and keep them on disk.
///
/// File names are `quiz-<timestamp>-<random>.md` and `.tsv`, so repeated
/// exports never overwrite each other.
pub fn write_exports(dir: &Path, questions_text: &str, answers_text: &str) -> io::Result<ExportPaths> {
    fs::create_dir_all(dir)?;
    let prefix = format!("quiz-{}-", Utc::now().format("%Y%m%d-%H%M%S"));

    let markdown = persist(dir, &prefix, ".md", &to_markdown(questions_text, answers_text))?;
    let tsv = persist(dir, &prefix, ".tsv", &to_tsv(questions_text, answers_text))?;

    tracing::info!(
        markdown = %markdown.display(),
        tsv = %tsv.display(),
        "exports written"
    );

    Ok(ExportPaths { markdown, tsv })
}

fn persist(dir: &Path, prefix: &str, suffix: &str, content: &str) -> io::Result<PathBuf> {
    let mut file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(suffix)
        .tempfile_in(dir)?;
    file.write_all(content.as_bytes())?;
    file.flush()?;

    let (_, path) = file.keep().map_err(|e| e.error)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_markdown_and_tsv() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_exports(dir.path(), "Question1: A?", "Answer1: B").unwrap();

        assert!(paths.markdown.starts_with(dir.path()));
        assert!(paths.markdown.to_string_lossy().ends_with(".md"));
        assert!(paths.tsv.to_string_lossy().ends_with(".tsv"));

        let markdown = fs::read_to_string(&paths.markdown).unwrap();
        assert_eq!(
            markdown,
            "# 題目 Questions\n\nQuestion1: A?\n\n# 解答 Answers\n\nAnswer1: B"
        );
        let tsv = fs::read_to_string(&paths.tsv).unwrap();
        assert_eq!(tsv, "Question1: A?\tAnswer1: B\n");
    }

    #[test]
    fn repeated_exports_get_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_exports(dir.path(), "Q", "A").unwrap();
        let second = write_exports(dir.path(), "Q", "A").unwrap();
        assert_ne!(first.markdown, second.markdown);
        assert_ne!(first.tsv, second.tsv);
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("exports").join("today");
        let paths = write_exports(&nested, "Q", "A").unwrap();
        assert!(paths.markdown.exists());
    }
}
