//! Temporary staging of uploaded files.
//!
//! Each upload is written to its own temp file that keeps the original
//! extension, so extraction can dispatch on it. The temp file is deleted
//! when its [`StagedFile`] is dropped.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// An upload written to disk for the duration of one request.
#[derive(Debug)]
pub struct StagedFile {
    original_name: String,
    extension: String,
    file: NamedTempFile,
}

impl StagedFile {
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Lowercase extension without the dot; empty when the name has none.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn path_buf(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }
}

/// Lowercase extension of a file name.
pub fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Write every upload to a temp file.
///
/// On error, files staged so far are removed before returning.
pub fn stage(uploads: Vec<Upload>) -> io::Result<Vec<StagedFile>> {
    let mut staged = Vec::with_capacity(uploads.len());

    for upload in uploads {
        let extension = extension_of(&upload.file_name);
        let suffix = if extension.is_empty() {
            String::new()
        } else {
            format!(".{}", extension)
        };

        let mut file = tempfile::Builder::new()
            .prefix("quizgen-")
            .suffix(&suffix)
            .tempfile()?;
        file.write_all(&upload.bytes)?;
        file.flush()?;

        tracing::debug!(
            file_name = %upload.file_name,
            path = %file.path().display(),
            size = upload.bytes.len(),
            "staged upload"
        );

        staged.push(StagedFile {
            original_name: upload.file_name,
            extension,
            file,
        });
    }

    Ok(staged)
}
