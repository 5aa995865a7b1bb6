//! Source text extraction from staged uploads.
//!
//! Files are processed in upload order and their text is concatenated,
//! each followed by a newline. Images are transcribed by the vision-capable
//! completion provider.

use std::path::PathBuf;
use std::sync::LazyLock;

use async_trait::async_trait;
use epub::doc::EpubDoc;
use regex::Regex;
use thiserror::Error;

use crate::services::completion::{CompletionError, CompletionProvider};
use crate::services::staging::StagedFile;

/// Below this many non-whitespace characters a PDF is probably scanned.
const LOW_YIELD_CHARS: usize = 20;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported file type for {file_name} (.{extension})")]
    Unsupported { file_name: String, extension: String },

    #[error("failed to read {file_name}: {reason}")]
    Read { file_name: String, reason: String },

    #[error("failed to transcribe image {file_name}: {source}")]
    Vision {
        file_name: String,
        #[source]
        source: CompletionError,
    },

    #[error("no text could be extracted from the uploaded files")]
    Empty,
}

impl ExtractionError {
    fn read(file: &StagedFile, reason: impl ToString) -> Self {
        ExtractionError::Read {
            file_name: file.original_name().to_string(),
            reason: reason.to_string(),
        }
    }
}

/// How a file's text is obtained, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Markup,
    Rtf,
    Pdf,
    Epub,
    Image(&'static str),
}

impl DocumentKind {
    pub fn from_extension(extension: &str) -> Option<Self> {
        let kind = match extension {
            "txt" | "md" | "markdown" | "csv" | "tsv" | "json" | "log" => DocumentKind::PlainText,
            "rtf" => DocumentKind::Rtf,
            "html" | "htm" | "xhtml" | "xml" => DocumentKind::Markup,
            "pdf" => DocumentKind::Pdf,
            "epub" => DocumentKind::Epub,
            "png" => DocumentKind::Image("image/png"),
            "jpg" | "jpeg" => DocumentKind::Image("image/jpeg"),
            "gif" => DocumentKind::Image("image/gif"),
            "webp" => DocumentKind::Image("image/webp"),
            "bmp" => DocumentKind::Image("image/bmp"),
            "tif" | "tiff" => DocumentKind::Image("image/tiff"),
            _ => return None,
        };
        Some(kind)
    }
}

/// Turns staged files into one source text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(
        &self,
        files: &[StagedFile],
        vision: &dyn CompletionProvider,
    ) -> Result<String, ExtractionError>;
}

/// Extension-dispatching extractor for documents and images.
#[derive(Debug, Clone, Default)]
pub struct DocumentExtractor;

impl DocumentExtractor {
    pub fn new() -> Self {
        Self
    }

    async fn extract_one(
        &self,
        file: &StagedFile,
        vision: &dyn CompletionProvider,
    ) -> Result<String, ExtractionError> {
        let kind = DocumentKind::from_extension(file.extension()).ok_or_else(|| {
            ExtractionError::Unsupported {
                file_name: file.original_name().to_string(),
                extension: file.extension().to_string(),
            }
        })?;

        tracing::debug!(file_name = file.original_name(), ?kind, "extracting");

        match kind {
            DocumentKind::PlainText => {
                let bytes = tokio::fs::read(file.path())
                    .await
                    .map_err(|e| ExtractionError::read(file, e))?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            DocumentKind::Markup => {
                let bytes = tokio::fs::read(file.path())
                    .await
                    .map_err(|e| ExtractionError::read(file, e))?;
                Ok(strip_markup(&String::from_utf8_lossy(&bytes)))
            }
            DocumentKind::Rtf => {
                let bytes = tokio::fs::read(file.path())
                    .await
                    .map_err(|e| ExtractionError::read(file, e))?;
                Ok(strip_rtf(&String::from_utf8_lossy(&bytes)))
            }
            DocumentKind::Pdf => {
                let path = file.path_buf();
                let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path))
                    .await
                    .map_err(|e| ExtractionError::read(file, e))?
                    .map_err(|e| ExtractionError::read(file, e))?;

                let visible = text.chars().filter(|c| !c.is_whitespace()).count();
                if visible < LOW_YIELD_CHARS {
                    tracing::warn!(
                        file_name = file.original_name(),
                        visible,
                        "PDF has little extractable text; it may be scanned"
                    );
                }
                Ok(text)
            }
            DocumentKind::Epub => {
                let path = file.path_buf();
                tokio::task::spawn_blocking(move || read_epub(path))
                    .await
                    .map_err(|e| ExtractionError::read(file, e))?
                    .map_err(|e| ExtractionError::read(file, e))
            }
            DocumentKind::Image(mime) => {
                let bytes = tokio::fs::read(file.path())
                    .await
                    .map_err(|e| ExtractionError::read(file, e))?;
                vision
                    .describe_image(file.original_name(), mime, &bytes)
                    .await
                    .map_err(|source| ExtractionError::Vision {
                        file_name: file.original_name().to_string(),
                        source,
                    })
            }
        }
    }
}

#[async_trait]
impl TextExtractor for DocumentExtractor {
    async fn extract(
        &self,
        files: &[StagedFile],
        vision: &dyn CompletionProvider,
    ) -> Result<String, ExtractionError> {
        let mut merged = String::new();

        for file in files {
            let text = self.extract_one(file, vision).await?;
            tracing::info!(
                file_name = file.original_name(),
                chars = text.chars().count(),
                "extracted text"
            );
            merged.push_str(&text);
            merged.push('\n');
        }

        if merged.trim().is_empty() {
            return Err(ExtractionError::Empty);
        }
        Ok(merged)
    }
}

fn read_epub(path: PathBuf) -> Result<String, String> {
    let mut doc = EpubDoc::new(&path).map_err(|e| e.to_string())?;
    let mut text = String::new();

    for i in 0..doc.spine.len() {
        doc.set_current_page(i);
        if let Some((content, _mime)) = doc.get_current_str() {
            let chapter = strip_markup(&content);
            if !chapter.is_empty() {
                text.push_str(&chapter);
                text.push('\n');
            }
        }
    }

    Ok(text)
}

static HIDDEN_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<!--.*?-->")
        .expect("hidden block pattern is valid")
});

static BLOCK_TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*(?:br|/p|/div|/li|/h[1-6]|/tr)\b[^>]*>")
        .expect("block tag pattern is valid")
});

static TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Reduce HTML or XML to readable text, one line per block element.
pub fn strip_markup(markup: &str) -> String {
    let text = HIDDEN_BLOCKS.replace_all(markup, " ");
    let text = BLOCK_TAGS.replace_all(&text, "\n");
    let text = TAGS.replace_all(&text, " ");
    let text = decode_entities(&text);

    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

static RTF_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\\([a-zA-Z]+)(-?\d+)? ?|\\'([0-9a-fA-F]{2})|\\([^a-zA-Z'])|([{}])|([^\\{}\r\n]+)|\r?\n",
    )
    .expect("rtf token pattern is valid")
});

/// Reduce an RTF document to its visible text.
///
/// Font, color, style and info tables and `\*` destinations are skipped.
/// `\'hh` escapes are read as Latin-1 and `\uN` escapes as Unicode, with
/// the one-character fallback after `\uN` dropped.
pub fn strip_rtf(rtf: &str) -> String {
    let mut out = String::new();
    let mut saved: Vec<bool> = Vec::new();
    let mut skipping = false;
    let mut drop_fallback = false;

    for caps in RTF_TOKEN.captures_iter(rtf) {
        if let Some(brace) = caps.get(5) {
            if brace.as_str() == "{" {
                saved.push(skipping);
            } else {
                skipping = saved.pop().unwrap_or(false);
            }
            continue;
        }

        if let Some(word) = caps.get(1) {
            match word.as_str() {
                "fonttbl" | "colortbl" | "stylesheet" | "info" | "pict" | "header" | "footer" => {
                    skipping = true
                }
                _ if skipping => {}
                "par" | "line" | "row" => out.push('\n'),
                "tab" | "cell" => out.push('\t'),
                "u" => {
                    let code = caps
                        .get(2)
                        .and_then(|n| n.as_str().parse::<i32>().ok())
                        .map(|n| if n < 0 { n + 65536 } else { n });
                    if let Some(c) = code.and_then(|n| char::from_u32(n as u32)) {
                        out.push(c);
                    }
                    drop_fallback = true;
                }
                _ => {}
            }
            continue;
        }

        if skipping {
            continue;
        }

        if let Some(hex) = caps.get(3) {
            if std::mem::take(&mut drop_fallback) {
                continue;
            }
            if let Ok(byte) = u8::from_str_radix(hex.as_str(), 16) {
                out.push(char::from(byte));
            }
        } else if let Some(symbol) = caps.get(4) {
            match symbol.as_str() {
                "*" => skipping = true,
                "~" => out.push(' '),
                "\n" | "\r" => out.push('\n'),
                literal @ ("\\" | "{" | "}") => out.push_str(literal),
                _ => {}
            }
        } else if let Some(text) = caps.get(6) {
            let mut chars = text.as_str().chars();
            if std::mem::take(&mut drop_fallback) {
                chars.next();
            }
            out.push_str(chars.as_str());
        }
    }

    out.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::staging::{stage, Upload};
    use std::sync::Mutex;

    struct ScriptedVision {
        reply: Result<String, ()>,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedVision {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedVision {
        async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
            Err(CompletionError::Empty)
        }

        async fn describe_image(
            &self,
            file_name: &str,
            mime: &str,
            _bytes: &[u8],
        ) -> Result<String, CompletionError> {
            self.seen
                .lock()
                .unwrap()
                .push((file_name.to_string(), mime.to_string()));
            self.reply.clone().map_err(|_| CompletionError::Empty)
        }
    }

    fn upload(name: &str, content: &[u8]) -> Upload {
        Upload {
            file_name: name.to_string(),
            bytes: content.to_vec(),
        }
    }

    #[tokio::test]
    async fn merges_files_in_order() {
        let files = stage(vec![
            upload("a.txt", b"first"),
            upload("b.md", b"# second"),
        ])
        .unwrap();
        let vision = ScriptedVision::replying("unused");

        let text = DocumentExtractor::new().extract(&files, &vision).await.unwrap();
        assert_eq!(text, "first\n# second\n");
    }

    #[tokio::test]
    async fn html_is_stripped() {
        let files = stage(vec![upload(
            "page.html",
            b"<html><style>p{}</style><body><p>Water &amp; ice</p><p>Steam</p></body></html>",
        )])
        .unwrap();
        let vision = ScriptedVision::replying("unused");

        let text = DocumentExtractor::new().extract(&files, &vision).await.unwrap();
        assert_eq!(text, "Water & ice\nSteam\n");
    }

    #[tokio::test]
    async fn images_go_to_vision_provider() {
        let files = stage(vec![upload("scan.JPG", b"\xff\xd8\xff")]).unwrap();
        let vision = ScriptedVision::replying("Photosynthesis needs light.");

        let text = DocumentExtractor::new().extract(&files, &vision).await.unwrap();
        assert_eq!(text, "Photosynthesis needs light.\n");
        assert_eq!(
            vision.seen.lock().unwrap().as_slice(),
            &[("scan.JPG".to_string(), "image/jpeg".to_string())]
        );
    }

    #[tokio::test]
    async fn vision_failure_names_the_file() {
        let files = stage(vec![upload("diagram.png", b"\x89PNG")]).unwrap();
        let vision = ScriptedVision {
            reply: Err(()),
            seen: Mutex::new(Vec::new()),
        };

        let err = DocumentExtractor::new()
            .extract(&files, &vision)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Vision { ref file_name, .. } if file_name == "diagram.png"));
    }

    #[tokio::test]
    async fn unsupported_extension_fails() {
        let files = stage(vec![upload("slides.pptx", b"PK")]).unwrap();
        let vision = ScriptedVision::replying("unused");

        let err = DocumentExtractor::new()
            .extract(&files, &vision)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Unsupported { ref extension, .. } if extension == "pptx"
        ));
    }

    #[tokio::test]
    async fn blank_text_is_empty_error() {
        let files = stage(vec![upload("blank.txt", b"  \n\t ")]).unwrap();
        let vision = ScriptedVision::replying("unused");

        let err = DocumentExtractor::new()
            .extract(&files, &vision)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Empty));
    }

    #[test]
    fn strip_markup_keeps_block_lines() {
        let html = "<h1>Title</h1><p>Hello <b>World</b>!</p><script>alert('x')</script>";
        assert_eq!(strip_markup(html), "Title\nHello World !");
    }

    #[test]
    fn strip_rtf_keeps_visible_text() {
        let rtf = r"{\rtf1\ansi{\fonttbl\f0\fswiss Helvetica;}{\*\generator Writer;}\f0\pard Photosynthesis uses \b light\b0 .\par Caf\'e9 \u8364?5\par}";
        assert_eq!(strip_rtf(rtf), "Photosynthesis uses light.\nCafé €5");
    }

    #[tokio::test]
    async fn rtf_files_lose_control_words() {
        let files = stage(vec![upload(
            "notes.rtf",
            br"{\rtf1\ansi\deff0{\fonttbl{\f0 Times;}}\f0\fs24 Mitosis has four phases.\par}",
        )])
        .unwrap();
        let vision = ScriptedVision::replying("unused");

        let text = DocumentExtractor::new().extract(&files, &vision).await.unwrap();
        assert_eq!(text, "Mitosis has four phases.\n");
    }

    #[test]
    fn kind_from_extension() {
        assert_eq!(DocumentKind::from_extension("rtf"), Some(DocumentKind::Rtf));
        assert_eq!(DocumentKind::from_extension("pdf"), Some(DocumentKind::Pdf));
        assert_eq!(
            DocumentKind::from_extension("webp"),
            Some(DocumentKind::Image("image/webp"))
        );
        assert_eq!(DocumentKind::from_extension("docx"), None);
        assert_eq!(DocumentKind::from_extension(""), None);
    }
}
