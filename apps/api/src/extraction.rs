//! Text extraction from stored resume documents (PDF, DOCX, TXT).
//!
//! Extraction is CPU-bound; callers inside the async runtime must go through
//! `extract_text_async`, which moves the work onto a blocking worker thread.

use std::path::{Path, PathBuf};

use anyhow::anyhow;
use thiserror::Error;

/// File extensions the extractor understands, dot included.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = [".pdf", ".docx", ".txt"];

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("{format} extraction failed: {source}")]
    Failed {
        format: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

/// Extracts plain text from a document, dispatching on the file extension.
pub fn extract_text(path: &Path) -> Result<String, ExtractionError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => extract_pdf(path),
        "docx" => extract_docx(path),
        "txt" => extract_txt(path),
        other => Err(ExtractionError::UnsupportedFormat(format!(".{other}"))),
    }
}

/// Runs `extract_text` on the blocking thread pool.
pub async fn extract_text_async(path: PathBuf) -> Result<String, ExtractionError> {
    tokio::task::spawn_blocking(move || extract_text(&path))
        .await
        .map_err(|e| ExtractionError::Failed {
            format: "Document",
            source: anyhow!(e),
        })?
}

/// Per-page text joined with blank lines. A page with no extractable text
/// contributes an empty string rather than an error.
fn extract_pdf(path: &Path) -> Result<String, ExtractionError> {
    let pages = pdf_extract::extract_text_by_pages(path).map_err(|e| ExtractionError::Failed {
        format: "PDF",
        source: anyhow!(e),
    })?;
    Ok(pages.join("\n\n").trim().to_string())
}

/// Non-blank paragraph text joined with blank lines.
fn extract_docx(path: &Path) -> Result<String, ExtractionError> {
    let failed = |source: anyhow::Error| ExtractionError::Failed {
        format: "DOCX",
        source,
    };

    let buf = std::fs::read(path).map_err(|e| failed(anyhow!(e)))?;
    let docx = docx_rs::read_docx(&buf).map_err(|e| failed(anyhow!(e)))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            docx_rs::DocumentChild::Paragraph(p) => Some(paragraph_text(p)),
            _ => None,
        })
        .filter(|text| !text.trim().is_empty())
        .collect();

    Ok(paragraphs.join("\n\n"))
}

fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let docx_rs::ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let docx_rs::RunChild::Text(t) = run_child {
                    text.push_str(&t.text);
                }
            }
        }
    }
    text
}

/// UTF-8 first; any non-UTF-8 content falls back to Windows-1252, which
/// decodes every byte sequence, so this path never fails.
fn extract_txt(path: &Path) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(path).map_err(|e| ExtractionError::Failed {
        format: "TXT",
        source: anyhow!(e),
    })?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(err.as_bytes());
            Ok(decoded.into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_txt_utf8_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.txt");
        std::fs::write(&path, "Jane Doe\nPython developer").unwrap();

        let text = extract_text(&path).unwrap();
        assert_eq!(text, "Jane Doe\nPython developer");
    }

    #[test]
    fn test_txt_non_utf8_falls_back_to_windows_1252() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        // "café" encoded as Latin-1: 0xE9 is not valid UTF-8 on its own.
        file.write_all(&[b'c', b'a', b'f', 0xE9]).unwrap();
        drop(file);

        let text = extract_text(&path).unwrap();
        assert_eq!(text, "café");
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let err = extract_text(Path::new("photo.png")).unwrap_err();
        match err {
            ExtractionError::UnsupportedFormat(ext) => assert_eq!(ext, ".png"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_extension_dispatch_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.TXT");
        std::fs::write(&path, "upper case extension").unwrap();

        assert_eq!(extract_text(&path).unwrap(), "upper case extension");
    }

    #[test]
    fn test_corrupt_pdf_reports_extraction_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not really a pdf").unwrap();

        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::Failed { format: "PDF", .. }));
    }

    #[test]
    fn test_corrupt_docx_reports_extraction_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"not really a zip archive").unwrap();

        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::Failed { format: "DOCX", .. }));
    }

    #[tokio::test]
    async fn test_async_wrapper_matches_sync_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.txt");
        std::fs::write(&path, "async text").unwrap();

        let text = extract_text_async(path).await.unwrap();
        assert_eq!(text, "async text");
    }
}
