use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    Markdown,
    Pdf,
    Unsupported,
}

pub fn detect_content_kind(mime_type: &str, filename: Option<&str>) -> ContentKind {
    let mime = mime_type.split(';').next().unwrap_or("").trim().to_lowercase();
    match mime.as_str() {
        "text/plain" => ContentKind::Text,
        "text/markdown" => ContentKind::Markdown,
        "application/pdf" => ContentKind::Pdf,
        _ => {
            if let Some(name) = filename {
                let ext = Path::new(name)
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("")
                    .to_lowercase();
                match ext.as_str() {
                    "txt" => ContentKind::Text,
                    "md" | "markdown" => ContentKind::Markdown,
                    "pdf" => ContentKind::Pdf,
                    _ => ContentKind::Unsupported,
                }
            } else {
                ContentKind::Unsupported
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Invalid UTF-8 content")]
    InvalidUtf8,
    #[error("PDF contains no extractable text")]
    EmptyPdf,
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("Unsupported content type")]
    Unsupported,
}

/// Turns raw document bytes into text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, kind: ContentKind, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// UTF-8 for text and markdown, `pdf-extract` for PDFs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTextExtractor;

#[async_trait]
impl TextExtractor for DefaultTextExtractor {
    async fn extract(&self, kind: ContentKind, bytes: &[u8]) -> Result<String, ExtractError> {
        match kind {
            ContentKind::Text | ContentKind::Markdown => extract_utf8(bytes),
            ContentKind::Pdf => {
                let owned = bytes.to_vec();
                tokio::task::spawn_blocking(move || extract_pdf_text(&owned))
                    .await
                    .map_err(|err| ExtractError::Pdf(err.to_string()))?
            }
            ContentKind::Unsupported => Err(ExtractError::Unsupported),
        }
    }
}

pub fn extract_utf8(bytes: &[u8]) -> Result<String, ExtractError> {
    String::from_utf8(bytes.to_vec()).map_err(|_| ExtractError::InvalidUtf8)
}

pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let text =
        pdf_extract::extract_text_from_mem(bytes).map_err(|err| ExtractError::Pdf(err.to_string()))?;
    if text.trim().is_empty() {
        return Err(ExtractError::EmptyPdf);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_type_wins_over_extension() {
        assert_eq!(detect_content_kind("application/pdf", Some("notes.txt")), ContentKind::Pdf);
        assert_eq!(
            detect_content_kind("text/plain; charset=utf-8", None),
            ContentKind::Text
        );
    }

    #[test]
    fn extension_is_the_fallback() {
        assert_eq!(detect_content_kind("", Some("Book.PDF")), ContentKind::Pdf);
        assert_eq!(detect_content_kind("", Some("notes.md")), ContentKind::Markdown);
        assert_eq!(detect_content_kind("", Some("data.json")), ContentKind::Unsupported);
        assert_eq!(detect_content_kind("", None), ContentKind::Unsupported);
    }

    #[tokio::test]
    async fn text_is_read_as_utf8() {
        let text = DefaultTextExtractor
            .extract(ContentKind::Text, "1. Sets".as_bytes())
            .await
            .unwrap();
        assert_eq!(text, "1. Sets");

        let err = DefaultTextExtractor
            .extract(ContentKind::Text, &[0xff, 0xfe])
            .await
            .unwrap_err();
        assert_eq!(err, ExtractError::InvalidUtf8);
    }

    #[tokio::test]
    async fn garbage_pdf_bytes_fail_cleanly() {
        let result = DefaultTextExtractor
            .extract(ContentKind::Pdf, b"not a pdf")
            .await;
        assert!(result.is_err());
    }
}
