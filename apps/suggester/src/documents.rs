//! Document collaborators: text extraction from uploaded resumes and rendering
//! of (possibly rewritten) text back into a document.

use bytes::Bytes;
use tracing::{debug, warn};

use crate::errors::SuggestError;

/// Pulls plain text out of a binary document.
pub trait TextExtractor: Send + Sync {
    /// Fails with `SuggestError::Extraction` only when the document cannot be
    /// parsed at all. Unreadable pages just contribute no text.
    fn extract(&self, payload: &[u8]) -> Result<String, SuggestError>;
}

/// Turns plain text into a rendered document. Must accept any Unicode text.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, text: &str) -> Result<Bytes, SuggestError>;

    /// File extension for the rendered output, without the dot.
    fn extension(&self) -> &'static str;
}

pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, payload: &[u8]) -> Result<String, SuggestError> {
        if payload.is_empty() {
            return Err(SuggestError::Extraction("Empty PDF payload".to_string()));
        }
        let text = pdf_extract::extract_text_from_mem(payload)
            .map_err(|e| SuggestError::Extraction(format!("Failed to parse PDF: {e}")))?;
        let text = text.trim().to_string();
        if text.is_empty() {
            warn!("PDF parsed but yielded no text ({} bytes)", payload.len());
        } else {
            debug!("Extracted {} chars from PDF", text.len());
        }
        Ok(text)
    }
}

/// Renders UTF-8 text, one input line per output line.
pub struct PlainTextRenderer;

impl DocumentRenderer for PlainTextRenderer {
    fn render(&self, text: &str) -> Result<Bytes, SuggestError> {
        let mut out = text.lines().collect::<Vec<_>>().join("\n");
        out.push('\n');
        Ok(Bytes::from(out))
    }

    fn extension(&self) -> &'static str {
        "txt"
    }
}
