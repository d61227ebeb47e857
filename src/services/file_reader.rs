// Document Ingestion
// Plain text, PDF and DOCX to raw text

use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to extract PDF text: {0}")]
    Pdf(String),
    #[error("Failed to parse DOCX: {0}")]
    Docx(String),
    #[error("File is not valid UTF-8 text")]
    Encoding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Pdf,
    Docx,
    Unsupported,
}

impl DocumentKind {
    /// Classify by file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "txt" | "md" | "text" => Self::PlainText,
            _ => Self::Unsupported,
        }
    }
}

/// Read a document as plain text. Unsupported extensions yield an empty
/// string rather than an error.
pub fn read_document(path: &Path) -> Result<String, IngestError> {
    let kind = DocumentKind::from_path(path);
    if kind == DocumentKind::Unsupported {
        warn!(path = %path.display(), "ingest.unsupported_extension");
        return Ok(String::new());
    }

    let bytes = fs::read(path)?;
    let text = extract_text(kind, &bytes)?;
    info!(
        path = %path.display(),
        kind = ?kind,
        bytes = bytes.len(),
        chars = text.chars().count(),
        "ingest.extracted"
    );
    Ok(text)
}

/// Extract text from in-memory document bytes.
pub fn extract_text(kind: DocumentKind, bytes: &[u8]) -> Result<String, IngestError> {
    match kind {
        DocumentKind::PlainText => String::from_utf8(bytes.to_vec()).map_err(|_| IngestError::Encoding),
        DocumentKind::Pdf => read_pdf(bytes),
        DocumentKind::Docx => read_docx(bytes),
        DocumentKind::Unsupported => Ok(String::new()),
    }
}

fn read_pdf(bytes: &[u8]) -> Result<String, IngestError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| IngestError::Pdf(e.to_string()))
}

/// Non-blank paragraphs joined with newlines.
fn read_docx(bytes: &[u8]) -> Result<String, IngestError> {
    use docx_rs::{DocumentChild, ParagraphChild, RunChild};

    let docx = docx_rs::read_docx(bytes).map_err(|e| IngestError::Docx(e.to_string()))?;

    let mut paragraphs: Vec<String> = Vec::new();
    for child in &docx.document.children {
        let DocumentChild::Paragraph(paragraph) = child else {
            continue;
        };
        let mut text = String::new();
        for p_child in &paragraph.children {
            if let ParagraphChild::Run(run) = p_child {
                for r_child in &run.children {
                    match r_child {
                        RunChild::Text(t) => text.push_str(&t.text),
                        RunChild::Tab(_) => text.push('\t'),
                        _ => {}
                    }
                }
            }
        }
        if !text.trim().is_empty() {
            paragraphs.push(text);
        }
    }

    Ok(paragraphs.join("\n"))
}
