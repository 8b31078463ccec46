//! Document extraction for AI context
//!
//! Turns files on disk into plain text suitable for the document context.
//! PDF text comes from `pdf-extract`, DOCX text from the `word/document.xml`
//! part of the archive. Everything else is read as text.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;

/// Maximum characters kept from a single document
pub const MAX_DOCUMENT_CHARS: usize = 10_000;

const TRUNCATION_NOTE: &str = "\n\n... (content truncated)";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Document not found: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("PDF is password protected: {0}")]
    Encrypted(PathBuf),

    #[error("Failed to extract PDF text: {0}")]
    Pdf(String),

    #[error("Failed to extract DOCX text: {0}")]
    Docx(String),

    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of document text
pub trait DocumentExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractError>;
}

/// Reads text-based documents and caps their length.
///
/// Binary office formats are rejected; [`DocumentProcessor`] handles them.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    max_chars: usize,
}

impl TextExtractor {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn is_supported(path: &Path) -> bool {
        !matches!(extension(path).as_deref(), Some("pdf" | "doc" | "docx"))
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(MAX_DOCUMENT_CHARS)
    }
}

impl DocumentExtractor for TextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        if !path.exists() {
            return Err(ExtractError::NotFound(path.to_path_buf()));
        }
        if !Self::is_supported(path) {
            return Err(ExtractError::UnsupportedFormat(
                extension(path).unwrap_or_default(),
            ));
        }

        Ok(cap(read_text(path)?, self.max_chars))
    }
}

/// Extracts PDF, DOCX and text documents, capping their length.
///
/// Legacy `.doc` files are rejected with a hint to convert them.
#[derive(Debug, Clone)]
pub struct DocumentProcessor {
    max_chars: usize,
}

impl DocumentProcessor {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    fn extract_pdf(path: &Path) -> Result<String, ExtractError> {
        let doc = lopdf::Document::load(path).map_err(|e| ExtractError::Pdf(e.to_string()))?;
        if doc.is_encrypted() {
            return Err(ExtractError::Encrypted(path.to_path_buf()));
        }
        debug!("Extracting {} PDF pages from {}", doc.get_pages().len(), path.display());

        let text = pdf_extract::extract_text(path).map_err(|e| ExtractError::Pdf(e.to_string()))?;
        Ok(clean_text(&text))
    }

    fn extract_docx(path: &Path) -> Result<String, ExtractError> {
        let mut archive =
            ZipArchive::new(File::open(path)?).map_err(|e| ExtractError::Docx(e.to_string()))?;

        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .map_err(|_| ExtractError::Docx("missing word/document.xml".to_string()))?
            .read_to_string(&mut xml)?;

        docx_text(&xml)
    }
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::new(MAX_DOCUMENT_CHARS)
    }
}

impl DocumentExtractor for DocumentProcessor {
    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        if !path.exists() {
            return Err(ExtractError::NotFound(path.to_path_buf()));
        }

        let content = match extension(path).as_deref() {
            Some("pdf") => Self::extract_pdf(path)?,
            Some("docx") => Self::extract_docx(path)?,
            Some("doc") => {
                return Err(ExtractError::UnsupportedFormat(
                    "doc (legacy Word format, convert to .docx)".to_string(),
                ))
            }
            _ => read_text(path)?,
        };

        Ok(cap(content, self.max_chars))
    }
}

/// Paragraph text of a WordprocessingML body, one paragraph per line
fn docx_text(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut content = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"w:t" => in_text = true,
            Ok(Event::Text(e)) if in_text => {
                let text = e.unescape().map_err(|err| ExtractError::Docx(err.to_string()))?;
                content.push_str(&text);
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => content.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"w:tab" => content.push('\t'),
                b"w:br" => content.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Docx(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(content.trim_end().to_string())
}

/// Drop control characters and blank lines left over by PDF layout
fn clean_text(text: &str) -> String {
    text.lines()
        .map(|line| {
            line.chars()
                .filter(|c| !c.is_control() || *c == '\t')
                .collect::<String>()
        })
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn read_text(path: &Path) -> Result<String, ExtractError> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn cap(content: String, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            debug!("Capping document at {} chars", max_chars);
            let mut capped = content[..byte_idx].to_string();
            capped.push_str(TRUNCATION_NOTE);
            capped
        }
        None => content,
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}
