//! Document context management for AI operations
//!
//! Holds user-supplied documents (specifications, requirements, notes) and
//! assembles them into a context block that fits a character budget
//! approximating the model's token window.

use std::path::Path;
use tracing::debug;

use super::documents::{DocumentExtractor, ExtractError};

/// Characters reserved per document for the header framing
const DOCUMENT_OVERHEAD: usize = 100;
/// Documents are not started once less than this many chars remain
const MIN_REMAINING_CHARS: usize = 500;
/// Room left for the truncation notice
const NOTICE_RESERVE: usize = 100;

const TRUNCATION_NOTICE: &str = "... [Document truncated for token limit]";

/// Token budget of the combined document context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextBudget {
    pub max_tokens: usize,
    pub chars_per_token: usize,
}

impl ContextBudget {
    pub fn max_chars(&self) -> usize {
        self.max_tokens * self.chars_per_token
    }
}

impl Default for ContextBudget {
    fn default() -> Self {
        Self {
            max_tokens: 8000,
            chars_per_token: 4,
        }
    }
}

/// A document available to the context
#[derive(Debug, Clone)]
pub struct DocumentContextEntry {
    pub path: String,
    pub content: String,
    pub enabled: bool,
}

/// Document context manager
#[derive(Debug, Default)]
pub struct DocumentContextManager {
    budget: ContextBudget,
    // Insertion order is the build order.
    documents: Vec<DocumentContextEntry>,
}

impl DocumentContextManager {
    pub fn new(budget: ContextBudget) -> Self {
        Self {
            budget,
            documents: Vec::new(),
        }
    }

    pub fn budget(&self) -> ContextBudget {
        self.budget
    }

    /// Add or replace a document. Re-adding always enables it.
    pub fn add_document(&mut self, path: &str, content: impl Into<String>) {
        let content = content.into();
        match self.documents.iter_mut().find(|d| d.path == path) {
            Some(entry) => {
                entry.content = content;
                entry.enabled = true;
            }
            None => self.documents.push(DocumentContextEntry {
                path: path.to_string(),
                content,
                enabled: true,
            }),
        }
    }

    /// Extract a document from disk and add it
    pub fn add_from_path(
        &mut self,
        path: &Path,
        extractor: &dyn DocumentExtractor,
    ) -> Result<(), ExtractError> {
        let content = extractor.extract(path)?;
        self.add_document(&path.to_string_lossy(), content);
        Ok(())
    }

    pub fn remove_document(&mut self, path: &str) {
        self.documents.retain(|d| d.path != path);
    }

    pub fn clear_all(&mut self) {
        self.documents.clear();
    }

    /// Toggle a document; unknown paths are ignored
    pub fn set_enabled(&mut self, path: &str, enabled: bool) {
        if let Some(entry) = self.documents.iter_mut().find(|d| d.path == path) {
            entry.enabled = enabled;
        }
    }

    pub fn is_enabled(&self, path: &str) -> bool {
        self.documents
            .iter()
            .any(|d| d.path == path && d.enabled)
    }

    pub fn list_documents(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.path.as_str()).collect()
    }

    pub fn documents(&self) -> &[DocumentContextEntry] {
        &self.documents
    }

    /// Build the combined context of all enabled documents within budget
    pub fn build_context(&self) -> String {
        let max_chars = self.budget.max_chars();
        let mut result = String::new();
        let mut total_chars = 0;

        for doc in self.documents.iter().filter(|d| d.enabled) {
            let mut content = doc.content.clone();
            let mut doc_chars = content.chars().count();

            if total_chars + doc_chars > max_chars {
                let remaining = max_chars.saturating_sub(total_chars);
                if remaining <= MIN_REMAINING_CHARS {
                    debug!("Context budget exhausted before {}", doc.path);
                    break;
                }
                content = smart_truncate(&content, remaining);
                doc_chars = content.chars().count();
                debug!("Truncated {} to {} chars", doc.path, doc_chars);
            }

            result.push_str(&format!("📄 Document: {}\n", file_name(&doc.path)));
            result.push_str(&"─".repeat(50));
            result.push('\n');
            result.push_str(&content);
            result.push_str("\n\n");

            total_chars += doc_chars + DOCUMENT_OVERHEAD;
        }

        result
    }

    /// Frame a user prompt and selected code with the document context
    pub fn build_contextual_query(&self, user_prompt: &str, selected_code: Option<&str>) -> String {
        let context = self.build_context();
        let has_context = !context.trim().is_empty();
        let mut query = String::new();

        if has_context {
            query.push_str("📋 CONTEXT DOCUMENTATION:\n");
            query.push_str(&context);
            query.push_str("🎯 TASK:\n");
        }

        query.push_str(user_prompt);

        if let Some(code) = selected_code.filter(|c| !c.trim().is_empty()) {
            query.push_str("\n\n💻 ABAP CODE:\n```abap\n");
            query.push_str(code);
            query.push_str("\n```");
        }

        if has_context {
            query.push_str(
                "\n\n⚡ Please analyze the provided code considering the context documentation above. \
                 Use the specifications, requirements, and business logic described in the documents \
                 to provide more accurate and relevant suggestions.",
            );
        }

        query
    }

    pub fn summary(&self) -> String {
        let enabled = self.documents.iter().filter(|d| d.enabled).count();
        let tokens = estimate_tokens(&self.build_context(), self.budget.chars_per_token);
        format!(
            "📊 Context: {}/{} docs enabled, ~{} tokens used",
            enabled,
            self.documents.len(),
            tokens
        )
    }

    pub fn has_context(&self) -> bool {
        self.documents.iter().any(|d| d.enabled)
    }
}

/// Shorten `content` to roughly `max_chars`, preferring paragraph then
/// sentence boundaries in the second half of the budget. A break is taken
/// when it starts at or before the cut point.
pub fn smart_truncate(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }

    let cut_point = max_chars.saturating_sub(NOTICE_RESERVE);
    let head = &content[..byte_offset(content, cut_point)];
    // Breaks may start at the cut point and run past it.
    let window = &content[..byte_offset(content, cut_point + 2)];
    let half = max_chars / 2;

    if let Some(pos) = window.rfind("\n\n") {
        if window[..pos].chars().count() > half {
            return format!("{}\n\n{}", &window[..pos], TRUNCATION_NOTICE);
        }
    }

    if let Some(pos) = window.rfind(". ") {
        if window[..pos].chars().count() > half {
            return format!("{} {}", &window[..=pos], TRUNCATION_NOTICE);
        }
    }

    format!("{}{}", head, TRUNCATION_NOTICE)
}

/// Estimate tokens (rough approximation)
pub fn estimate_tokens(text: &str, chars_per_token: usize) -> usize {
    text.chars().count() / chars_per_token.max(1)
}

fn byte_offset(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
