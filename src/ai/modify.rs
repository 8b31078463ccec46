//! AI-driven code modification
//!
//! Sends an auto-fix or auto-optimize request, checks that the reply holds
//! ABAP code and wraps it in modification markers under a ticket.

use thiserror::Error;
use tracing::{debug, warn};

use super::client::{AiError, Conversation};
use super::prompts;
use crate::audit::AuditLog;
use crate::markers::{ModificationMarker, TicketNumber};

const ABAP_KEYWORDS: &[&str] = &["DATA", "LOOP ", "IF ", "ENDIF", "ENDLOOP", "WRITE "];

#[derive(Debug, Error)]
pub enum ModifyError {
    #[error(transparent)]
    Ai(#[from] AiError),

    #[error("The AI response does not contain ABAP code")]
    NoCode,
}

/// Kind of automatic modification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoTask {
    Fix,
    Optimize,
}

impl AutoTask {
    pub fn prompt(&self, code: &str) -> String {
        match self {
            AutoTask::Fix => prompts::auto_fix_prompt(code),
            AutoTask::Optimize => prompts::auto_optimize_prompt(code),
        }
    }

    /// Modification type written to the audit log
    pub fn audit_kind(&self) -> &'static str {
        match self {
            AutoTask::Fix => "AUTO_FIX_MARKED",
            AutoTask::Optimize => "AUTO_OPTIMIZE_MARKED",
        }
    }
}

/// One code change requested under a ticket
#[derive(Debug, Clone)]
pub struct ModificationRequest<'a> {
    pub task: AutoTask,
    pub code: &'a str,
    pub ticket: &'a TicketNumber,
    pub file_name: Option<&'a str>,
}

/// Rough check that `code` is ABAP rather than prose
pub fn looks_like_abap(code: &str) -> bool {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return false;
    }
    let upper = trimmed.to_uppercase();
    ABAP_KEYWORDS.iter().any(|kw| upper.contains(kw)) || trimmed.ends_with('.')
}

/// Turn an AI reply into a marked modification of `request.code`.
///
/// The entry is audited only when a log is given and the reply holds code.
pub fn apply_response(
    request: &ModificationRequest<'_>,
    response: &str,
    marker: &ModificationMarker,
    audit: Option<&mut AuditLog>,
) -> Result<String, ModifyError> {
    let code = prompts::extract_code_from_response(response)
        .filter(|code| looks_like_abap(code))
        .ok_or_else(|| {
            warn!("Discarding {} response without ABAP code", request.task.audit_kind());
            ModifyError::NoCode
        })?;

    let marked = marker.wrap_modification(request.code, &code, Some(request.ticket));

    if let Some(audit) = audit {
        audit.record_with_ticket(
            request.task.audit_kind(),
            request.code,
            &marked,
            request.file_name,
            Some(request.ticket),
            marker.user(),
        );
    }

    Ok(marked)
}

/// Ask the assistant for the fix or optimization and apply its reply
pub async fn auto_modify(
    conversation: &mut Conversation,
    request: &ModificationRequest<'_>,
    marker: &ModificationMarker,
    audit: Option<&mut AuditLog>,
) -> Result<String, ModifyError> {
    debug!("Requesting {} for {}", request.task.audit_kind(), request.ticket);
    let response = conversation.send(&request.task.prompt(request.code)).await?;
    apply_response(request, &response, marker, audit)
}
