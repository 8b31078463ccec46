//! Audit trail of code modifications
//!
//! Every applied change is kept in memory and, when a log file is configured,
//! appended to it as one line.

use chrono::{Local, NaiveDateTime};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::markers::TicketNumber;

/// One recorded modification
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub modification_type: String,
    pub file_name: Option<String>,
    pub original_code: String,
    pub new_code: String,
    pub user: String,
    pub timestamp: NaiveDateTime,
}

impl AuditEntry {
    pub fn to_log_line(&self) -> String {
        format!(
            "[{}] {} by {} on {} - Original: {} chars, New: {} chars",
            self.timestamp.format("%Y-%m-%dT%H:%M:%S%.f"),
            self.modification_type,
            self.user,
            self.file_name.as_deref().unwrap_or("Unknown"),
            self.original_code.chars().count(),
            self.new_code.chars().count()
        )
    }
}

/// Audit log
#[derive(Debug, Default)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
    log_file: Option<PathBuf>,
}

impl AuditLog {
    /// In-memory log only
    pub fn new() -> Self {
        Self::default()
    }

    /// Also append every entry to `path`
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            entries: Vec::new(),
            log_file: Some(path.into()),
        }
    }

    pub fn record(
        &mut self,
        modification_type: &str,
        original_code: &str,
        new_code: &str,
        file_name: Option<&str>,
        user: &str,
    ) -> &AuditEntry {
        let entry = AuditEntry {
            modification_type: modification_type.to_string(),
            file_name: file_name.map(str::to_string),
            original_code: original_code.to_string(),
            new_code: new_code.to_string(),
            user: user.to_string(),
            timestamp: Local::now().naive_local(),
        };

        self.append_to_file(&entry);
        info!("Recorded {} by {}", entry.modification_type, entry.user);
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Record a change made under a ticket; the ticket is appended to the type
    pub fn record_with_ticket(
        &mut self,
        modification_type: &str,
        original_code: &str,
        new_code: &str,
        file_name: Option<&str>,
        ticket: Option<&TicketNumber>,
        user: &str,
    ) -> &AuditEntry {
        let modification_type = match ticket {
            Some(ticket) => format!("{} (Ticket: {})", modification_type, ticket),
            None => modification_type.to_string(),
        };
        self.record(&modification_type, original_code, new_code, file_name, user)
    }

    pub fn history(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Clear in-memory history; the log file is left alone
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn append_to_file(&self, entry: &AuditEntry) {
        let Some(path) = &self.log_file else {
            return;
        };

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "{}", entry.to_log_line()));

        if let Err(e) = result {
            warn!("Failed to write to audit log {}: {}", path.display(), e);
        }
    }
}
