//! SAP modification markers
//!
//! Generates the BEGIN/END comment lines that bound tracked code changes and
//! wraps original/new code pairs between them.

use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

static TICKET_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3,10}-[A-Z0-9]{1,10}$").expect("valid regex"));

const DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkerError {
    #[error("Invalid ticket number '{0}': expected a format like TICKET-123, INC-1 or CHG-4567")]
    InvalidTicketFormat(String),
}

/// A validated, upper-cased ticket number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketNumber(String);

impl TicketNumber {
    pub fn parse(input: &str) -> Result<Self, MarkerError> {
        let upper = input.to_uppercase();
        if TICKET_PATTERN.is_match(&upper) {
            Ok(Self(upper))
        } else {
            Err(MarkerError::InvalidTicketFormat(input.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn is_valid_ticket_number(input: &str) -> bool {
    TicketNumber::parse(input).is_ok()
}

/// Marker line templates with `{TICKET}`, `{USER}` and `{DATE}` placeholders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerTemplates {
    pub mod_begin: String,
    pub mod_end: String,
    pub ins_begin: String,
    pub ins_end: String,
}

impl Default for MarkerTemplates {
    fn default() -> Self {
        Self {
            mod_begin: "*BEGIN MOD {TICKET} {USER} {DATE}".to_string(),
            mod_end: "*END MOD {TICKET} {USER} {DATE}".to_string(),
            ins_begin: "*BEGIN INS {TICKET} {USER} {DATE}".to_string(),
            ins_end: "*END INS {TICKET} {USER} {DATE}".to_string(),
        }
    }
}

/// Substitute the placeholders of one template; a missing ticket reads `UNKNOWN`
pub fn process_template(template: &str, ticket: Option<&str>, user: &str, date: &str) -> String {
    template
        .replace("{TICKET}", ticket.unwrap_or("UNKNOWN"))
        .replace("{USER}", user)
        .replace("{DATE}", date)
}

/// Comment out one ABAP line, keeping its indentation. Blank lines pass through.
pub fn comment_out_line(line: &str) -> String {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return line.to_string();
    }
    let indent = &line[..line.len() - line.trim_start().len()];
    format!("{}*{}", indent, trimmed)
}

/// Marker generator bound to one user and date
#[derive(Debug, Clone)]
pub struct ModificationMarker {
    templates: MarkerTemplates,
    user: String,
    date: String,
}

impl ModificationMarker {
    /// Markers for the current OS user and today's date
    pub fn new(templates: MarkerTemplates) -> Self {
        Self {
            templates,
            user: default_user(),
            date: Local::now().date_naive().format(DATE_FORMAT).to_string(),
        }
    }

    /// Override the user; blank values keep the default
    pub fn with_user(mut self, user: Option<&str>) -> Self {
        if let Some(user) = user.map(str::trim).filter(|u| !u.is_empty()) {
            self.user = user.to_uppercase();
        }
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date.format(DATE_FORMAT).to_string();
        self
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    fn render(&self, template: &str, ticket: Option<&TicketNumber>) -> String {
        process_template(template, ticket.map(TicketNumber::as_str), &self.user, &self.date)
    }

    pub fn begin_mod(&self, ticket: Option<&TicketNumber>) -> String {
        self.render(&self.templates.mod_begin, ticket)
    }

    pub fn end_mod(&self, ticket: Option<&TicketNumber>) -> String {
        self.render(&self.templates.mod_end, ticket)
    }

    pub fn begin_ins(&self, ticket: Option<&TicketNumber>) -> String {
        self.render(&self.templates.ins_begin, ticket)
    }

    pub fn end_ins(&self, ticket: Option<&TicketNumber>) -> String {
        self.render(&self.templates.ins_end, ticket)
    }

    /// Comment out `original` and place `new_code` after it, between MOD markers
    pub fn wrap_modification(
        &self,
        original: &str,
        new_code: &str,
        ticket: Option<&TicketNumber>,
    ) -> String {
        let mut result = self.begin_mod(ticket);
        result.push('\n');

        for line in original.lines() {
            result.push_str(&comment_out_line(line));
            result.push('\n');
        }

        push_block(&mut result, new_code);
        result.push_str(&self.end_mod(ticket));
        result
    }

    /// Place `new_code` between INS markers
    pub fn wrap_insertion(&self, new_code: &str, ticket: Option<&TicketNumber>) -> String {
        let mut result = self.begin_ins(ticket);
        result.push('\n');
        push_block(&mut result, new_code);
        result.push_str(&self.end_ins(ticket));
        result
    }
}

impl Default for ModificationMarker {
    fn default() -> Self {
        Self::new(MarkerTemplates::default())
    }
}

fn push_block(out: &mut String, code: &str) {
    out.push_str(code);
    if !code.ends_with('\n') {
        out.push('\n');
    }
}

fn default_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| "USER".to_string())
        .to_uppercase()
}
