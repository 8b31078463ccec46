//! Static ABAP insight rules
//!
//! Cheap keyword and pattern checks that flag SAP idioms, performance risks,
//! modernization opportunities and architectural smells before any AI call.

use once_cell::sync::Lazy;
use regex::Regex;

static NESTED_SELECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)\bselect\b.*\bselect\b").expect("valid regex"));
static SELECT_IN_LOOP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)\bloop\b.*\bselect\b").expect("valid regex"));
static HARDCODED_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)'[A-Z0-9]{2,}'").expect("valid regex"));

type Check = fn(&str) -> bool;

// Rules receive the upper-cased source.
static SAP_PATTERNS: &[(Check, &str)] = &[
    (|c| c.contains("CL_SALV_"), "ALV grid display pattern - modern SAP list output"),
    (
        |c| c.contains("CALL FUNCTION") && c.contains("BAPI_"),
        "BAPI usage pattern - business API integration",
    ),
    (|c| c.contains("CALL SCREEN"), "Screen programming pattern - consider UI5 alternatives"),
    (
        |c| c.contains("WRITE:") || c.contains("WRITE "),
        "Classical report pattern - consider ALV for presentation",
    ),
    (
        |c| c.contains("SELECT SINGLE") || c.contains("SELECT *"),
        "Database access pattern - performance review recommended",
    ),
    (
        |c| c.contains("SMARTFORMS") || c.contains("SSF_"),
        "Smart Forms pattern - document generation framework",
    ),
    (|c| c.contains("ENHANCEMENT"), "Enhancement framework usage - good extensibility practice"),
];

static PERFORMANCE_RULES: &[(Check, &str)] = &[
    (|c| NESTED_SELECT.is_match(c), "CRITICAL: nested SELECT statements - use a JOIN instead"),
    (|c| c.contains("SELECT *"), "WARNING: SELECT * - select only the required fields"),
    (|c| SELECT_IN_LOOP.is_match(c), "CRITICAL: database access inside LOOP - use FOR ALL ENTRIES"),
    (select_without_where, "WARNING: SELECT without WHERE clause - full table read"),
    (
        |c| c.contains("LOOP") && c.contains("SORT"),
        "PERFORMANCE: SORT near LOOP - sort once before looping",
    ),
];

static MODERNIZATION_RULES: &[(Check, &str)] = &[
    (
        |c| c.contains("LOOP AT") && !c.contains("INTO"),
        "MODERNIZE: use LOOP AT itab INTO wa or an inline field symbol",
    ),
    (
        |c| c.contains("IF") && c.contains(" EQ "),
        "MODERNIZE: use '=' instead of 'EQ' for readability",
    ),
    (|c| c.contains("CONCATENATE"), "MODERNIZE: use string templates |{ }| instead of CONCATENATE"),
    (
        |c| c.contains("DATA:") && c.contains("TYPE I"),
        "MODERNIZE: consider explicit integer types (INT1, INT2, INT4, INT8)",
    ),
    (
        |c| c.contains("READ TABLE") && !c.contains("BINARY SEARCH"),
        "OPTIMIZE: add BINARY SEARCH to READ TABLE on sorted tables",
    ),
];

static ARCHITECTURE_RULES: &[(Check, &str)] = &[
    (
        mixed_concerns,
        "ARCHITECTURE: mixed concerns - separate presentation, logic and data access",
    ),
    (
        |c| HARDCODED_LITERAL.is_match(c),
        "ARCHITECTURE: hard-coded values - use constants or customizing",
    ),
    (
        |c| c.contains("SELECT") && !c.contains("SY-SUBRC"),
        "ARCHITECTURE: missing SY-SUBRC check after database access",
    ),
];

fn select_without_where(code: &str) -> bool {
    code.split('.')
        .filter(|stmt| stmt.trim_start().starts_with("SELECT"))
        .any(|stmt| stmt.contains("FROM") && !stmt.contains("WHERE"))
}

fn mixed_concerns(code: &str) -> bool {
    let ui = code.contains("WRITE") || code.contains("MESSAGE");
    let db = code.contains("SELECT") || code.contains("INSERT");
    let logic = code.contains("LOOP") || code.contains("IF");
    ui && db && logic
}

fn run_rules(rules: &[(Check, &str)], code: &str) -> Vec<String> {
    rules
        .iter()
        .filter(|(check, _)| check(code))
        .map(|(_, message)| message.to_string())
        .collect()
}

/// Findings of the static checks, plus optional AI suggestions
#[derive(Debug, Clone, Default)]
pub struct InsightReport {
    pub detected_patterns: Vec<String>,
    pub performance_issues: Vec<String>,
    pub modernization_suggestions: Vec<String>,
    pub architecture_issues: Vec<String>,
    pub ai_suggestions: Option<String>,
}

impl InsightReport {
    pub fn is_empty(&self) -> bool {
        self.detected_patterns.is_empty()
            && self.performance_issues.is_empty()
            && self.modernization_suggestions.is_empty()
            && self.architecture_issues.is_empty()
            && self.ai_suggestions.is_none()
    }

    /// Render non-empty sections as a plain-text report
    pub fn summary_report(&self) -> String {
        let mut report = String::from("=== ABAP CODE ANALYSIS REPORT ===\n\n");

        let sections = [
            ("DETECTED PATTERNS", &self.detected_patterns),
            ("PERFORMANCE ISSUES", &self.performance_issues),
            ("MODERNIZATION OPPORTUNITIES", &self.modernization_suggestions),
            ("ARCHITECTURE RECOMMENDATIONS", &self.architecture_issues),
        ];
        for (title, items) in sections {
            if items.is_empty() {
                continue;
            }
            report.push_str(title);
            report.push_str(":\n");
            for item in items {
                report.push_str(&format!("• {}\n", item));
            }
            report.push('\n');
        }

        if let Some(ai) = self.ai_suggestions.as_deref().filter(|s| !s.is_empty()) {
            report.push_str("AI SUGGESTIONS:\n");
            report.push_str(ai);
            report.push('\n');
        }

        report
    }
}

/// Run every static rule over `code`
pub fn analyze_insights(code: &str) -> InsightReport {
    let upper = code.to_uppercase();
    InsightReport {
        detected_patterns: run_rules(SAP_PATTERNS, &upper),
        performance_issues: run_rules(PERFORMANCE_RULES, &upper),
        modernization_suggestions: run_rules(MODERNIZATION_RULES, &upper),
        architecture_issues: run_rules(ARCHITECTURE_RULES, &upper),
        ai_suggestions: None,
    }
}
