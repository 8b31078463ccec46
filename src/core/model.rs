//! Analysis data model
//!
//! Variables, dependencies and the per-file aggregate produced by the
//! pattern analyzer.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Kind of ABAP program, detected from its header statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgramType {
    Report,
    Class,
    Function,
    Interface,
    Program,
}

impl ProgramType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramType::Report => "REPORT",
            ProgramType::Class => "CLASS",
            ProgramType::Function => "FUNCTION",
            ProgramType::Interface => "INTERFACE",
            ProgramType::Program => "PROGRAM",
        }
    }
}

impl fmt::Display for ProgramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds of dependencies a program can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DependencyKind {
    MethodCall,
    Include,
    DatabaseTable,
    Function,
    Class,
    View,
    Transaction,
}

impl DependencyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyKind::MethodCall => "METHOD_CALL",
            DependencyKind::Include => "INCLUDE",
            DependencyKind::DatabaseTable => "DATABASE_TABLE",
            DependencyKind::Function => "FUNCTION",
            DependencyKind::Class => "CLASS",
            DependencyKind::View => "VIEW",
            DependencyKind::Transaction => "TRANSACTION",
        }
    }

    /// Broad category used in reports
    pub fn category(&self) -> &'static str {
        match self {
            DependencyKind::MethodCall | DependencyKind::Function => "EXECUTION",
            DependencyKind::Include | DependencyKind::Class => "STRUCTURAL",
            DependencyKind::DatabaseTable | DependencyKind::View => "DATA",
            DependencyKind::Transaction => "NAVIGATION",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How heavily a dependency is used
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Criticality {
    Minimal,
    Low,
    Medium,
    High,
}

impl Criticality {
    pub fn from_usage_count(count: usize) -> Self {
        if count > 10 {
            Criticality::High
        } else if count > 5 {
            Criticality::Medium
        } else if count > 1 {
            Criticality::Low
        } else {
            Criticality::Minimal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Criticality::Minimal => "MINIMAL",
            Criticality::Low => "LOW",
            Criticality::Medium => "MEDIUM",
            Criticality::High => "HIGH",
        }
    }
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification of how often a variable is referenced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsagePattern {
    DeclaredUnused,
    Single,
    Moderate,
    Frequent,
}

impl UsagePattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsagePattern::DeclaredUnused => "DECLARED_UNUSED",
            UsagePattern::Single => "SINGLE_USE",
            UsagePattern::Moderate => "MODERATE_USE",
            UsagePattern::Frequent => "FREQUENT_USE",
        }
    }
}

/// A declared variable, type, constant, field symbol or parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableRecord {
    pub name: String,
    pub declared_type: String,
    pub declaration_line: usize,
    pub scope: String,
    pub is_parameter: bool,
    pub is_field_symbol: bool,
    pub default_value: Option<String>,
    usage_lines: BTreeSet<usize>,
}

impl VariableRecord {
    pub fn new(name: impl Into<String>, declared_type: Option<&str>, declaration_line: usize) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.unwrap_or("UNKNOWN").to_string(),
            declaration_line,
            scope: "LOCAL".to_string(),
            is_parameter: false,
            is_field_symbol: false,
            default_value: None,
            usage_lines: BTreeSet::new(),
        }
    }

    /// Record a line where the variable appears. Returns false for a repeat.
    pub fn add_usage_line(&mut self, line: usize) -> bool {
        self.usage_lines.insert(line)
    }

    /// Usage lines in ascending order
    pub fn usage_lines(&self) -> Vec<usize> {
        self.usage_lines.iter().copied().collect()
    }

    pub fn usage_count(&self) -> usize {
        self.usage_lines.len()
    }

    pub fn is_frequently_used(&self) -> bool {
        self.usage_lines.len() > 3
    }

    /// First and last usage line, if any
    pub fn usage_range(&self) -> Option<(usize, usize)> {
        let first = *self.usage_lines.iter().next()?;
        let last = *self.usage_lines.iter().next_back()?;
        Some((first, last))
    }

    pub fn usage_pattern(&self) -> UsagePattern {
        match self.usage_lines.len() {
            0 => UsagePattern::DeclaredUnused,
            1 => UsagePattern::Single,
            _ if self.is_frequently_used() => UsagePattern::Frequent,
            _ => UsagePattern::Moderate,
        }
    }

    pub fn summary(&self) -> String {
        let range = match self.usage_range() {
            None => "unused".to_string(),
            Some((a, b)) if a == b => format!("line {}", a),
            Some((a, b)) => format!("lines {}-{}", a, b),
        };
        format!(
            "{} ({}) - declared line {}, used {} times ({}), pattern {}",
            self.name,
            self.declared_type,
            self.declaration_line,
            self.usage_count(),
            range,
            self.usage_pattern().as_str()
        )
    }
}

// ABAP identifiers are case-insensitive; identity is the name alone.
impl PartialEq for VariableRecord {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl Eq for VariableRecord {}

impl Hash for VariableRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.to_ascii_uppercase().hash(state);
    }
}

/// Something the analyzed program depends on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub name: String,
    pub kind: DependencyKind,
    pub is_external: bool,
    pub description: Option<String>,
    usage_lines: BTreeSet<usize>,
}

impl DependencyRecord {
    pub fn new(name: impl Into<String>, kind: DependencyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            is_external: false,
            description: None,
            usage_lines: BTreeSet::new(),
        }
    }

    pub fn external(mut self) -> Self {
        self.is_external = true;
        self
    }

    /// Record a line where the dependency is used. Returns false for a repeat.
    pub fn add_usage_line(&mut self, line: usize) -> bool {
        self.usage_lines.insert(line)
    }

    pub fn usage_lines(&self) -> Vec<usize> {
        self.usage_lines.iter().copied().collect()
    }

    pub fn usage_count(&self) -> usize {
        self.usage_lines.len()
    }

    pub fn criticality(&self) -> Criticality {
        Criticality::from_usage_count(self.usage_count())
    }

    pub fn is_critical(&self) -> bool {
        self.criticality() == Criticality::High || self.is_external
    }

    pub fn category(&self) -> &'static str {
        self.kind.category()
    }

    /// Review hints derived from usage
    pub fn recommendations(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        let count = self.usage_count();

        if self.is_critical() {
            out.push("Critical dependency - review impact before changing it");
        }
        if count == 0 {
            out.push("Unused dependency - consider removing it");
        }
        if self.is_external && count > 5 {
            out.push("High external coupling - consider encapsulating it");
        }
        if self.kind == DependencyKind::DatabaseTable && count > 3 {
            out.push("Frequently accessed table - consider buffering or caching");
        }

        out
    }

    pub fn summary(&self) -> String {
        let mut s = format!(
            "{} ({}) - used {} times, criticality {}, category {}",
            self.name,
            self.kind,
            self.usage_count(),
            self.criticality(),
            self.category()
        );
        if self.is_external {
            s.push_str(", EXTERNAL");
        }
        s
    }

    fn same_identity(&self, name: &str, kind: DependencyKind) -> bool {
        self.kind == kind && self.name.eq_ignore_ascii_case(name)
    }
}

impl PartialEq for DependencyRecord {
    fn eq(&self, other: &Self) -> bool {
        self.same_identity(&other.name, other.kind)
    }
}

impl Eq for DependencyRecord {}

impl Hash for DependencyRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.to_ascii_uppercase().hash(state);
        self.kind.hash(state);
    }
}

/// Push `dependency`, or fold its usage lines into an entry of equal identity.
pub(crate) fn merge_dependency(list: &mut Vec<DependencyRecord>, dependency: DependencyRecord) {
    match list
        .iter_mut()
        .find(|d| d.same_identity(&dependency.name, dependency.kind))
    {
        Some(existing) => {
            existing.usage_lines.extend(dependency.usage_lines);
            existing.is_external |= dependency.is_external;
        }
        None => list.push(dependency),
    }
}

/// Structural facts about one analyzed file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeContextModel {
    pub file_name: String,
    pub program_type: ProgramType,
    pub class_names: Vec<String>,
    pub includes: Vec<String>,
    pub method_calls: Vec<String>,
    pub variables: Vec<VariableRecord>,
    pub dependencies: Vec<DependencyRecord>,
    pub metadata: BTreeMap<String, String>,
}

impl CodeContextModel {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            program_type: ProgramType::Program,
            class_names: Vec::new(),
            includes: Vec::new(),
            method_calls: Vec::new(),
            variables: Vec::new(),
            dependencies: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn add_class_name(&mut self, name: impl Into<String>) {
        self.class_names.push(name.into());
    }

    pub fn add_include(&mut self, name: impl Into<String>) {
        self.includes.push(name.into());
    }

    pub fn add_method_call(&mut self, name: impl Into<String>) {
        self.method_calls.push(name.into());
    }

    pub fn add_variable(&mut self, variable: VariableRecord) {
        self.variables.push(variable);
    }

    /// Add a dependency, merging usage lines into an existing record with
    /// the same (name, kind) identity.
    pub fn add_dependency(&mut self, dependency: DependencyRecord) {
        merge_dependency(&mut self.dependencies, dependency);
    }

    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Case-insensitive lookup, first match
    pub fn find_variable(&self, name: &str) -> Option<&VariableRecord> {
        self.variables.iter().find(|v| v.name.eq_ignore_ascii_case(name))
    }

    pub fn dependencies_by_kind(&self, kind: DependencyKind) -> Vec<&DependencyRecord> {
        self.dependencies.iter().filter(|d| d.kind == kind).collect()
    }

    pub fn critical_dependencies(&self) -> Vec<&DependencyRecord> {
        self.dependencies.iter().filter(|d| d.is_critical()).collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "File: {}\nType: {}\nClasses: {}\nVariables: {}\nDependencies: {}\n",
            self.file_name,
            self.program_type,
            self.class_names.len(),
            self.variables.len(),
            self.dependencies.len()
        )
    }

    /// Detailed analysis text for deep-analysis prompts
    pub fn ai_context(&self) -> String {
        let mut out = format!("=== ANALYSIS OF {} ===\n", self.file_name);
        out.push_str(&format!("Program type: {}\n", self.program_type));
        out.push_str(&format!("Classes: {}\n", self.class_names.join(", ")));
        out.push_str(&format!("Declared variables: {}\n", self.variables.len()));
        out.push_str(&format!("Dependencies: {}\n\n", self.dependencies.len()));

        out.push_str("=== TRACKED VARIABLES ===\n");
        for var in &self.variables {
            out.push_str(&format!(
                "- {} (type: {}, declared line: {}, used on lines: {:?})\n",
                var.name,
                var.declared_type,
                var.declaration_line,
                var.usage_lines()
            ));
        }
        out.push('\n');

        out.push_str("=== DEPENDENCIES ===\n");
        for dep in &self.dependencies {
            out.push_str(&format!(
                "- {} (kind: {}, criticality: {})\n",
                dep.name,
                dep.kind,
                dep.criticality()
            ));
        }
        out.push('\n');

        out
    }
}
