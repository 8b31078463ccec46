//! ABAP pattern analyzer
//!
//! Extracts structural facts from raw ABAP source with regular expressions.
//! There is no grammar: every extraction is an independent pass over the
//! text, and an input without matches simply yields empty collections.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::model::{
    merge_dependency, CodeContextModel, DependencyKind, DependencyRecord, ProgramType,
    VariableRecord,
};

// Header rules, evaluated top-down; the first match decides.
static PROGRAM_TYPE_RULES: Lazy<Vec<(Regex, ProgramType)>> = Lazy::new(|| {
    vec![
        (Regex::new(r"(?im)^\s*report\s+[\w/]+").expect("valid regex"), ProgramType::Report),
        (
            Regex::new(r"(?im)^\s*class\s+[\w/]+\s+definition\b").expect("valid regex"),
            ProgramType::Class,
        ),
        (Regex::new(r"(?im)^\s*function\s+[\w/]+").expect("valid regex"), ProgramType::Function),
        (Regex::new(r"(?im)^\s*interface\s+[\w/]+").expect("valid regex"), ProgramType::Interface),
    ]
});

static CLASS_DEFINITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bclass\s+([\w/]+)\s+definition\b").expect("valid regex"));

static INCLUDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\binclude\s+([\w/]+)").expect("valid regex"));

static METHOD_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(call\s+method|call\s+function|perform)\s+'?([\w/]+(?:(?:->|=>|~)[\w/]+)*)")
        .expect("valid regex")
});

static DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(data|types|constants|field-symbols|parameters|select-options)\b:?\s+(<[\w/-]+>|[\w/][\w/-]*)(?:[ \t]+type[ \t]+((?:'[^'\n]*'|[^,.\n'])+))?",
    )
    .expect("valid regex")
});

// Start value of a declaration; the type clause ends where it begins.
static START_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[ \t]+(?:value|default)[ \t]+").expect("valid regex"));

static TABLE_ACCESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:select|insert|update|delete)\b[^.]*?\bfrom\s+([\w/]+)").expect("valid regex")
});

/// Maps byte offsets to 1-based line numbers
struct LineIndex {
    newlines: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        Self {
            newlines: text.match_indices('\n').map(|(i, _)| i).collect(),
        }
    }

    /// Newlines strictly before `offset`, plus one
    fn line_of(&self, offset: usize) -> usize {
        self.newlines.partition_point(|&nl| nl < offset) + 1
    }
}

/// Detect the program type from its header statement
pub fn detect_program_type(text: &str) -> ProgramType {
    PROGRAM_TYPE_RULES
        .iter()
        .find(|(rule, _)| rule.is_match(text))
        .map(|(_, program_type)| *program_type)
        .unwrap_or(ProgramType::Program)
}

/// Every `CLASS <name> DEFINITION`, in order of appearance
pub fn extract_class_names(text: &str) -> Vec<String> {
    CLASS_DEFINITION
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Every `INCLUDE <name>`, in order of appearance
pub fn extract_includes(text: &str) -> Vec<String> {
    INCLUDE
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .filter(|name| !is_structure_include(name))
        .collect()
}

// `INCLUDE TYPE` / `INCLUDE STRUCTURE` embed a structure, not a program.
fn is_structure_include(name: &str) -> bool {
    name.eq_ignore_ascii_case("type") || name.eq_ignore_ascii_case("structure")
}

/// Every `CALL METHOD`, `CALL FUNCTION` and `PERFORM` target, in order
pub fn extract_method_calls(text: &str) -> Vec<String> {
    METHOD_CALL
        .captures_iter(text)
        .map(|caps| caps[2].to_string())
        .collect()
}

/// Every declaration statement with its name, optional type and line
pub fn extract_variable_declarations(text: &str) -> Vec<VariableRecord> {
    let index = LineIndex::new(text);
    let mut variables = Vec::new();

    for caps in DECLARATION.captures_iter(text) {
        let name = &caps[2];
        // `TYPES: BEGIN OF ...` opens a structure rather than naming one
        if name.eq_ignore_ascii_case("begin") || name.eq_ignore_ascii_case("end") {
            continue;
        }

        let (declared_type, default_value) = caps
            .get(3)
            .map(|m| split_type_clause(m.as_str()))
            .unwrap_or((None, None));
        let line = index.line_of(caps.get(0).map_or(0, |m| m.start()));

        let mut var = VariableRecord::new(name, declared_type, line);
        var.default_value = default_value.map(str::to_string);
        let keyword = caps[1].to_ascii_lowercase();
        var.is_parameter = keyword == "parameters" || keyword == "select-options";
        var.is_field_symbol = keyword == "field-symbols";
        variables.push(var);
    }

    variables
}

/// Split `i VALUE 5` into the type and its start value
fn split_type_clause(clause: &str) -> (Option<&str>, Option<&str>) {
    fn non_empty(s: &str) -> Option<&str> {
        Some(s.trim()).filter(|s| !s.is_empty())
    }
    match START_VALUE.find(clause) {
        Some(m) => (non_empty(&clause[..m.start()]), non_empty(&clause[m.end()..])),
        None => (non_empty(clause), None),
    }
}

/// Record every line on which each variable name appears as a whole word.
///
/// The declaration line counts as a usage when it matches.
pub fn track_variable_usage(text: &str, variables: &mut [VariableRecord]) {
    let index = LineIndex::new(text);

    for var in variables.iter_mut() {
        let Some(pattern) = usage_regex(&var.name) else {
            continue;
        };
        for m in pattern.find_iter(text) {
            var.add_usage_line(index.line_of(m.start()));
        }
    }
}

// Field symbols (`<fs>`) begin and end with non-word characters, so the
// word boundary is only asserted on sides that are word characters.
fn usage_regex(name: &str) -> Option<Regex> {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let first = name.chars().next()?;
    let last = name.chars().next_back()?;

    let mut pattern = String::from("(?i)");
    if is_word(first) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&regex::escape(name));
    if is_word(last) {
        pattern.push_str(r"\b");
    }

    Regex::new(&pattern).ok()
}

/// Build dependency records for calls, includes and database tables
pub fn extract_dependencies(method_calls: &[String], includes: &[String], text: &str) -> Vec<DependencyRecord> {
    let index = LineIndex::new(text);
    let mut deps = Vec::new();

    for name in method_calls {
        merge_dependency(&mut deps, DependencyRecord::new(name, DependencyKind::MethodCall));
    }
    for caps in METHOD_CALL.captures_iter(text) {
        let name = &caps[2];
        if !contains_ignore_case(method_calls, name) {
            continue;
        }
        let mut dep = DependencyRecord::new(name, DependencyKind::MethodCall);
        if caps[1].to_ascii_lowercase().contains("function") {
            dep = dep.external();
        }
        dep.add_usage_line(index.line_of(caps.get(0).map_or(0, |m| m.start())));
        merge_dependency(&mut deps, dep);
    }

    for name in includes {
        merge_dependency(&mut deps, DependencyRecord::new(name, DependencyKind::Include));
    }
    for caps in INCLUDE.captures_iter(text) {
        let name = &caps[1];
        if !contains_ignore_case(includes, name) {
            continue;
        }
        let mut dep = DependencyRecord::new(name, DependencyKind::Include);
        dep.add_usage_line(index.line_of(caps.get(0).map_or(0, |m| m.start())));
        merge_dependency(&mut deps, dep);
    }

    for caps in TABLE_ACCESS.captures_iter(text) {
        let mut dep = DependencyRecord::new(&caps[1], DependencyKind::DatabaseTable);
        dep.add_usage_line(index.line_of(caps.get(0).map_or(0, |m| m.start())));
        merge_dependency(&mut deps, dep);
    }

    deps
}

fn contains_ignore_case(names: &[String], name: &str) -> bool {
    names.iter().any(|n| n.eq_ignore_ascii_case(name))
}

/// Run every extraction and assemble the model for one file
pub fn analyze(file_name: &str, text: &str) -> CodeContextModel {
    let mut model = CodeContextModel::new(file_name);
    model.program_type = detect_program_type(text);

    for name in extract_class_names(text) {
        model.add_class_name(name);
    }
    for name in extract_includes(text) {
        model.add_include(name);
    }
    for name in extract_method_calls(text) {
        model.add_method_call(name);
    }

    let mut variables = extract_variable_declarations(text);
    track_variable_usage(text, &mut variables);
    for var in variables {
        model.add_variable(var);
    }

    for dep in extract_dependencies(&model.method_calls, &model.includes, text) {
        model.add_dependency(dep);
    }

    model.add_metadata("line_count", text.lines().count().to_string());
    model.add_metadata("char_count", text.chars().count().to_string());

    debug!(
        "Analyzed {}: {} classes, {} variables, {} dependencies",
        file_name,
        model.class_names.len(),
        model.variables.len(),
        model.dependencies.len()
    );

    model
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"REPORT zsales_report.

INCLUDE zsales_top.
INCLUDE zsales_forms.

CLASS lcl_app DEFINITION.
  PUBLIC SECTION.
    METHODS run.
ENDCLASS.

DATA lv_total TYPE p.
DATA: lt_orders TYPE TABLE OF vbak.
FIELD-SYMBOLS <fs_order> TYPE vbak.
PARAMETERS p_vkorg TYPE vkorg.

START-OF-SELECTION.
  SELECT * FROM vbak INTO TABLE lt_orders WHERE vkorg = p_vkorg.
  LOOP AT lt_orders ASSIGNING <fs_order>.
    lv_total = lv_total + <fs_order>-netwr.
  ENDLOOP.
  PERFORM print_total.
  CALL FUNCTION 'Z_NOTIFY' EXPORTING total = lv_total.
  PERFORM print_total.
"#;

    #[test]
    fn test_detect_program_type_priority() {
        assert_eq!(detect_program_type("REPORT ZFOO."), ProgramType::Report);
        assert_eq!(detect_program_type("  report zfoo."), ProgramType::Report);
        assert_eq!(detect_program_type(SAMPLE), ProgramType::Report);
        assert_eq!(
            detect_program_type("CLASS zcl_x DEFINITION PUBLIC.\nENDCLASS."),
            ProgramType::Class
        );
        assert_eq!(detect_program_type("FUNCTION z_fm.\nENDFUNCTION."), ProgramType::Function);
        assert_eq!(detect_program_type("INTERFACE zif_x PUBLIC.\nENDINTERFACE."), ProgramType::Interface);
        assert_eq!(detect_program_type("WRITE 'hello'."), ProgramType::Program);
        assert_eq!(detect_program_type(""), ProgramType::Program);
    }

    #[test]
    fn test_class_names_keep_duplicates() {
        let text = "CLASS lcl_a DEFINITION.\nENDCLASS.\nclass LCL_A definition deferred.\nCLASS lcl_b DEFINITION.";
        let names = extract_class_names(text);
        assert_eq!(names, vec!["lcl_a", "LCL_A", "lcl_b"]);
    }

    #[test]
    fn test_class_count_matches_definitions() {
        let text = "CLASS a DEFINITION.\nCLASS a IMPLEMENTATION.\nCLASS b DEFINITION.";
        let expected = text.to_lowercase().matches(" definition").count();
        assert_eq!(extract_class_names(text).len(), expected);
    }

    #[test]
    fn test_includes_skip_structure_includes() {
        let text = "INCLUDE ztop.\nTYPES BEGIN OF ty_s.\n  INCLUDE TYPE ty_base.\n  INCLUDE STRUCTURE mara.\nTYPES END OF ty_s.\ninclude ztop.";
        assert_eq!(extract_includes(text), vec!["ztop", "ztop"]);
    }

    #[test]
    fn test_method_calls_in_order() {
        let text = "CALL METHOD lo_app->run.\nPERFORM calc.\nCALL FUNCTION 'BAPI_COMMIT'.\nperform calc.";
        assert_eq!(
            extract_method_calls(text),
            vec!["lo_app->run", "calc", "BAPI_COMMIT", "calc"]
        );
    }

    #[test]
    fn test_declaration_and_usage_on_simple_text() {
        let text = "DATA LV_X TYPE I.\nWRITE LV_X.";
        let mut vars = extract_variable_declarations(text);
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].name, "LV_X");
        assert!(vars[0].declared_type.contains('I'));
        assert_eq!(vars[0].declaration_line, 1);

        track_variable_usage(text, &mut vars);
        assert_eq!(vars[0].usage_lines(), vec![1, 2]);
    }

    #[test]
    fn test_declaration_flags_and_lines() {
        let vars = extract_variable_declarations(SAMPLE);
        let names: Vec<_> = vars.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["lv_total", "lt_orders", "<fs_order>", "p_vkorg"]);

        let field_symbol = &vars[2];
        assert!(field_symbol.is_field_symbol);
        assert_eq!(field_symbol.declaration_line, 13);
        assert_eq!(field_symbol.declared_type, "vbak");

        assert!(vars[3].is_parameter);
        assert_eq!(vars[1].declared_type, "TABLE OF vbak");
    }

    #[test]
    fn test_declaration_type_stops_at_chain_and_value() {
        let vars = extract_variable_declarations(
            "DATA: lv_a TYPE i, lv_b TYPE string.\n\
             DATA lv_c TYPE i VALUE 5.\n\
             CONSTANTS lc_pi TYPE p LENGTH 8 DECIMALS 2 VALUE '3.14'.\n\
             PARAMETERS p_max TYPE i DEFAULT 10.",
        );

        assert_eq!(vars[0].name, "lv_a");
        assert_eq!(vars[0].declared_type, "i");
        assert_eq!(vars[0].default_value, None);

        assert_eq!(vars[1].declared_type, "i");
        assert_eq!(vars[1].default_value.as_deref(), Some("5"));

        assert_eq!(vars[2].declared_type, "p LENGTH 8 DECIMALS 2");
        assert_eq!(vars[2].default_value.as_deref(), Some("'3.14'"));

        assert!(vars[3].is_parameter);
        assert_eq!(vars[3].default_value.as_deref(), Some("10"));
    }

    #[test]
    fn test_declaration_without_type_is_unknown() {
        let vars = extract_variable_declarations("DATA lv_copy LIKE lv_total.");
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].declared_type, "UNKNOWN");
    }

    #[test]
    fn test_usage_tracks_field_symbols_and_whole_words() {
        let mut vars = extract_variable_declarations(SAMPLE);
        track_variable_usage(SAMPLE, &mut vars);

        let fs = vars.iter().find(|v| v.name == "<fs_order>").unwrap();
        assert_eq!(fs.usage_lines(), vec![13, 18, 19]);

        // lv_total must not match inside longer identifiers
        let mut vars = extract_variable_declarations("DATA lv_a TYPE i.\nlv_ab = 1.\nLV_A = 2.");
        track_variable_usage("DATA lv_a TYPE i.\nlv_ab = 1.\nLV_A = 2.", &mut vars);
        assert_eq!(vars[0].usage_lines(), vec![1, 3]);
    }

    #[test]
    fn test_dependencies_from_sample() {
        let calls = extract_method_calls(SAMPLE);
        let includes = extract_includes(SAMPLE);
        let deps = extract_dependencies(&calls, &includes, SAMPLE);

        let perform = deps
            .iter()
            .find(|d| d.name == "print_total")
            .expect("perform dependency");
        assert_eq!(perform.kind, DependencyKind::MethodCall);
        assert_eq!(perform.usage_lines(), vec![21, 23]);
        assert!(!perform.is_external);

        let function = deps.iter().find(|d| d.name == "Z_NOTIFY").unwrap();
        assert!(function.is_external);
        assert!(function.is_critical());

        let includes: Vec<_> = deps
            .iter()
            .filter(|d| d.kind == DependencyKind::Include)
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(includes, vec!["zsales_top", "zsales_forms"]);

        let tables: Vec<_> = deps
            .iter()
            .filter(|d| d.kind == DependencyKind::DatabaseTable)
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(tables, vec!["vbak"]);
    }

    #[test]
    fn test_table_access_spans_lines_within_statement() {
        let text = "SELECT matnr\n  FROM mara\n  INTO TABLE lt_mara.\nSELECT SINGLE * FROM MARA INTO ls_mara.\nDELETE FROM ztlog.";
        let deps = extract_dependencies(&[], &[], text);
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].name, "mara");
        assert_eq!(deps[0].usage_lines(), vec![1, 4]);
        assert_eq!(deps[1].name, "ztlog");
    }

    #[test]
    fn test_empty_input_yields_empty_model() {
        let model = analyze("EMPTY.abap", "");
        assert_eq!(model.program_type, ProgramType::Program);
        assert!(model.class_names.is_empty());
        assert!(model.includes.is_empty());
        assert!(model.method_calls.is_empty());
        assert!(model.variables.is_empty());
        assert!(model.dependencies.is_empty());
    }

    #[test]
    fn test_analyze_populates_model() {
        let model = analyze("ZSALES.abap", SAMPLE);
        assert_eq!(model.file_name, "ZSALES.abap");
        assert_eq!(model.program_type, ProgramType::Report);
        assert_eq!(model.class_names, vec!["lcl_app"]);
        assert_eq!(model.includes.len(), 2);
        assert_eq!(model.method_calls.len(), 3);
        assert_eq!(model.variables.len(), 4);
        assert_eq!(model.metadata.get("line_count").map(String::as_str), Some("23"));

        let total = model.find_variable("LV_TOTAL").unwrap();
        assert_eq!(total.usage_lines(), vec![11, 19, 22]);
    }
}
