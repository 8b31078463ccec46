//! Prompt templates for ABAP tasks
//!
//! Pure string composition: every function here takes text and returns text.

use crate::core::insights::InsightReport;

/// System message that opens every conversation
pub const SYSTEM_PROMPT: &str = "You are an expert ABAP programming assistant. You help developers with SAP ABAP code analysis, \
optimization, error detection, and best practices. Always provide clear, actionable advice with \
code examples when appropriate. Focus on performance, maintainability, and SAP standards.";

/// Kind of request sent to the assistant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    Explain,
    Optimize,
    Fix,
    ErrorCheck,
    /// Free-form instruction supplied by the user
    Custom(String),
}

impl TaskKind {
    pub fn label(&self) -> &str {
        match self {
            TaskKind::Explain => "explain",
            TaskKind::Optimize => "optimize",
            TaskKind::Fix => "fix",
            TaskKind::ErrorCheck => "error-check",
            TaskKind::Custom(_) => "custom",
        }
    }
}

/// Build the prompt for `task` over `code` with an analysis or document context
pub fn assemble(task: &TaskKind, code: &str, context: &str) -> String {
    match task {
        TaskKind::Explain => format!(
            "Please explain this ABAP code in detail. Include:\n\
             1. What the code does (functionality)\n\
             2. Key ABAP concepts used\n\
             3. Data flow and logic\n\
             4. Any SAP-specific patterns\n\
             5. Potential improvements\n\n\
             Context: {}\n\nCode:\n{}",
            context, code
        ),
        TaskKind::Optimize => format!(
            "Please analyze this ABAP code for optimization opportunities. Focus on:\n\
             1. Performance improvements\n\
             2. Memory usage optimization\n\
             3. Database query optimization\n\
             4. Modern ABAP syntax usage\n\
             5. SAP best practices\n\
             6. Code readability and maintainability\n\n\
             Provide specific recommendations with improved code examples.\n\n\
             Context: {}\n\nCode:\n{}",
            context, code
        ),
        TaskKind::ErrorCheck => format!(
            "Please check this ABAP code for potential issues and errors. Look for:\n\
             1. Syntax errors\n\
             2. Logic errors\n\
             3. Runtime issues\n\
             4. Security vulnerabilities\n\
             5. Performance problems\n\
             6. SAP coding standards violations\n\
             7. Memory leaks\n\
             8. Exception handling issues\n\n\
             Provide solutions for each issue found.\n\n\
             Context: {}\n\nCode:\n{}",
            context, code
        ),
        TaskKind::Fix => format!(
            "You are an ABAP programming expert. Analyze the following ABAP code and fix any errors, bugs, or issues. \
             Return ONLY the corrected ABAP code without explanations or markdown formatting.\n\n\
             Context: {}\n\nCode to fix:\n{}\n\nFixed code:",
            context, code
        ),
        TaskKind::Custom(instruction) => {
            format!("{}\n\nContext: {}\n\nCode:\n{}", instruction.trim(), context, code)
        }
    }
}

/// Fix request whose answer is applied between modification markers
pub fn auto_fix_prompt(code: &str) -> String {
    format!(
        "Please analyze this ABAP code and fix any syntax errors, logical issues, or performance problems. \
         Return only the corrected ABAP code without explanations:\n\n{}",
        code
    )
}

pub fn auto_optimize_prompt(code: &str) -> String {
    format!(
        "Please optimize this ABAP code for better performance, readability, and following best practices. \
         Return only the optimized ABAP code without explanations:\n\n{}",
        code
    )
}

pub fn with_context(message: &str, context: &str) -> String {
    format!("Context:\n{}\n\nRequest:\n{}", context, message)
}

/// Deep quality review of code together with its static analysis
pub fn deep_analysis_prompt(code: &str, analysis_context: &str) -> String {
    format!(
        "Perform a deep analysis of the following ABAP code:\n\n\
         {}\n\n\
         ANALYSIS CONTEXT:\n{}\n\n\
         Please provide:\n\
         1. Code quality analysis\n\
         2. Design pattern identification\n\
         3. Performance evaluation\n\
         4. Refactoring suggestions\n\
         5. SAP standards compliance\n\
         6. Maintainability analysis\n\
         7. Duplicate code detection\n\
         8. Coupling and cohesion assessment",
        code, analysis_context
    )
}

pub fn insights_prompt(file_name: &str, code: &str, analysis_context: &str) -> String {
    format!(
        "FILE: {}\n\n\
         CODE CONTENT:\n{}\n\n\
         ANALYSIS CONTEXT:\n{}\n\n\
         Provide specific insights on:\n\
         1. Code architecture and structure\n\
         2. Data flow and business logic\n\
         3. Critical dependencies identified\n\
         4. Unused or underused variables\n\
         5. Optimization opportunities\n\
         6. Potential risks\n\
         7. Prioritized improvement recommendations\n\
         8. Impact on system performance",
        file_name, code, analysis_context
    )
}

/// Ask for concrete suggestions, seeded with the static findings
pub fn suggestions_prompt(code: &str, report: &InsightReport) -> String {
    format!(
        "You are an expert SAP ABAP consultant. Analyze this ABAP code and provide 3-5 specific, actionable improvement suggestions.\n\n\
         Code patterns detected: {}\n\
         Performance issues: {}\n\n\
         ABAP Code to analyze:\n{}\n\n\
         Provide specific suggestions in this format:\n\
         1. [Category] Suggestion title: Detailed explanation\n\
         2. [Category] Another suggestion: Explanation\n\
         Focus on: Performance, Maintainability, SAP Best Practices, Modern ABAP syntax",
        report.detected_patterns.join(", "),
        report.performance_issues.join(", "),
        code
    )
}

/// Pull the code out of an AI reply.
///
/// Takes the text between the first and last ``` fence and drops a leading
/// `abap`/`sql` tag line; without fences the whole reply is used.
pub fn extract_code_from_response(response: &str) -> Option<String> {
    let fenced = match (response.find("```"), response.rfind("```")) {
        (Some(start), Some(end)) if end > start => {
            let block = response[start + 3..end].trim();
            match block.split_once('\n') {
                Some((tag, rest)) if is_language_tag(tag) => rest,
                _ if is_language_tag(block) => "",
                _ => block,
            }
        }
        _ => response.trim(),
    };

    let code = fenced.trim_end();
    if code.trim().is_empty() {
        None
    } else {
        Some(code.to_string())
    }
}

fn is_language_tag(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "abap" | "sql")
}
