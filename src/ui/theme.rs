//! Theme for interactive prompts
//!
//! Styles the dialoguer input used when asking for ticket numbers.

use console::Style;
use dialoguer::theme::Theme;
use std::fmt;

/// Styled dialoguer theme
pub struct AssistTheme {
    pub prompt_style: Style,
    pub hint_style: Style,
    pub success_style: Style,
    pub error_style: Style,
    pub prompt_prefix: String,
    pub success_prefix: String,
}

impl Default for AssistTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl AssistTheme {
    pub fn new() -> Self {
        Self {
            prompt_style: Style::new().fg(console::Color::Color256(117)).bold(), // Bright blue
            hint_style: Style::new().fg(console::Color::Color256(242)),
            success_style: Style::new().fg(console::Color::Color256(114)),
            error_style: Style::new().fg(console::Color::Color256(210)),
            prompt_prefix: "? ".to_string(),
            success_prefix: "✓ ".to_string(),
        }
    }
}

impl Theme for AssistTheme {
    fn format_error(&self, f: &mut dyn fmt::Write, err: &str) -> fmt::Result {
        write!(f, "{}", self.error_style.apply_to(err))
    }

    fn format_input_prompt(
        &self,
        f: &mut dyn fmt::Write,
        prompt: &str,
        default: Option<&str>,
    ) -> fmt::Result {
        write!(f, "{}{}", self.prompt_prefix, self.prompt_style.apply_to(prompt))?;
        if let Some(default) = default {
            write!(f, " {}", self.hint_style.apply_to(format!("[{}]", default)))?;
        }
        write!(f, ": ")
    }

    fn format_input_prompt_selection(
        &self,
        f: &mut dyn fmt::Write,
        prompt: &str,
        sel: &str,
    ) -> fmt::Result {
        write!(
            f,
            "{}{}: {}",
            self.success_prefix,
            self.prompt_style.apply_to(prompt),
            self.success_style.apply_to(sel)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_prompt_shows_default() {
        let theme = AssistTheme {
            prompt_style: Style::new(),
            hint_style: Style::new(),
            ..AssistTheme::new()
        };
        let mut out = String::new();
        theme.format_input_prompt(&mut out, "Ticket", Some("CHG-1")).unwrap();
        assert_eq!(out, "? Ticket [CHG-1]: ");
    }
}
