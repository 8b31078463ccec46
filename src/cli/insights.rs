//! Insights command - static ABAP pattern report

use anyhow::{Context, Result};
use std::fs;

use abap_assist::core::insights::analyze_insights;

mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const PRIMARY: &str = "\x1b[38;2;100;181;246m";
    pub const SUCCESS: &str = "\x1b[38;2;165;214;167m";
    pub const MUTED: &str = "\x1b[38;2;84;110;122m";
}

pub fn run(file: &str) -> Result<()> {
    let code = fs::read_to_string(file)
        .with_context(|| format!("Failed to read file: {}", file))?;

    let report = analyze_insights(&code);

    println!();
    println!(
        "{}{}  Insights: {}{}",
        colors::PRIMARY, colors::BOLD, file, colors::RESET
    );
    println!("{}  ╰{}─{}", colors::MUTED, "─".repeat(50), colors::RESET);
    println!();

    if report.is_empty() {
        println!("{}  No findings{}", colors::SUCCESS, colors::RESET);
    } else {
        print!("{}", report.summary_report());
    }

    Ok(())
}
