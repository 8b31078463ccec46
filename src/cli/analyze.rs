//! Analyze command - static analysis of ABAP files and directories

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::warn;

use abap_assist::config::Config;
use abap_assist::core::analysis::CodeAnalysisService;
use abap_assist::core::cache::ContextCache;
use abap_assist::core::model::CodeContextModel;

mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const PRIMARY: &str = "\x1b[38;2;100;181;246m";
    pub const SUCCESS: &str = "\x1b[38;2;165;214;167m";
    pub const MUTED: &str = "\x1b[38;2;84;110;122m";
    pub const FG: &str = "\x1b[38;2;212;212;215m";
}

pub fn run(config: &Config, target: &str, json: bool) -> Result<()> {
    let path = Path::new(target);
    if !path.exists() {
        anyhow::bail!("Path not found: {}", target);
    }

    let mut service = CodeAnalysisService::new(ContextCache::new(config.cache_limit()))
        .with_extensions(&config.analysis.extensions);

    if path.is_file() {
        let model = service.analyze_file(path)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&model).context("Failed to serialize analysis")?);
        } else {
            print_header(target);
            print_model(&model);
            if let Some(details) = service.enhanced_context(&model.file_name) {
                print_block(&details);
            }
        }
        return Ok(());
    }

    let files = service.collect_files(path)?;
    let pb = create_progress_bar(files.len() as u64)?;
    let mut models = Vec::with_capacity(files.len());

    for file in &files {
        pb.set_message(file.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default());
        match service.analyze_file(file) {
            Ok(model) => models.push(model),
            Err(e) => warn!("Skipping {}: {:#}", file.display(), e),
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&models).context("Failed to serialize analysis")?);
        return Ok(());
    }

    print_header(target);
    for model in &models {
        print_model(model);
    }
    println!(
        "{}  {} files analyzed, {} cached{}",
        colors::SUCCESS,
        models.len(),
        service.cache().len(),
        colors::RESET
    );

    Ok(())
}

fn create_progress_bar(total: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(total);

    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.cyan} {prefix:.bold} [{bar:40.cyan/dim}] {pos}/{len} {msg:.dim}")
        .context("Invalid progress template")?
        .progress_chars("█▓░"));

    pb.set_prefix("Analyzing");
    Ok(pb)
}

fn print_header(target: &str) {
    println!();
    println!(
        "{}{}  Analysis: {}{}",
        colors::PRIMARY, colors::BOLD, target, colors::RESET
    );
    println!("{}  ╰{}─{}", colors::MUTED, "─".repeat(50), colors::RESET);
}

fn print_model(model: &CodeContextModel) {
    println!();
    for line in model.summary().lines() {
        println!("{}  │ {}{}", colors::MUTED, colors::FG, line);
    }
    let critical = model.critical_dependencies();
    if !critical.is_empty() {
        let names: Vec<&str> = critical.iter().map(|d| d.name.as_str()).collect();
        println!("{}  │ Critical: {}{}", colors::MUTED, names.join(", "), colors::RESET);
    }
    print!("{}", colors::RESET);
}

fn print_block(text: &str) {
    println!();
    for line in text.lines() {
        println!("{}  │ {}{}", colors::MUTED, colors::FG, line);
    }
    println!("{}  ╰{}─{}", colors::MUTED, "─".repeat(50), colors::RESET);
}
