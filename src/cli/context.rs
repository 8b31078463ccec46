//! Context command - preview the document context for AI prompts

use anyhow::Result;
use std::path::Path;

use abap_assist::ai::context::DocumentContextManager;
use abap_assist::ai::documents::DocumentProcessor;
use abap_assist::config::Config;

mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const ERROR: &str = "\x1b[38;2;239;154;154m";
}

pub fn run(config: &Config, documents: &[String], disabled: &[String]) -> Result<()> {
    let extractor = DocumentProcessor::new(config.context.max_document_chars);
    let mut manager = DocumentContextManager::new(config.context_budget());

    for doc in documents {
        if let Err(e) = manager.add_from_path(Path::new(doc), &extractor) {
            print_error(&e.to_string());
        }
    }
    for doc in disabled {
        manager.set_enabled(doc, false);
    }

    println!("{}", manager.summary());
    if manager.has_context() {
        println!();
        print!("{}", manager.build_context());
    }

    Ok(())
}

fn print_error(message: &str) {
    eprintln!("{}  Error: {}{}", colors::ERROR, message, colors::RESET);
}
