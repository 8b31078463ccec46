//! Prompt command - print the prompt that would be sent for a task

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::fs;
use std::path::Path;

use abap_assist::ai::context::DocumentContextManager;
use abap_assist::ai::documents::DocumentProcessor;
use abap_assist::ai::prompts::{self, TaskKind};
use abap_assist::config::Config;
use abap_assist::core::analysis::CodeAnalysisService;
use abap_assist::core::insights::analyze_insights;

/// Prompt kinds selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PromptTask {
    Explain,
    Optimize,
    Fix,
    ErrorCheck,
    Custom,
    /// Deep review including the static analysis
    Deep,
    Insights,
    /// AI suggestions seeded with static findings
    Suggestions,
    AutoFix,
    AutoOptimize,
}

pub fn run(
    config: &Config,
    task: PromptTask,
    file: &str,
    documents: &[String],
    instruction: Option<&str>,
) -> Result<()> {
    let code = fs::read_to_string(file)
        .with_context(|| format!("Failed to read file: {}", file))?;

    let mut service = CodeAnalysisService::default();
    let model = service.analyze_file(Path::new(file))?;
    let analysis_context = service
        .enhanced_context(&model.file_name)
        .unwrap_or_else(|| model.ai_context());

    let prompt = match task {
        PromptTask::Explain => prompts::assemble(&TaskKind::Explain, &code, &model.summary()),
        PromptTask::Optimize => prompts::assemble(&TaskKind::Optimize, &code, &model.summary()),
        PromptTask::Fix => prompts::assemble(&TaskKind::Fix, &code, &model.summary()),
        PromptTask::ErrorCheck => prompts::assemble(&TaskKind::ErrorCheck, &code, &model.summary()),
        PromptTask::Custom => {
            let instruction = instruction
                .filter(|i| !i.trim().is_empty())
                .context("The custom task needs --instruction")?;
            prompts::assemble(&TaskKind::Custom(instruction.to_string()), &code, &model.summary())
        }
        PromptTask::Deep => prompts::deep_analysis_prompt(&code, &analysis_context),
        PromptTask::Insights => prompts::insights_prompt(&model.file_name, &code, &analysis_context),
        PromptTask::Suggestions => prompts::suggestions_prompt(&code, &analyze_insights(&code)),
        PromptTask::AutoFix => prompts::auto_fix_prompt(&code),
        PromptTask::AutoOptimize => prompts::auto_optimize_prompt(&code),
    };

    if documents.is_empty() {
        println!("{}", prompt);
        return Ok(());
    }

    let extractor = DocumentProcessor::new(config.context.max_document_chars);
    let mut manager = DocumentContextManager::new(config.context_budget());
    for doc in documents {
        manager
            .add_from_path(Path::new(doc), &extractor)
            .with_context(|| format!("Failed to load document: {}", doc))?;
    }

    println!("{}", manager.build_contextual_query(&prompt, None));
    Ok(())
}
