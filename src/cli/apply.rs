//! Apply command - turn an AI fix or optimization reply into a marked change

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::Path;

use abap_assist::ai::modify::{self, AutoTask, ModificationRequest};
use abap_assist::config::Config;
use abap_assist::markers::ModificationMarker;

use super::mark::resolve_ticket;

pub fn run(
    config: &Config,
    file: &str,
    response: &str,
    optimize: bool,
    ticket: Option<&str>,
    user: Option<&str>,
) -> Result<()> {
    let code = fs::read_to_string(file)
        .with_context(|| format!("Failed to read file: {}", file))?;
    let reply = if response == "-" {
        io::read_to_string(io::stdin()).context("Failed to read the AI reply from stdin")?
    } else {
        fs::read_to_string(response)
            .with_context(|| format!("Failed to read file: {}", response))?
    };

    if ticket.is_none() && !console::user_attended() {
        anyhow::bail!("A ticket number is required for AI modifications (--ticket)");
    }
    let ticket = resolve_ticket(ticket)?
        .context("A ticket number is required for AI modifications (--ticket)")?;

    let marker = ModificationMarker::new(config.markers.templates.clone())
        .with_user(user.or(config.markers.user.as_deref()));
    let file_name = Path::new(file)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());
    let request = ModificationRequest {
        task: if optimize { AutoTask::Optimize } else { AutoTask::Fix },
        code: &code,
        ticket: &ticket,
        file_name: file_name.as_deref(),
    };

    let mut audit = config.audit_log();
    let marked = modify::apply_response(&request, &reply, &marker, audit.as_mut())?;
    println!("{}", marked);

    Ok(())
}
