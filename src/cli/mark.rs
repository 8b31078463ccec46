//! Mark command - wrap code changes in SAP modification markers

use anyhow::{Context, Result};
use dialoguer::Input;
use std::fs;
use std::path::Path;
use tracing::warn;

use abap_assist::config::Config;
use abap_assist::markers::{ModificationMarker, TicketNumber};

use crate::ui::AssistTheme;

pub fn run(
    config: &Config,
    file: &str,
    new_file: Option<&str>,
    ticket: Option<&str>,
    user: Option<&str>,
) -> Result<()> {
    let code = fs::read_to_string(file)
        .with_context(|| format!("Failed to read file: {}", file))?;
    let new_code = match new_file {
        Some(p) => Some(
            fs::read_to_string(p).with_context(|| format!("Failed to read file: {}", p))?,
        ),
        None => None,
    };

    let ticket = resolve_ticket(ticket)?;
    let marker = ModificationMarker::new(config.markers.templates.clone())
        .with_user(user.or(config.markers.user.as_deref()));

    let (kind, original, block) = match &new_code {
        Some(new_code) => (
            "MARK_MODIFICATION",
            code.as_str(),
            marker.wrap_modification(&code, new_code, ticket.as_ref()),
        ),
        None => ("MARK_INSERTION", "", marker.wrap_insertion(&code, ticket.as_ref())),
    };

    println!("{}", block);

    if let Some(mut audit) = config.audit_log() {
        let file_name = Path::new(file)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        audit.record_with_ticket(
            kind,
            original,
            &block,
            file_name.as_deref(),
            ticket.as_ref(),
            marker.user(),
        );
    }

    Ok(())
}

/// Validate the ticket argument, asking again on a terminal
pub(crate) fn resolve_ticket(arg: Option<&str>) -> Result<Option<TicketNumber>> {
    let parsed = arg.map(TicketNumber::parse);

    match parsed {
        Some(Ok(ticket)) => Ok(Some(ticket)),
        _ if console::user_attended() => prompt_ticket(arg).map(Some),
        Some(Err(e)) => Err(e.into()),
        None => {
            warn!("No ticket number given, markers will read UNKNOWN");
            Ok(None)
        }
    }
}

fn prompt_ticket(initial: Option<&str>) -> Result<TicketNumber> {
    let theme = AssistTheme::new();
    let mut input = Input::<String>::with_theme(&theme)
        .with_prompt("Ticket number (e.g. CHG-4567)")
        .validate_with(|value: &String| -> Result<(), String> {
            TicketNumber::parse(value).map(|_| ()).map_err(|e| e.to_string())
        });

    if let Some(initial) = initial {
        input = input.with_initial_text(initial);
    }

    let value = input.interact_text().context("Ticket input cancelled")?;
    Ok(TicketNumber::parse(&value)?)
}
