use anyhow::Result;
use rota_core::recurrence::RecurrenceEngine;

use crate::cli::PreviewCommand;
use crate::config::Config;
use crate::parser::parse_when;
use crate::timezone::{now_in, resolve_timezone};
use crate::views::table::display_preview;

pub fn preview_rule(command: PreviewCommand, config: &Config) -> Result<()> {
    let now = now_in(&resolve_timezone(&config.default_timezone)?);
    let rule = command.rule.to_rule(now.date())?;
    let start = parse_when(&command.from, now)?;

    let occurrences: Vec<_> = RecurrenceEngine::new(config.projection.engine)
        .preview(start.due_at, &rule, command.count)
        .into_iter()
        .map(|due_at| start.with_due_at(due_at))
        .collect();

    display_preview(&occurrences, now);
    if occurrences.len() < command.count && rule.is_recurring() {
        println!("Recurrence ends after {} occurrence(s).", occurrences.len());
    }
    Ok(())
}
