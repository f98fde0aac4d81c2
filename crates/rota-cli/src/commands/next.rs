use anyhow::{anyhow, Result};
use rota_core::recurrence::RecurrenceEngine;
use rota_core::timezone::{format_with_timezone, next_occurrence_in_timezone, resolve_local};

use crate::cli::NextCommand;
use crate::config::Config;
use crate::parser::parse_when;
use crate::timezone::{now_in, resolve_timezone};
use crate::views::table::format_occurrence;

pub fn next_occurrence(command: NextCommand, config: &Config) -> Result<()> {
    let home = resolve_timezone(&config.default_timezone)?;
    let now = now_in(&home);
    let rule = command.rule.to_rule(now.date())?;
    let due = parse_when(&command.due, now)?;
    let engine = RecurrenceEngine::new(config.projection.engine);

    let Some(zone) = command.timezone.as_deref() else {
        match engine.next_occurrence(Some(due.due_at), &rule) {
            Some(next) => {
                let next = due.with_due_at(next);
                println!(
                    "Next occurrence: {} ({})",
                    format_occurrence(&next),
                    next.due_at.format("%A")
                );
            }
            None => println!("No further occurrence for this rule."),
        }
        return Ok(());
    };

    let tz = resolve_timezone(zone)?;
    let due_utc = resolve_local(&tz, due.due_at)
        .ok_or_else(|| anyhow!("'{}' does not exist in {}", command.due, tz.name()))?;

    match next_occurrence_in_timezone(due_utc, &rule, &tz, &engine) {
        Some(next) => {
            println!(
                "Next occurrence: {}",
                format_with_timezone(next, &tz, "%Y-%m-%d %H:%M %Z (%A)")
            );
            println!("            UTC: {}", next.format("%Y-%m-%dT%H:%M:%SZ"));
        }
        None => println!("No further occurrence for this rule."),
    }
    Ok(())
}
