use anyhow::Result;
use dialoguer::Confirm;
use rota_core::completion::{apply_completion, complete_routine};
use rota_core::models::CompletionOutcome;
use rota_core::recurrence::RecurrenceEngine;
use rota_core::store::RoutineStore;
use tracing::debug;

use crate::cli::CompleteCommand;
use crate::config::Config;
use crate::util::resolve_routine_index;
use crate::views::table::format_occurrence;

pub fn complete(store: &impl RoutineStore, command: CompleteCommand, config: &Config) -> Result<()> {
    let routines = store.load_all()?;
    let index = resolve_routine_index(&routines, &command.id)?;
    let mut routine = store.find(&routines[index].id)?;

    let outcome = complete_routine(&routine, &RecurrenceEngine::new(config.projection.engine))?;

    match &outcome {
        CompletionOutcome::Rescheduled { previous, next } => {
            apply_completion(&mut routine, &outcome);
            println!(
                "Completed '{}' due {}. Next due {}.",
                routine.title,
                format_occurrence(previous),
                format_occurrence(next)
            );
        }
        CompletionOutcome::Terminated { previous } => {
            if !command.yes {
                let confirmation = Confirm::new()
                    .with_prompt(format!(
                        "'{}' has no further occurrence. Mark it terminated?",
                        routine.title
                    ))
                    .default(false)
                    .interact();

                let confirmation = match confirmation {
                    Ok(answer) => answer,
                    Err(e) => {
                        debug!(error = %e, "confirmation prompt unavailable");
                        println!("Cannot ask for confirmation here; pass --yes to terminate without a prompt.");
                        false
                    }
                };
                if !confirmation {
                    println!("Completion cancelled.");
                    return Ok(());
                }
            }
            apply_completion(&mut routine, &outcome);
            println!(
                "Completed '{}' due {}. No further occurrence; routine terminated.",
                routine.title,
                format_occurrence(previous)
            );
        }
    }

    store.update(&routine)?;
    Ok(())
}
