use anyhow::Result;
use rota_core::normalize::{needs_normalization, normalize_routine};
use rota_core::store::{JsonFileStore, RoutineStore};

use crate::cli::MigrateCommand;

/// Rewrites the data file with every legacy `frequency` turned into a rule.
pub fn migrate(store: &JsonFileStore, command: MigrateCommand) -> Result<()> {
    let routines = store.load_raw()?;
    let legacy: Vec<_> = routines.iter().filter(|r| needs_normalization(r)).collect();

    if legacy.is_empty() {
        println!("Nothing to migrate.");
        return Ok(());
    }

    for routine in &legacy {
        println!(
            "  {} ({}): frequency '{}'",
            routine.id,
            routine.title,
            routine.frequency.as_deref().unwrap_or_default()
        );
    }
    let count = legacy.len();

    if command.dry_run {
        println!("{count} routine(s) would be migrated.");
        return Ok(());
    }

    let migrated: Vec<_> = routines.into_iter().map(normalize_routine).collect();
    store.save_all(&migrated)?;
    println!("Migrated {count} routine(s).");
    Ok(())
}
