use anyhow::Result;
use rota_core::calendar::CalendarProjector;
use rota_core::models::FilterSet;
use rota_core::store::RoutineStore;
use tracing::debug;

use crate::cli::CalendarCommand;
use crate::config::Config;
use crate::parser::{parse_day, parse_month};
use crate::timezone::{now_in, resolve_timezone};
use crate::views::table::display_day;

/// Command-line filters replace the configured defaults as a whole.
fn active_filters(command: &CalendarCommand, config: &Config) -> FilterSet {
    let given = FilterSet {
        industries: command.industry.clone(),
        categories: command.category.clone(),
        priorities: command.priority.clone(),
    };
    if given.is_empty() {
        config.default_filters.clone()
    } else {
        given
    }
}

pub fn show_calendar(store: &impl RoutineStore, command: CalendarCommand, config: &Config) -> Result<()> {
    let clock_today = now_in(&resolve_timezone(&config.default_timezone)?).date();
    let today = match &command.today {
        Some(raw) => parse_day(raw, clock_today)?,
        None => clock_today,
    };

    let routines = store.load_all()?;
    let filters = active_filters(&command, config);
    let projector = CalendarProjector::new(config.projection);
    debug!(routines = routines.len(), ?filters, %today, "projecting calendar");

    if let Some(month) = &command.month {
        let (first, last) = parse_month(month)?;
        let days = projector.project_range(first, last, &routines, &filters, today);
        if days.is_empty() {
            println!("No routines scheduled in {}.", first.format("%B %Y"));
        }
        for (index, (date, entries)) in days.iter().enumerate() {
            if index > 0 {
                println!();
            }
            display_day(*date, entries, today);
        }
        return Ok(());
    }

    let date = match &command.date {
        Some(raw) => parse_day(raw, today)?,
        None => today,
    };
    let entries = projector.project_date(date, &routines, &filters, today);
    display_day(date, &entries, today);
    Ok(())
}
