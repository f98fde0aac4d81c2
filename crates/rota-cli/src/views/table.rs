use chrono::{NaiveDate, NaiveDateTime};
use chrono_humanize::HumanTime;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use rota_core::calendar::CalendarEntry;
use rota_core::models::{RoutinePriority, ScheduledOccurrence};

fn priority_cell(priority: RoutinePriority) -> Cell {
    let cell = Cell::new(priority);
    match priority {
        RoutinePriority::Critical => cell.fg(Color::Red).add_attribute(Attribute::Bold),
        RoutinePriority::High => cell.fg(Color::Red),
        RoutinePriority::Medium => cell.fg(Color::Yellow),
        RoutinePriority::Low => cell.fg(Color::Green),
    }
}

/// Renders one calendar day. Entries are expected in display order.
pub fn display_day(date: NaiveDate, entries: &[CalendarEntry<'_>], today: NaiveDate) {
    println!("{}", date.format("%A, %B %-d, %Y"));

    if entries.is_empty() {
        println!("No routines scheduled.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Time", "ID", "Routine", "Priority", "Industry", "Type"]);

    for entry in entries {
        let routine = entry.routine;
        let mut row = Row::new();

        row.add_cell(Cell::new(if entry.occurrence.all_day {
            "All day".to_string()
        } else {
            entry.due_at().format("%H:%M").to_string()
        }));
        row.add_cell(Cell::new(&routine.id));

        let mut title = String::new();
        if entry.is_projected {
            title.push_str("↻ ");
        }
        title.push_str(&routine.title);

        let overdue = !entry.is_projected && entry.occurrence.date() < today;
        let title_cell = if overdue {
            title.push_str(" (overdue)");
            Cell::new(title).fg(Color::Red)
        } else if entry.is_projected {
            Cell::new(title).fg(Color::DarkGrey)
        } else {
            Cell::new(title)
        };
        row.add_cell(title_cell);

        row.add_cell(priority_cell(routine.priority));
        row.add_cell(Cell::new(routine.industry.as_deref().unwrap_or("-")));
        row.add_cell(Cell::new(routine.category.as_deref().unwrap_or("-")));
        table.add_row(row);
    }

    println!("{table}");
}

/// Renders upcoming occurrences with their distance from `now`.
pub fn display_preview(occurrences: &[ScheduledOccurrence], now: NaiveDateTime) {
    if occurrences.is_empty() {
        println!("No upcoming occurrences.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Date", "Day", "When"]);

    for (index, occurrence) in occurrences.iter().enumerate() {
        let mut row = Row::new();
        row.add_cell(Cell::new(index + 1));
        row.add_cell(Cell::new(format_occurrence(occurrence)));
        row.add_cell(Cell::new(occurrence.due_at.format("%A")));
        row.add_cell(Cell::new(HumanTime::from(occurrence.due_at - now)));
        table.add_row(row);
    }

    println!("{table}");
}

/// `2024-03-02` for all-day values, `2024-03-02 09:00` otherwise.
pub fn format_occurrence(occurrence: &ScheduledOccurrence) -> String {
    if occurrence.all_day {
        occurrence.due_at.format("%Y-%m-%d").to_string()
    } else {
        occurrence.due_at.format("%Y-%m-%d %H:%M").to_string()
    }
}
