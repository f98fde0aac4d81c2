use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rota_core::models::{RecurrenceRule, RoutinePriority};

/// Schedule, project and complete recurring operational routines
#[derive(Parser, Debug)]
#[command(name = "rota", author, version, about, long_about = None)]
pub struct Cli {
    /// Routine data file (overrides the configured one)
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compute the next occurrence of a recurrence rule
    Next(NextCommand),
    /// Show upcoming occurrences of a recurrence rule
    Preview(PreviewCommand),
    /// Show routines occurring on a date or across a month
    Calendar(CalendarCommand),
    /// Complete a routine's current occurrence and reschedule it
    Complete(CompleteCommand),
    /// Rewrite legacy `frequency` fields as structured recurrence rules
    Migrate(MigrateCommand),
}

/// Human-friendly recurrence patterns
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    /// No recurrence
    None,
    /// Every day
    Daily,
    /// Every week (same day unless --on is given)
    Weekly,
    /// Every month (same date unless --day-of-month is given)
    Monthly,
    /// Every three months
    Quarterly,
    /// Every twelve months
    Yearly,
    /// Monday to Friday
    Weekdays,
    /// Saturday and Sunday
    Weekends,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::None => write!(f, "none"),
            Frequency::Daily => write!(f, "daily"),
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::Monthly => write!(f, "monthly"),
            Frequency::Quarterly => write!(f, "quarterly"),
            Frequency::Yearly => write!(f, "yearly"),
            Frequency::Weekdays => write!(f, "weekdays"),
            Frequency::Weekends => write!(f, "weekends"),
        }
    }
}

impl Frequency {
    /// Base rule for the shortcut; `interval` multiplies its natural period.
    pub fn to_rule(self, interval: u32) -> RecurrenceRule {
        match self {
            Frequency::None => RecurrenceRule::none(),
            Frequency::Daily => RecurrenceRule::daily(interval),
            Frequency::Weekly => RecurrenceRule::weekly(interval, vec![]),
            Frequency::Monthly => RecurrenceRule::monthly(interval, None),
            Frequency::Quarterly => RecurrenceRule::monthly(interval.saturating_mul(3), None),
            Frequency::Yearly => RecurrenceRule::monthly(interval.saturating_mul(12), None),
            Frequency::Weekdays => RecurrenceRule::weekly(interval, vec![1, 2, 3, 4, 5]),
            Frequency::Weekends => RecurrenceRule::weekly(interval, vec![0, 6]),
        }
    }
}

/// Recurrence rule flags shared by `next` and `preview`
#[derive(Args, Debug, Clone)]
pub struct RuleArgs {
    /// How often the routine repeats
    #[arg(long, value_enum)]
    pub every: Frequency,
    /// Repeat every N periods
    #[arg(long, default_value_t = 1)]
    pub interval: u32,
    /// Days of week for weekly recurrence
    #[arg(long, help = "Days of week (sun,mon,tue,wed,thu,fri,sat or 0-6)")]
    pub on: Option<String>,
    /// Day of month for monthly recurrence
    #[arg(long)]
    pub day_of_month: Option<u32>,
    /// Last day an occurrence may fall on
    #[arg(long, help = "End date for recurrence (e.g., '2025-12-31')")]
    pub until: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct NextCommand {
    /// Current due date and time
    #[arg(long, help = "Current due time (e.g., '2024-03-01T09:00', 'tomorrow 9am')")]
    pub due: String,
    #[command(flatten)]
    pub rule: RuleArgs,
    /// Evaluate the rule on this timezone's wall clock
    #[arg(long, help = "Timezone for recurrence (IANA format, e.g., 'America/New_York')")]
    pub timezone: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct PreviewCommand {
    /// Occurrence to start from (not included)
    #[arg(long)]
    pub from: String,
    #[command(flatten)]
    pub rule: RuleArgs,
    /// Number of occurrences to show
    #[arg(long, default_value_t = 5)]
    pub count: usize,
}

#[derive(Parser, Debug, Clone)]
pub struct CalendarCommand {
    /// Date to show (defaults to today)
    #[arg(long, conflicts_with = "month")]
    pub date: Option<String>,
    /// Month to show (YYYY-MM)
    #[arg(long)]
    pub month: Option<String>,
    /// Only show routines from these industries
    #[arg(long, num_args = 1..)]
    pub industry: Vec<String>,
    /// Only show routines of these types
    #[arg(long, num_args = 1..)]
    pub category: Vec<String>,
    /// Only show routines with these priorities
    #[arg(long, num_args = 1..)]
    pub priority: Vec<RoutinePriority>,
    /// Treat this date as today when deciding what is overdue
    #[arg(long)]
    pub today: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompleteCommand {
    /// The ID (or unique ID prefix) of the routine to complete
    pub id: String,
    /// Terminate without confirmation when the recurrence has ended
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct MigrateCommand {
    /// List affected routines without writing the file
    #[arg(long)]
    pub dry_run: bool,
}
