use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

use crate::error::CoreError;

// ============================================================================
// Routine records
// ============================================================================

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RoutineStatus {
    #[default]
    Active,
    Paused,
    Completed,
    /// The recurrence ran past its end date; no further scheduling.
    Terminated,
    Archived,
}

impl std::fmt::Display for RoutineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutineStatus::Active => write!(f, "active"),
            RoutineStatus::Paused => write!(f, "paused"),
            RoutineStatus::Completed => write!(f, "completed"),
            RoutineStatus::Terminated => write!(f, "terminated"),
            RoutineStatus::Archived => write!(f, "archived"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid routine status: {0}")]
pub struct ParseRoutineStatusError(String);

impl FromStr for RoutineStatus {
    type Err = ParseRoutineStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(RoutineStatus::Active),
            "paused" => Ok(RoutineStatus::Paused),
            "completed" => Ok(RoutineStatus::Completed),
            "terminated" => Ok(RoutineStatus::Terminated),
            "archived" => Ok(RoutineStatus::Archived),
            _ => Err(ParseRoutineStatusError(s.to_string())),
        }
    }
}

/// Variant order is significant: `Ord` ranks `Critical` highest.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum RoutinePriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for RoutinePriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutinePriority::Low => write!(f, "low"),
            RoutinePriority::Medium => write!(f, "medium"),
            RoutinePriority::High => write!(f, "high"),
            RoutinePriority::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid routine priority: {0}")]
pub struct ParseRoutinePriorityError(String);

impl FromStr for RoutinePriority {
    type Err = ParseRoutinePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(RoutinePriority::Low),
            "medium" => Ok(RoutinePriority::Medium),
            "high" => Ok(RoutinePriority::High),
            "critical" => Ok(RoutinePriority::Critical),
            _ => Err(ParseRoutinePriorityError(s.to_string())),
        }
    }
}

/// A routine as stored by the entity API.
///
/// Only the fields the recurrence core reads are typed. Everything else the
/// record carries is kept in `extra` so a load/save cycle never drops keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: RoutineStatus,
    #[serde(default)]
    pub priority: RoutinePriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// Routine type shown in the UI (inspection, audit, checklist, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Stored due value, kept verbatim. Parsed lazily via [`Routine::scheduled`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceRule>,
    /// Legacy free-text recurrence, superseded by `recurrence`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    /// IANA timezone the routine's wall-clock times are expressed in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Routine {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: RoutineStatus::Active,
            priority: RoutinePriority::Medium,
            industry: None,
            category: None,
            due_date: None,
            recurrence: None,
            frequency: None,
            timezone: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Parses the stored due value.
    ///
    /// `Ok(None)` means the routine simply has no due date; `Err` means the
    /// stored value is corrupt.
    pub fn scheduled(&self) -> Result<Option<ScheduledOccurrence>, CoreError> {
        match self.due_date.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => ScheduledOccurrence::parse(raw).map(Some),
        }
    }

    pub fn rule(&self) -> Option<&RecurrenceRule> {
        self.recurrence.as_ref()
    }

    /// True when the routine carries a rule that can produce further occurrences.
    pub fn recurs(&self) -> bool {
        self.rule().is_some_and(RecurrenceRule::is_recurring)
    }

    pub fn is_active(&self) -> bool {
        self.status == RoutineStatus::Active
    }

    /// The routine's own timezone. An unknown zone name is logged and
    /// ignored, leaving the routine on its stored offset.
    pub fn zone(&self) -> Option<Tz> {
        let name = self.timezone.as_deref().map(str::trim).filter(|n| !n.is_empty())?;
        match name.parse::<Tz>() {
            Ok(tz) => Some(tz),
            Err(_) => {
                warn!(routine_id = %self.id, timezone = name, "ignoring unknown routine timezone");
                None
            }
        }
    }
}

// ============================================================================
// Scheduled occurrences
// ============================================================================

/// A point-in-time due value carried on a routine record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledOccurrence {
    /// Wall-clock due time. All-day occurrences sit at midnight.
    pub due_at: NaiveDateTime,
    /// The stored value had no time-of-day component.
    pub all_day: bool,
    /// UTC offset written on the stored value, if any.
    pub offset: Option<FixedOffset>,
}

const TIMED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

impl ScheduledOccurrence {
    pub fn timed(due_at: NaiveDateTime) -> Self {
        Self { due_at, all_day: false, offset: None }
    }

    pub fn all_day(date: NaiveDate) -> Self {
        Self {
            due_at: date.and_time(chrono::NaiveTime::MIN),
            all_day: true,
            offset: None,
        }
    }

    /// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS[.fff]]` (also with a space
    /// separator) and RFC 3339 timestamps. Offsets are kept so the value can
    /// be written back the way it was read.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let raw = raw.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Self {
                due_at: dt.naive_local(),
                all_day: false,
                offset: Some(*dt.offset()),
            });
        }

        for format in TIMED_FORMATS {
            if let Ok(due_at) = NaiveDateTime::parse_from_str(raw, format) {
                return Ok(Self::timed(due_at));
            }
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Self::all_day)
            .map_err(|_| CoreError::InvalidDueDate(raw.to_string()))
    }

    pub fn date(&self) -> NaiveDate {
        self.due_at.date()
    }

    /// Carries the format of this occurrence over to a newly computed time.
    pub fn with_due_at(&self, due_at: NaiveDateTime) -> Self {
        Self { due_at, ..*self }
    }

    /// Renders the value in the same shape it was parsed from.
    pub fn to_stored(&self) -> String {
        if self.all_day {
            return self.due_at.format("%Y-%m-%d").to_string();
        }
        match self.offset.and_then(|o| o.from_local_datetime(&self.due_at).single()) {
            Some(dt) => dt.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true),
            None => self.due_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }
}

// ============================================================================
// Recurrence rules
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum RecurrenceType {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    /// A stored type this version does not know. Treated as non-recurring
    /// but written back unchanged.
    Unknown(String),
}

impl RecurrenceType {
    pub fn as_str(&self) -> &str {
        match self {
            RecurrenceType::None => "none",
            RecurrenceType::Daily => "daily",
            RecurrenceType::Weekly => "weekly",
            RecurrenceType::Monthly => "monthly",
            RecurrenceType::Unknown(other) => other,
        }
    }
}

impl std::fmt::Display for RecurrenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for RecurrenceType {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => RecurrenceType::None,
            "daily" => RecurrenceType::Daily,
            "weekly" => RecurrenceType::Weekly,
            "monthly" => RecurrenceType::Monthly,
            _ => RecurrenceType::Unknown(s.to_string()),
        }
    }
}

impl Serialize for RecurrenceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecurrenceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(raw) => RecurrenceType::from(raw.as_str()),
            Value::Null => RecurrenceType::None,
            other => RecurrenceType::Unknown(other.to_string()),
        })
    }
}

/// How a routine repeats. Field names are the persisted contract and must
/// round-trip unchanged through storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    #[serde(rename = "type", default)]
    pub kind: RecurrenceType,
    #[serde(default = "default_interval", deserialize_with = "deserialize_interval")]
    pub interval: u32,
    /// 0 = Sunday .. 6 = Saturday.
    #[serde(default, deserialize_with = "deserialize_days_of_week")]
    pub days_of_week: Vec<u8>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_day_of_month"
    )]
    pub day_of_month: Option<u32>,
    /// Last day (inclusive) on which an occurrence may fall.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_end_date"
    )]
    pub end_date: Option<NaiveDate>,
}

fn default_interval() -> u32 {
    1
}

// Rule fields are read leniently: a record written by a buggy client must not
// fail the whole routine file. Anything unusable falls back to its default.

fn deserialize_interval<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw.as_u64() {
        Some(interval) => u32::try_from(interval).unwrap_or(u32::MAX),
        None => {
            if !raw.is_null() {
                warn!(interval = %raw, "ignoring unusable interval");
            }
            default_interval()
        }
    })
}

/// Keeps only the entries that are weekday numbers in 0..=6.
fn deserialize_days_of_week<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<u8>, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    let Value::Array(entries) = raw else {
        if !raw.is_null() {
            warn!(days_of_week = %raw, "ignoring unusable daysOfWeek");
        }
        return Ok(Vec::new());
    };
    Ok(entries
        .iter()
        .filter_map(Value::as_u64)
        .filter(|day| *day <= 6)
        .filter_map(|day| u8::try_from(day).ok())
        .collect())
}

fn deserialize_day_of_month<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u32>, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    let day = raw.as_u64().and_then(|day| u32::try_from(day).ok());
    if day.is_none() && !raw.is_null() {
        warn!(day_of_month = %raw, "ignoring unusable dayOfMonth");
    }
    Ok(day)
}

/// End dates are written either as plain dates or as full timestamps by
/// older clients; only the date part matters. An unreadable end date is
/// dropped, so the rule runs open-ended.
fn deserialize_end_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    let text = match &raw {
        Value::String(text) if !text.trim().is_empty() => text.trim(),
        Value::Null | Value::String(_) => return Ok(None),
        _ => {
            warn!(end_date = %raw, "ignoring unusable endDate");
            return Ok(None);
        }
    };
    let date = text
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok());
    if date.is_none() {
        warn!(end_date = text, "ignoring unparseable endDate");
    }
    Ok(date)
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        Self {
            kind: RecurrenceType::None,
            interval: 1,
            days_of_week: Vec::new(),
            day_of_month: None,
            end_date: None,
        }
    }
}

impl RecurrenceRule {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn daily(interval: u32) -> Self {
        Self { kind: RecurrenceType::Daily, interval, ..Self::default() }
    }

    pub fn weekly(interval: u32, days_of_week: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: RecurrenceType::Weekly,
            interval,
            days_of_week: days_of_week.into(),
            ..Self::default()
        }
    }

    pub fn monthly(interval: u32, day_of_month: Option<u32>) -> Self {
        Self {
            kind: RecurrenceType::Monthly,
            interval,
            day_of_month,
            ..Self::default()
        }
    }

    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn is_recurring(&self) -> bool {
        matches!(
            self.kind,
            RecurrenceType::Daily | RecurrenceType::Weekly | RecurrenceType::Monthly
        )
    }

    /// Interval as used by the engine; a stored 0 counts as 1.
    pub fn effective_interval(&self) -> u32 {
        self.interval.max(1)
    }

    /// Configured weekdays, in range, sorted and deduplicated.
    pub fn weekdays(&self) -> Vec<u8> {
        let mut days: Vec<u8> = self.days_of_week.iter().copied().filter(|d| *d <= 6).collect();
        days.sort_unstable();
        days.dedup();
        days
    }

    /// Configured day of month, if it is in 1..=31.
    pub fn month_day(&self) -> Option<u32> {
        self.day_of_month.filter(|d| (1..=31).contains(d))
    }

    /// Strict validation for rules entered by a user. The engine itself
    /// never rejects a rule; it ignores what it cannot use.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let RecurrenceType::Unknown(kind) = &self.kind {
            return Err(CoreError::InvalidRule(format!("unknown recurrence type '{kind}'")));
        }
        if self.interval == 0 {
            return Err(CoreError::InvalidRule("interval must be at least 1".to_string()));
        }
        if let Some(day) = self.days_of_week.iter().find(|d| **d > 6) {
            return Err(CoreError::InvalidRule(format!(
                "day of week {day} is out of range (0 = Sunday .. 6 = Saturday)"
            )));
        }
        if let Some(day) = self.day_of_month.filter(|d| !(1..=31).contains(d)) {
            return Err(CoreError::InvalidRule(format!(
                "day of month {day} is out of range (1..=31)"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Filtering and completion
// ============================================================================

/// Calendar filter bar state. An empty list places no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSet {
    pub industries: Vec<String>,
    pub categories: Vec<String>,
    pub priorities: Vec<RoutinePriority>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.industries.is_empty() && self.categories.is_empty() && self.priorities.is_empty()
    }

    pub fn matches(&self, routine: &Routine) -> bool {
        fn matches_any(wanted: &[String], value: Option<&str>) -> bool {
            wanted.is_empty()
                || value.is_some_and(|v| wanted.iter().any(|w| w.eq_ignore_ascii_case(v)))
        }

        matches_any(&self.industries, routine.industry.as_deref())
            && matches_any(&self.categories, routine.category.as_deref())
            && (self.priorities.is_empty() || self.priorities.contains(&routine.priority))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The routine stays active with a new stored due value.
    Rescheduled {
        previous: ScheduledOccurrence,
        next: ScheduledOccurrence,
    },
    /// The rule has no further occurrence; the routine stops scheduling.
    Terminated { previous: ScheduledOccurrence },
}
