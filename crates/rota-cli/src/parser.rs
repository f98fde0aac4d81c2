use anyhow::{anyhow, bail, Result};
use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_english::{parse_date_string, Dialect};
use rota_core::models::{RecurrenceRule, ScheduledOccurrence};

use crate::cli::{Frequency, RuleArgs};

/// Parses a due value: the stored formats first, then English phrases
/// ("tomorrow 9am", "next friday") relative to `now`.
pub fn parse_when(input: &str, now: NaiveDateTime) -> Result<ScheduledOccurrence> {
    if let Ok(occurrence) = ScheduledOccurrence::parse(input) {
        return Ok(occurrence);
    }

    // Naive wall clock dressed as UTC so chrono-english applies no shift.
    parse_date_string(input, Utc.from_utc_datetime(&now), Dialect::Us)
        .map(|dt| ScheduledOccurrence::timed(dt.naive_utc()))
        .map_err(|e| anyhow!("Failed to parse due date '{}': {}", input, e))
}

/// Parses a calendar date, accepting the same English phrases as [`parse_when`].
pub fn parse_day(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d") {
        return Ok(date);
    }
    parse_when(input, today.and_time(chrono::NaiveTime::MIN)).map(|occurrence| occurrence.date())
}

/// Parses `YYYY-MM` into the first and last day of that month.
pub fn parse_month(input: &str) -> Result<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", input.trim()), "%Y-%m-%d")
        .map_err(|_| anyhow!("Invalid month '{}', expected YYYY-MM", input))?;
    let last = first
        .checked_add_months(chrono::Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| anyhow!("Month '{}' is out of range", input))?;
    Ok((first, last))
}

/// Parses a comma-separated weekday list into 0 = Sunday numbers.
pub fn parse_weekdays(input: &str) -> Result<Vec<u8>> {
    let mut days = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let day = match part.to_lowercase().as_str() {
            "sun" | "sunday" | "0" => 0,
            "mon" | "monday" | "1" => 1,
            "tue" | "tues" | "tuesday" | "2" => 2,
            "wed" | "wednesday" | "3" => 3,
            "thu" | "thurs" | "thursday" | "4" => 4,
            "fri" | "friday" | "5" => 5,
            "sat" | "saturday" | "6" => 6,
            _ => bail!("Unknown weekday '{}'", part),
        };
        if !days.contains(&day) {
            days.push(day);
        }
    }
    if days.is_empty() {
        bail!("No weekdays given in '{}'", input);
    }
    days.sort_unstable();
    Ok(days)
}

impl RuleArgs {
    /// Builds and validates the rule described by the flags.
    pub fn to_rule(&self, today: NaiveDate) -> Result<RecurrenceRule> {
        if self.on.is_some() && !matches!(self.every, Frequency::Weekly) {
            bail!("--on only applies to --every weekly");
        }
        if self.day_of_month.is_some()
            && !matches!(self.every, Frequency::Monthly | Frequency::Quarterly | Frequency::Yearly)
        {
            bail!("--day-of-month only applies to monthly recurrence");
        }

        let mut rule = self.every.to_rule(self.interval);
        if let Some(on) = &self.on {
            rule.days_of_week = parse_weekdays(on)?;
        }
        if let Some(day) = self.day_of_month {
            rule.day_of_month = Some(day);
        }
        if let Some(until) = &self.until {
            rule = rule.until(parse_day(until, today)?);
        }

        rule.validate()?;
        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_core::models::RecurrenceType;
    use rstest::rstest;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap()
    }

    fn rule_args(every: Frequency) -> RuleArgs {
        RuleArgs {
            every,
            interval: 1,
            on: None,
            day_of_month: None,
            until: None,
        }
    }

    #[test]
    fn test_parse_when_prefers_stored_formats() {
        let all_day = parse_when("2024-03-05", now()).unwrap();
        assert!(all_day.all_day);
        assert_eq!(all_day.to_stored(), "2024-03-05");

        let timed = parse_when("2024-03-05T09:15", now()).unwrap();
        assert!(!timed.all_day);
        assert_eq!(timed.due_at.to_string(), "2024-03-05 09:15:00");
    }

    #[test]
    fn test_parse_when_english_is_relative_to_now() {
        let parsed = parse_when("tomorrow", now()).unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }

    #[test]
    fn test_parse_when_rejects_garbage() {
        assert!(parse_when("blorp-17", now()).is_err());
    }

    #[test]
    fn test_parse_month() {
        let (first, last) = parse_month("2024-02").unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("March").is_err());
    }

    #[rstest]
    #[case("mon,wed,fri", vec![1, 3, 5])]
    #[case("Sat, sun", vec![0, 6])]
    #[case("4,thu,1", vec![1, 4])]
    fn test_parse_weekdays(#[case] input: &str, #[case] expected: Vec<u8>) {
        assert_eq!(parse_weekdays(input).unwrap(), expected);
    }

    #[rstest]
    #[case("funday")]
    #[case("7")]
    #[case(" , ")]
    fn test_parse_weekdays_rejects(#[case] input: &str) {
        assert!(parse_weekdays(input).is_err());
    }

    #[test]
    fn test_rule_args_build_weekly_rule() {
        let mut args = rule_args(Frequency::Weekly);
        args.interval = 2;
        args.on = Some("mon,thu".to_string());
        args.until = Some("2024-12-31".to_string());

        let rule = args.to_rule(now().date()).unwrap();
        assert_eq!(rule.kind, RecurrenceType::Weekly);
        assert_eq!(rule.interval, 2);
        assert_eq!(rule.days_of_week, vec![1, 4]);
        assert_eq!(rule.end_date, NaiveDate::from_ymd_opt(2024, 12, 31));
    }

    #[test]
    fn test_rule_args_shortcuts() {
        let rule = rule_args(Frequency::Quarterly).to_rule(now().date()).unwrap();
        assert_eq!(rule.kind, RecurrenceType::Monthly);
        assert_eq!(rule.interval, 3);

        let rule = rule_args(Frequency::Weekdays).to_rule(now().date()).unwrap();
        assert_eq!(rule.days_of_week, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_rule_args_reject_mismatched_flags() {
        let mut args = rule_args(Frequency::Daily);
        args.on = Some("mon".to_string());
        assert!(args.to_rule(now().date()).is_err());

        let mut args = rule_args(Frequency::Weekly);
        args.day_of_month = Some(15);
        assert!(args.to_rule(now().date()).is_err());

        let mut args = rule_args(Frequency::Monthly);
        args.day_of_month = Some(32);
        assert!(args.to_rule(now().date()).is_err());
    }
}
