use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use proptest::test_runner::Config;
use rota_core::models::{RecurrenceRule, RecurrenceType};
use rota_core::recurrence::{EngineOptions, MonthOverflow, RecurrenceEngine, WeekStart};

fn due_at() -> impl Strategy<Value = NaiveDateTime> {
    (0_i64..20_000, 0_u32..86_400).prop_map(|(days, secs)| {
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
            + Duration::days(days)
            + Duration::seconds(i64::from(secs))
    })
}

fn recurring_rule() -> impl Strategy<Value = RecurrenceRule> {
    prop_oneof![
        (1_u32..30).prop_map(RecurrenceRule::daily),
        (1_u32..6, prop::collection::vec(0_u8..7, 0..7))
            .prop_map(|(interval, days)| RecurrenceRule::weekly(interval, days)),
        (1_u32..25, prop::option::of(1_u32..32))
            .prop_map(|(interval, day)| RecurrenceRule::monthly(interval, day)),
    ]
}

fn engines() -> impl Strategy<Value = RecurrenceEngine> {
    (
        prop_oneof![Just(WeekStart::Sunday), Just(WeekStart::Monday)],
        prop_oneof![Just(MonthOverflow::Clamp), Just(MonthOverflow::Roll)],
    )
        .prop_map(|(week_start, month_overflow)| {
            RecurrenceEngine::new(EngineOptions { week_start, month_overflow })
        })
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn next_is_strictly_later_and_keeps_time(due in due_at(), rule in recurring_rule(), engine in engines()) {
        let next = engine.next_occurrence(Some(due), &rule);
        prop_assert!(next.is_some());
        let next = next.unwrap();
        prop_assert!(next > due);
        prop_assert_eq!(next.time(), due.time());
    }

    #[test]
    fn next_is_deterministic(due in due_at(), rule in recurring_rule(), engine in engines()) {
        prop_assert_eq!(engine.next_occurrence(Some(due), &rule), engine.next_occurrence(Some(due), &rule));
    }

    #[test]
    fn none_rule_never_recurs(due in due_at(), engine in engines()) {
        prop_assert_eq!(engine.next_occurrence(Some(due), &RecurrenceRule::none()), None);
    }

    #[test]
    fn end_date_boundary_is_inclusive(due in due_at(), rule in recurring_rule(), engine in engines()) {
        let natural = engine.next_occurrence(Some(due), &rule).unwrap();

        let on_day = rule.clone().until(natural.date());
        prop_assert_eq!(engine.next_occurrence(Some(due), &on_day), Some(natural));

        let day_before = rule.until(natural.date() - Duration::days(1));
        prop_assert_eq!(engine.next_occurrence(Some(due), &day_before), None);
    }

    #[test]
    fn weekly_lands_on_configured_day_within_interval(
        due in due_at(),
        interval in 1_u32..6,
        days in prop::collection::vec(0_u8..7, 1..7),
        engine in engines(),
    ) {
        let rule = RecurrenceRule::weekly(interval, days.clone());
        let next = engine.next_occurrence(Some(due), &rule).unwrap();
        let weekday = next.weekday().num_days_from_sunday() as u8;
        prop_assert!(days.contains(&weekday));
        prop_assert!(next - due <= Duration::weeks(i64::from(interval) + 1));
    }

    #[test]
    fn monthly_with_day_lands_on_that_day_or_month_end(
        due in due_at(),
        interval in 1_u32..25,
        day in 1_u32..32,
    ) {
        let rule = RecurrenceRule::monthly(interval, Some(day));
        let next = RecurrenceEngine::default().next_occurrence(Some(due), &rule).unwrap();
        let months = (next.year() - due.year()) * 12 + next.month() as i32 - due.month() as i32;
        prop_assert_eq!(months, interval as i32);
        if next.day() != day {
            prop_assert!(next.day() < day);
            prop_assert!(next.date().succ_opt().unwrap().day() == 1);
        }
    }

    #[test]
    fn occurrences_are_strictly_increasing(due in due_at(), rule in recurring_rule(), engine in engines()) {
        let preview = engine.preview(due, &rule, 12);
        prop_assert_eq!(preview.len(), 12);
        prop_assert!(preview.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(preview[0] > due);
    }
}

#[test]
fn unknown_type_is_non_recurring() {
    let rule = RecurrenceRule {
        kind: RecurrenceType::Unknown("every-blue-moon".to_string()),
        ..RecurrenceRule::default()
    };
    let due = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
    assert_eq!(RecurrenceEngine::default().next_occurrence(Some(due), &rule), None);
}
