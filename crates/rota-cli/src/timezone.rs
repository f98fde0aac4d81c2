use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;
use rota_core::error::CoreError;
use rota_core::timezone::validate_timezone;

/// Detect system timezone
pub fn detect_system_timezone() -> String {
    if let Ok(tz) = std::env::var("TZ") {
        if !tz.is_empty() && validate_timezone(&tz).is_ok() {
            return tz;
        }
    }

    if let Ok(tz) = iana_time_zone::get_timezone() {
        if validate_timezone(&tz).is_ok() {
            return tz;
        }
    }

    "UTC".to_string()
}

const COMMON_TIMEZONES: &[&str] = &[
    "UTC",
    "America/New_York",
    "America/Chicago",
    "America/Denver",
    "America/Los_Angeles",
    "America/Toronto",
    "America/Sao_Paulo",
    "Europe/London",
    "Europe/Paris",
    "Europe/Berlin",
    "Europe/Madrid",
    "Asia/Tokyo",
    "Asia/Shanghai",
    "Asia/Singapore",
    "Asia/Kolkata",
    "Asia/Dubai",
    "Australia/Sydney",
    "Pacific/Auckland",
];

/// Common zones whose name shares a fragment with `invalid`, at most five.
fn suggest_timezone(invalid: &str) -> Vec<&'static str> {
    let needle = invalid.to_lowercase();
    COMMON_TIMEZONES
        .iter()
        .copied()
        .filter(|tz| {
            let tz_lower = tz.to_lowercase();
            tz_lower.contains(&needle)
                || tz.split('/').any(|part| needle.contains(&part.to_lowercase()))
        })
        .take(5)
        .collect()
}

/// Resolves user input to an IANA zone, accepting a few familiar abbreviations.
pub fn resolve_timezone(input: &str) -> Result<Tz, CoreError> {
    if let Ok(tz) = validate_timezone(input) {
        return Ok(tz);
    }

    let mapped = match input.trim().to_lowercase().as_str() {
        "est" | "edt" | "eastern" => "America/New_York",
        "cst" | "cdt" | "central" => "America/Chicago",
        "mst" | "mdt" | "mountain" => "America/Denver",
        "pst" | "pdt" | "pacific" => "America/Los_Angeles",
        "gmt" | "utc" | "z" => "UTC",
        "cet" | "cest" => "Europe/Paris",
        "jst" => "Asia/Tokyo",
        _ => {
            let suggestions = suggest_timezone(input);
            let message = if suggestions.is_empty() {
                format!("'{input}'. Use IANA names like 'America/New_York'")
            } else {
                format!("'{input}'. Did you mean: {}?", suggestions.join(", "))
            };
            return Err(CoreError::InvalidTimezone(message));
        }
    };
    validate_timezone(mapped)
}

/// The current wall-clock time in `tz`.
pub fn now_in(tz: &Tz) -> NaiveDateTime {
    Utc::now().with_timezone(tz).naive_local()
}
