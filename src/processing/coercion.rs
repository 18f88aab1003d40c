use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Leading numeric prefix, the way a lenient float parser reads "12.5 USD".
fn numeric_prefix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("numeric prefix pattern")
    })
}

fn parse_float_prefix(raw: &str) -> Option<f64> {
    let candidate = numeric_prefix().find(raw.trim_start())?;
    candidate
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Numbers pass through, strings are read as floats, anything else is 0.
pub fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Number(number) => number.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::String(raw) => parse_float_prefix(raw).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Same as [`coerce_number`] for a field that may be missing.
pub fn coerce_field(value: Option<&Value>) -> f64 {
    value.map(coerce_number).unwrap_or(0.0)
}

/// Converts a `DD/MM/YYYY HH:mm:ss` invoice date, read as local time in
/// `tz`, to UTC. Missing or unreadable dates become `now`.
pub fn parse_invoice_date(raw: Option<&str>, tz: Tz, now: DateTime<Utc>) -> DateTime<Utc> {
    match raw {
        Some(raw) => match try_parse_invoice_date(raw, tz) {
            Ok(date) => date,
            Err(e) => {
                tracing::debug!("⚠️ Fecha de factura ilegible '{}': {}", raw, e);
                now
            }
        },
        None => now,
    }
}

fn try_parse_invoice_date(raw: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let mut parts = raw.trim().split(' ');
    let date_part = parts.next().context("missing date part")?;
    let time_part = parts.next().context("missing time part")?;

    let mut date_fields = date_part.split('/');
    let (day, month, year) = match (date_fields.next(), date_fields.next(), date_fields.next()) {
        (Some(day), Some(month), Some(year)) => (day, month, year),
        _ => bail!("expected DD/MM/YYYY, got '{}'", date_part),
    };

    let iso = format!("{}-{}-{}T{}", year, month, day, time_part);
    let naive = NaiveDateTime::parse_from_str(&iso, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(&iso, "%Y-%m-%dT%H:%M"))
        .with_context(|| format!("invalid timestamp '{}'", iso))?;

    match tz.from_local_datetime(&naive) {
        chrono::LocalResult::Single(local) => Ok(local.with_timezone(&Utc)),
        chrono::LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        chrono::LocalResult::None => bail!("'{}' does not exist in {}", iso, tz.name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_numbers_pass_through() {
        assert_eq!(coerce_number(&json!(7)), 7.0);
        assert_eq!(coerce_number(&json!(45.5)), 45.5);
        assert_eq!(coerce_number(&json!(-3.25)), -3.25);
    }

    #[test]
    fn test_numeric_strings_are_parsed() {
        assert_eq!(coerce_number(&json!("45.50")), 45.5);
        assert_eq!(coerce_number(&json!("  12")), 12.0);
        assert_eq!(coerce_number(&json!("1.5e2")), 150.0);
        assert_eq!(coerce_number(&json!(".75")), 0.75);
        assert_eq!(coerce_number(&json!("12abc")), 12.0);
    }

    #[test]
    fn test_everything_else_is_zero() {
        assert_eq!(coerce_number(&json!("abc")), 0.0);
        assert_eq!(coerce_number(&json!("")), 0.0);
        assert_eq!(coerce_number(&json!(".")), 0.0);
        assert_eq!(coerce_number(&Value::Null), 0.0);
        assert_eq!(coerce_number(&json!(true)), 0.0);
        assert_eq!(coerce_number(&json!({ "monto": 3 })), 0.0);
        assert_eq!(coerce_number(&json!([1, 2])), 0.0);
        assert_eq!(coerce_field(None), 0.0);
    }

    #[test]
    fn test_well_formed_date_in_utc() {
        let date = parse_invoice_date(Some("25/12/2024 14:30:00"), chrono_tz::UTC, fixed_now());
        assert_eq!(date, Utc.with_ymd_and_hms(2024, 12, 25, 14, 30, 0).unwrap());
        assert_eq!(date.format("%Y-%m-%dT%H:%M:%S").to_string(), "2024-12-25T14:30:00");
    }

    #[test]
    fn test_panama_dates_are_shifted_to_utc() {
        let date = parse_invoice_date(
            Some("15/05/2025 09:50:04"),
            chrono_tz::America::Panama,
            fixed_now(),
        );
        assert_eq!(date, Utc.with_ymd_and_hms(2025, 5, 15, 14, 50, 4).unwrap());
    }

    #[test]
    fn test_malformed_dates_fall_back_to_now() {
        let now = fixed_now();
        for raw in [
            "",
            "25/12/2024",
            "2024-12-25 14:30:00",
            "32/13/2024 14:30:00",
            "25/12/2024 25:61:00",
            "ayer por la tarde",
        ] {
            assert_eq!(parse_invoice_date(Some(raw), chrono_tz::UTC, now), now, "input {:?}", raw);
        }
        assert_eq!(parse_invoice_date(None, chrono_tz::UTC, now), now);
    }

    #[test]
    fn test_time_without_seconds_is_accepted() {
        let date = parse_invoice_date(Some("01/02/2025 08:15"), chrono_tz::UTC, fixed_now());
        assert_eq!(date, Utc.with_ymd_and_hms(2025, 2, 1, 8, 15, 0).unwrap());
    }
}
