//! Field comparison helpers used by [`Record::matches`](crate::Record::matches).

use chrono::{DateTime, NaiveDate, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Case-insensitive exact comparison.
pub fn eq_ignore_case(field: &str, value: &str) -> bool {
    field.to_lowercase() == value.to_lowercase()
}

/// True if any element equals `value` case-insensitively.
pub fn any_eq_ignore_case<S: AsRef<str>>(fields: &[S], value: &str) -> bool {
    fields
        .iter()
        .any(|field| eq_ignore_case(field.as_ref(), value))
}

/// Numeric id comparison; an unparseable value never matches.
pub fn id_eq(field: u64, value: &str) -> bool {
    value.trim().parse::<u64>().is_ok_and(|id| id == field)
}

/// Compare `value` against the `YYYY-MM-DD` date portion of `timestamp`.
pub fn date_eq(timestamp: &DateTime<Utc>, value: &str) -> bool {
    timestamp.format(DATE_FORMAT).to_string() == value.trim()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Strictly after the given date; an unparseable date never matches.
pub fn date_after(timestamp: &DateTime<Utc>, value: &str) -> bool {
    parse_date(value).is_some_and(|date| timestamp.date_naive() > date)
}

/// Strictly before the given date; an unparseable date never matches.
pub fn date_before(timestamp: &DateTime<Utc>, value: &str) -> bool {
    parse_date(value).is_some_and(|date| timestamp.date_naive() < date)
}

/// `field >= value`; an unparseable bound never matches.
pub fn at_least(field: f64, value: &str) -> bool {
    value.trim().parse::<f64>().is_ok_and(|bound| field >= bound)
}

/// `field <= value`; an unparseable bound never matches.
pub fn at_most(field: f64, value: &str) -> bool {
    value.trim().parse::<f64>().is_ok_and(|bound| field <= bound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn case_insensitive_exact_match() {
        assert!(eq_ignore_case("The Go Programming Language", "the go programming language"));
        assert!(!eq_ignore_case("Go", "Go!"));
        assert!(any_eq_ignore_case(&["Fiction", "Sci-Fi"], "sci-fi"));
        assert!(!any_eq_ignore_case::<String>(&[], "fiction"));
    }

    #[test]
    fn ids_compare_numerically() {
        assert!(id_eq(12, "12"));
        assert!(!id_eq(12, "twelve"));
        assert!(!id_eq(12, "13"));
    }

    #[test]
    fn dates_compare_on_date_portion() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 17, 45, 0).unwrap();
        assert!(date_eq(&ts, "2024-03-09"));
        assert!(!date_eq(&ts, "2024-03-10"));
        assert!(date_after(&ts, "2024-03-08"));
        assert!(!date_after(&ts, "2024-03-09"));
        assert!(date_before(&ts, "2024-03-10"));
        assert!(!date_before(&ts, "not-a-date"));
    }

    #[test]
    fn price_bounds_are_inclusive() {
        assert!(at_least(10.0, "10"));
        assert!(at_most(10.0, "10.0"));
        assert!(!at_most(10.5, "10"));
        assert!(!at_least(10.0, "cheap"));
    }
}
