//! Publication date normalization.
//!
//! amurmedia.ru prints dates in three unrelated shapes:
//!
//! | Shape | Example | Meaning |
//! |-------|---------|---------|
//! | Dotted | `15.03.2024` | full date, no time |
//! | Clock | `14:30` | published today |
//! | Month name | `10 марта, 14:30` / `10 марта 2024, 14:30` | genitive Russian month, year optional |
//!
//! [`classify`] decides which shape a string has; each shape then has its own
//! parser. [`normalize`] ties the two together against a reference "now".

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

const DOTTED_FORMAT: &str = "%d.%m.%Y";
const NUMERIC_FORMAT: &str = "%d %m %Y, %H:%M";
const NUMERIC_DATE_FORMAT: &str = "%d %m %Y";
const CLOCK_FORMAT: &str = "%H:%M";

/// Genitive month names and their two-digit numbers.
const MONTHS: [(&str, &str); 12] = [
    ("января", "01"),
    ("февраля", "02"),
    ("марта", "03"),
    ("апреля", "04"),
    ("мая", "05"),
    ("июня", "06"),
    ("июля", "07"),
    ("августа", "08"),
    ("сентября", "09"),
    ("октября", "10"),
    ("ноября", "11"),
    ("декабря", "12"),
];

static CLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}:\d{2}$").expect("clock pattern is valid"));
static FULL_NUMERIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{1,2}\s\d{2}\s\d{4},\s\d{1,2}:\d{2}$").expect("numeric pattern is valid")
});

#[derive(Debug, Error, PartialEq)]
pub enum DateError {
    /// The string matches none of the known shapes.
    #[error("unrecognized date format: {0:?}")]
    Unrecognized(String),

    /// The shape was recognized but the values do not form a valid timestamp.
    #[error("malformed date {raw:?}: {source}")]
    Malformed {
        raw: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Which of the site's date layouts a string uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateShape {
    /// `DD.MM.YYYY`
    Dotted,
    /// `HH:MM`, relative to today.
    Clock,
    /// `D <month>[ YYYY][, HH:MM]`; carries the matched name and its number.
    MonthName {
        name: &'static str,
        number: &'static str,
    },
}

/// Detect the shape of `raw`, checking dotted, clock and month-name forms in that order.
pub fn classify(raw: &str) -> Result<DateShape, DateError> {
    if raw.contains('.') {
        return Ok(DateShape::Dotted);
    }
    if CLOCK_RE.is_match(raw) {
        return Ok(DateShape::Clock);
    }
    MONTHS
        .iter()
        .find(|(name, _)| raw.contains(name))
        .map(|&(name, number)| DateShape::MonthName { name, number })
        .ok_or_else(|| DateError::Unrecognized(raw.to_string()))
}

/// Convert a raw date string into a timestamp, resolving missing parts from `now`.
pub fn normalize(raw: &str, now: NaiveDateTime) -> Result<NaiveDateTime, DateError> {
    let raw = raw.trim();
    match classify(raw)? {
        DateShape::Dotted => parse_dotted(raw),
        DateShape::Clock => parse_clock(raw, now.date()),
        DateShape::MonthName { name, number } => parse_month_name(raw, name, number, now.year()),
    }
}

fn parse_dotted(raw: &str) -> Result<NaiveDateTime, DateError> {
    NaiveDate::parse_from_str(raw, DOTTED_FORMAT)
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|source| malformed(raw, source))
}

fn parse_clock(raw: &str, today: NaiveDate) -> Result<NaiveDateTime, DateError> {
    let composed = format!("{} {} {}, {}", today.day(), today.month(), today.year(), raw);
    NaiveDateTime::parse_from_str(&composed, NUMERIC_FORMAT).map_err(|source| malformed(raw, source))
}

fn parse_month_name(
    raw: &str,
    name: &str,
    number: &str,
    year: i32,
) -> Result<NaiveDateTime, DateError> {
    let numeric = raw.replacen(name, number, 1);
    if FULL_NUMERIC_RE.is_match(&numeric) {
        return NaiveDateTime::parse_from_str(&numeric, NUMERIC_FORMAT)
            .map_err(|source| malformed(raw, source));
    }

    match numeric.split_once(',') {
        Some((day_month, time)) => {
            let with_year = format!("{} {year},{time}", day_month.trim_end());
            NaiveDateTime::parse_from_str(&with_year, NUMERIC_FORMAT)
                .map_err(|source| malformed(raw, source))
        }
        None => {
            let date_part = numeric.trim();
            let with_year = if date_part.split_whitespace().count() >= 3 {
                date_part.to_string()
            } else {
                format!("{date_part} {year}")
            };
            NaiveDate::parse_from_str(&with_year, NUMERIC_DATE_FORMAT)
                .map(|date| date.and_time(NaiveTime::MIN))
                .map_err(|source| malformed(raw, source))
        }
    }
}

fn malformed(raw: &str, source: chrono::ParseError) -> DateError {
    DateError::Malformed {
        raw: raw.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn reference() -> NaiveDateTime {
        at(2024, 6, 1, 9, 15)
    }

    #[test]
    fn test_classify_priority() {
        assert_eq!(classify("15.03.2024").unwrap(), DateShape::Dotted);
        assert_eq!(classify("14:30").unwrap(), DateShape::Clock);
        assert_eq!(
            classify("10 марта, 14:30").unwrap(),
            DateShape::MonthName {
                name: "марта",
                number: "03"
            }
        );
        // A dot wins even when a month name is present.
        assert_eq!(classify("10 марта 2024.").unwrap(), DateShape::Dotted);
    }

    #[test]
    fn test_classify_unrecognized() {
        assert_eq!(
            classify("вчера").unwrap_err(),
            DateError::Unrecognized("вчера".to_string())
        );
        // Nominative month names are not accepted.
        assert!(matches!(
            classify("10 март, 14:30"),
            Err(DateError::Unrecognized(_))
        ));
    }

    #[test]
    fn test_dotted_date_is_midnight() {
        assert_eq!(normalize("15.03.2024", reference()).unwrap(), at(2024, 3, 15, 0, 0));
    }

    #[test]
    fn test_clock_uses_reference_date() {
        assert_eq!(normalize("14:30", reference()).unwrap(), at(2024, 6, 1, 14, 30));
    }

    #[test]
    fn test_month_name_injects_reference_year() {
        assert_eq!(
            normalize("10 марта, 14:30", reference()).unwrap(),
            at(2024, 3, 10, 14, 30)
        );
    }

    #[test]
    fn test_month_name_with_year_parses_directly() {
        let last_year = at(2025, 1, 5, 0, 0);
        assert_eq!(
            normalize("10 марта 2024, 14:30", last_year).unwrap(),
            at(2024, 3, 10, 14, 30)
        );
    }

    #[test]
    fn test_every_month_name_maps_to_its_number() {
        for (index, (name, _)) in MONTHS.iter().enumerate() {
            let raw = format!("3 {name}, 08:05");
            let parsed = normalize(&raw, reference()).unwrap();
            assert_eq!(parsed, at(2024, index as u32 + 1, 3, 8, 5), "month {name}");
        }
    }

    #[test]
    fn test_month_name_without_time_is_midnight() {
        assert_eq!(normalize("10 марта", reference()).unwrap(), at(2024, 3, 10, 0, 0));
        assert_eq!(
            normalize("10 марта 2023", reference()).unwrap(),
            at(2023, 3, 10, 0, 0)
        );
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(
            normalize("  10 мая, 07:00\n", reference()).unwrap(),
            at(2024, 5, 10, 7, 0)
        );
    }

    #[test]
    fn test_invalid_values_are_malformed() {
        assert!(matches!(
            normalize("32.13.2024", reference()),
            Err(DateError::Malformed { .. })
        ));
        assert!(matches!(
            normalize("25:99", reference()),
            Err(DateError::Malformed { .. })
        ));
        assert!(matches!(
            normalize("31 февраля, 10:00", reference()),
            Err(DateError::Malformed { .. })
        ));
    }

    #[test]
    fn test_partial_clock_is_not_accepted() {
        assert!(matches!(
            normalize("14:30 мск", reference()),
            Err(DateError::Unrecognized(_))
        ));
    }
}
