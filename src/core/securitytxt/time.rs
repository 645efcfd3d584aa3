// src/core/securitytxt/time.rs

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Why an `Expires` value could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpiresError {
    #[error(transparent)]
    Layout(#[from] chrono::ParseError),

    #[error("expected a four-digit year")]
    YearDigits,
}

type ParseResult<T> = Result<T, ExpiresError>;
type TimeParser = fn(&str) -> ParseResult<DateTime<FixedOffset>>;

const MONTHS: [&str; 12] = ["jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec"];

/// Accepted `Expires` layouts, most preferred first. The first one that
/// parses wins.
static EXPIRES_FORMATS: &[(&str, TimeParser)] = &[
    ("rfc3339", |v| Ok(DateTime::parse_from_rfc3339(v)?)),
    ("rfc5322-numeric-zone", |v| {
        require_four_digit_year(v)?;
        parse_with_zone(v, &["%a, %d %b %Y %H:%M:%S %z", "%d %b %Y %H:%M:%S %z"])
    }),
    ("rfc5322-named-zone", |v| {
        require_four_digit_year(v)?;
        parse_named_zone(v, &["%a, %d %b %Y %H:%M:%S %z", "%d %b %Y %H:%M:%S %z"])
    }),
    ("rfc5322-two-digit-year", |v| {
        const LAYOUTS: &[&str] = &["%a, %d %b %y %H:%M:%S %z", "%d %b %y %H:%M:%S %z", "%d %b %y %H:%M %z"];
        parse_with_zone(v, LAYOUTS).or_else(|_| parse_named_zone(v, LAYOUTS))
    }),
    ("iso8601-no-offset", |v| parse_naive_utc(v, "%Y-%m-%dT%H:%M:%S")),
    ("iso8601-fractional", |v| parse_naive_utc(v, "%Y-%m-%dT%H:%M:%S%.f")),
    ("date", |v| {
        let date = NaiveDate::parse_from_str(v, "%Y-%m-%d")?;
        Ok(date.and_time(chrono::NaiveTime::MIN).and_utc().fixed_offset())
    }),
];

/// Parses an `Expires` value, trying each known layout in priority order.
///
/// # Returns
/// The parsed timestamp with its original offset, or the failure reported by
/// the last layout tried.
pub fn parse_expires(value: &str) -> ParseResult<DateTime<FixedOffset>> {
    let mut last_err = None;
    for (name, parse) in EXPIRES_FORMATS {
        match parse(value) {
            Ok(t) => {
                tracing::trace!(format = name, value, "parsed expires");
                return Ok(t);
            }
            Err(e) => last_err = Some(e),
        }
    }
    match last_err {
        Some(e) => Err(e),
        // The table is never empty; fall back to a strict parse for its error.
        None => Ok(DateTime::parse_from_rfc3339(value)?),
    }
}

/// `%Y` happily reads `26` as the year 26, which would shadow the two-digit
/// RFC 5322 layouts further down the table.
fn require_four_digit_year(value: &str) -> ParseResult<()> {
    let year = value
        .split_whitespace()
        .skip_while(|token| !MONTHS.contains(&token.to_ascii_lowercase().as_str()))
        .nth(1);
    match year {
        Some(y) if y.len() == 4 && y.bytes().all(|b| b.is_ascii_digit()) => Ok(()),
        _ => Err(ExpiresError::YearDigits),
    }
}

fn parse_with_zone(value: &str, layouts: &[&str]) -> ParseResult<DateTime<FixedOffset>> {
    let mut result = DateTime::parse_from_str(value, layouts[0]);
    for layout in &layouts[1..] {
        if result.is_ok() {
            break;
        }
        result = DateTime::parse_from_str(value, layout);
    }
    Ok(result?)
}

/// Rewrites a trailing zone abbreviation (`GMT`, `EST`, ...) into its numeric
/// offset and retries the numeric layouts.
fn parse_named_zone(value: &str, layouts: &[&str]) -> ParseResult<DateTime<FixedOffset>> {
    let rewritten = value
        .rsplit_once(' ')
        .and_then(|(rest, zone)| named_zone_offset(zone).map(|offset| format!("{rest} {offset}")));
    match rewritten {
        Some(numeric) => parse_with_zone(&numeric, layouts),
        None => parse_with_zone(value, layouts),
    }
}

fn named_zone_offset(zone: &str) -> Option<&'static str> {
    let offset = match zone.to_ascii_uppercase().as_str() {
        "UT" | "UTC" | "GMT" | "Z" => "+0000",
        "EST" => "-0500",
        "EDT" => "-0400",
        "CST" => "-0600",
        "CDT" => "-0500",
        "MST" => "-0700",
        "MDT" => "-0600",
        "PST" => "-0800",
        "PDT" => "-0700",
        _ => return None,
    };
    Some(offset)
}

fn parse_naive_utc(value: &str, layout: &str) -> ParseResult<DateTime<FixedOffset>> {
    let naive = NaiveDateTime::parse_from_str(value, layout)?;
    Ok(naive.and_utc().fixed_offset())
}
