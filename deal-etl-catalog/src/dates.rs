//! Date and timestamp normalization.
//!
//! Storefront exports render dates for people, not machines. Three shapes
//! show up and each has its own entry point:
//!
//! - release dates such as `Jun 5, 2023` or `Jun 2023` ([`parse_release_date`])
//! - offer countdown text such as `Offer ends 25 December`, which omits the
//!   year ([`parse_offer_ends_text`])
//! - already machine-formatted timestamps that only need re-rendering
//!   ([`to_instant`])
//!
//! Every successful parse renders the same canonical instant: a timezone-naive
//! ISO-8601 string with whole seconds (`YYYY-MM-DDTHH:MM:SS`). Inputs that match
//! no grammar are returned unchanged; callers treat such values as
//! best-effort text rather than errors.

use chrono::{
    DateTime, Datelike, DurationRound, Month, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta,
};
use serde_json::Value;

/// `strftime` pattern of the canonical instant.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A single parse attempt. `None` means "this grammar does not apply".
type Attempt<T> = fn(&str) -> Option<T>;

/// Run `attempts` in order and keep the first success.
fn first_match<T>(text: &str, attempts: &[Attempt<T>]) -> Option<T> {
    attempts.iter().find_map(|attempt| attempt(text))
}

fn render(dt: NaiveDateTime) -> String {
    dt.format(CANONICAL_FORMAT).to_string()
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

// ── Release dates ───────────────────────────────────────────────────────────

const RELEASE_DATE_GRAMMARS: &[Attempt<NaiveDate>] = &[month_day_year, month_year];

/// `Jun 5, 2023`
fn month_day_year(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%b %d, %Y").ok()
}

/// `Jun 2023`, pinned to the first of the month.
fn month_year(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("1 {text}"), "%d %b %Y").ok()
}

/// Canonicalize a store release date.
///
/// Tries `Mon DD, YYYY`, then `Mon YYYY` (day 1). Anything else, including
/// an already canonical value, is returned unchanged.
///
/// # Examples
///
/// ```
/// use deal_etl_catalog::dates::parse_release_date;
///
/// assert_eq!(parse_release_date("Jun 5, 2023"), "2023-06-05T00:00:00");
/// assert_eq!(parse_release_date("Jun 2023"), "2023-06-01T00:00:00");
/// assert_eq!(parse_release_date("Coming soon"), "Coming soon");
/// ```
pub fn parse_release_date(text: &str) -> String {
    match first_match(text, RELEASE_DATE_GRAMMARS) {
        Some(date) => render(midnight(date)),
        None => {
            log::debug!("Release date '{text}' matches no known format, keeping as-is");
            text.to_string()
        }
    }
}

// ── Offer countdown text ────────────────────────────────────────────────────

/// The next date (today included) that falls on `month`/`day`.
///
/// A date equal to today stays in the current year. Returns `None` for
/// impossible dates such as 30 February or 29 February outside a leap year.
pub fn next_occurrence(today: NaiveDate, month: u32, day: u32) -> Option<NaiveDate> {
    let mut year = today.year();
    if today.month() > month || (today.month() == month && today.day() > day) {
        year += 1;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

const OFFER_TAIL_GRAMMARS: &[Attempt<(u32, u32)>] = &[day_month, month_day];

fn month_number(token: &str) -> Option<u32> {
    token.parse::<Month>().ok().map(|m| m.number_from_month())
}

/// The last two tokens of `tail`, in order.
fn last_two(tail: &str) -> Option<(&str, &str)> {
    let mut tokens = tail.rsplit(' ');
    let second = tokens.next()?;
    let first = tokens.next()?;
    Some((first, second))
}

/// `25 December`, as `(month, day)`.
fn day_month(tail: &str) -> Option<(u32, u32)> {
    let (day, month) = last_two(tail)?;
    Some((month_number(month)?, day.parse().ok()?))
}

/// `December 25`, as `(month, day)`.
fn month_day(tail: &str) -> Option<(u32, u32)> {
    let (month, day) = last_two(tail)?;
    Some((month_number(month)?, day.parse().ok()?))
}

/// Turn offer countdown text (`... 25 December` or `... December 25`) into a
/// canonical instant.
///
/// The last two tokens are read as day and month name, in either order. The
/// year is the next one in which that date has not yet passed relative to
/// `today`. When the last token is the literal `in` (the `Offer ends in`
/// placeholder) or the tail does not read as a date, the text is returned
/// unchanged.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use deal_etl_catalog::dates::parse_offer_ends_text;
///
/// let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
/// assert_eq!(parse_offer_ends_text("25 December", today), "2024-12-25T00:00:00");
/// assert_eq!(parse_offer_ends_text("Offer ends December 25", today), "2024-12-25T00:00:00");
/// assert_eq!(parse_offer_ends_text("Offer ends in", today), "Offer ends in");
/// ```
pub fn parse_offer_ends_text(text: &str, today: NaiveDate) -> String {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.last().is_none_or(|&last| last == "in") {
        return text.to_string();
    }

    let tail = tokens[tokens.len().saturating_sub(2)..].join(" ");
    let parsed = first_match(&tail, OFFER_TAIL_GRAMMARS)
        .and_then(|(month, day)| next_occurrence(today, month, day));

    match parsed {
        Some(date) => render(midnight(date)),
        None => {
            log::debug!("Offer text '{text}' does not end in a day and month, keeping as-is");
            text.to_string()
        }
    }
}

// ── Machine timestamps ──────────────────────────────────────────────────────

const INSTANT_GRAMMARS: &[Attempt<NaiveDateTime>] =
    &[iso_t_separated, iso_space_separated, rfc3339, iso_date_only];

fn iso_t_separated(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

fn iso_space_separated(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f").ok()
}

/// Offset-qualified instants keep their wall-clock time; the offset is dropped.
fn rfc3339(text: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.naive_local())
}

fn iso_date_only(text: &str) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok().map(midnight)
}

fn round_to_second(dt: NaiveDateTime) -> NaiveDateTime {
    dt.duration_round(TimeDelta::seconds(1)).unwrap_or(dt)
}

/// Canonicalize a machine-formatted timestamp string.
///
/// Returns `None` when the text is not a recognizable timestamp.
pub fn parse_instant(text: &str) -> Option<String> {
    first_match(text, INSTANT_GRAMMARS).map(|dt| render(round_to_second(dt)))
}

/// Re-render a date-like value as a canonical instant, rounded to the
/// nearest whole second.
///
/// Strings that are not timestamps and all non-string values (null, numbers,
/// placeholders) are returned unchanged. Applying this to its own output is
/// a no-op.
pub fn to_instant(value: &Value) -> Value {
    match value {
        Value::String(text) => match parse_instant(text) {
            Some(canonical) => Value::String(canonical),
            None => value.clone(),
        },
        other => other.clone(),
    }
}

/// Render Unix epoch seconds as a canonical instant (UTC wall clock).
pub fn epoch_to_instant(seconds: i64) -> Option<String> {
    DateTime::from_timestamp(seconds, 0).map(|dt| render(dt.naive_utc()))
}
