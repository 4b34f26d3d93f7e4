//! Splitting events into upcoming and past.
//!
//! An event row carries its date in one of two places: `event_date`, an
//! ISO-8601 timestamp written by the admin panel, or `date`, a display
//! string such as "Sun 28th December 2025" found on older rows.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Layouts tried, in order, once the day-month-year pattern has failed.
/// Ordinal suffixes and a leading weekday are stripped before these are
/// applied.
const LOOSE_DATE_LAYOUTS: [&str; 7] = [
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%B %d %Y",
];

const ISO_OFFSET_LAYOUTS: [&str; 2] = ["%Y-%m-%dT%H:%M%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

const ISO_LOCAL_LAYOUTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// How far past a missing wall-clock time to look for one that exists.
const GAP_SEARCH_MINUTES: i64 = 24 * 60;

lazy_static! {
    static ref DAY_MONTH_YEAR: Regex =
        Regex::new(r"(?i)(\d{1,2})(?:st|nd|rd|th)?\s+([a-z]+)\s+(\d{4})").unwrap();
    static ref ORDINAL_SUFFIX: Regex = Regex::new(r"(?i)(\d)(?:st|nd|rd|th)\b").unwrap();
    static ref LEADING_WEEKDAY: Regex =
        Regex::new(r"(?i)^(?:mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+").unwrap();
}

/// Parses an event date in any of the shapes the site has stored over
/// time. `None` means no usable date, whether the input was absent or
/// unparseable.
///
/// Any input containing an uppercase `T` is taken to be an ISO-8601
/// datetime and nothing else is attempted, so "Thu 1st January 2026"
/// is unparseable.
///
/// ```
/// use chrono::{Datelike, Timelike};
/// use site_backend::schedule::parse_event_date;
///
/// let date = parse_event_date(Some("15th June 2025")).unwrap();
/// assert_eq!((date.year(), date.month(), date.day()), (2025, 6, 15));
/// assert_eq!(date.hour(), 0);
///
/// assert!(parse_event_date(Some("not a date")).is_none());
/// assert!(parse_event_date(None).is_none());
/// ```
pub fn parse_event_date(input: Option<&str>) -> Option<DateTime<Local>> {
    let input = input?.trim();

    if input.is_empty() {
        return None;
    }

    if input.contains('T') {
        return parse_iso_datetime(input);
    }

    parse_day_month_year(input).or_else(|| parse_loosely(input))
}

fn parse_iso_datetime(input: &str) -> Option<DateTime<Local>> {
    let with_offset = DateTime::parse_from_rfc3339(input).ok().or_else(|| {
        ISO_OFFSET_LAYOUTS
            .iter()
            .find_map(|layout| DateTime::parse_from_str(input, layout).ok())
    });

    if let Some(date) = with_offset {
        return Some(date.with_timezone(&Local));
    }

    // without an offset the wall-clock time is local
    ISO_LOCAL_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(input, layout).ok())
        .and_then(|naive| resolve_local(&Local, naive))
}

fn parse_day_month_year(input: &str) -> Option<DateTime<Local>> {
    let captures = DAY_MONTH_YEAR.captures(input)?;

    let day: u32 = captures[1].parse().ok()?;
    let month = month_number(&captures[2])?;
    let year: i32 = captures[3].parse().ok()?;

    local_midnight(NaiveDate::from_ymd_opt(year, month, day)?)
}

fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();

    MONTHS
        .iter()
        .position(|month| *month == name)
        .map(|index| index as u32 + 1)
}

fn parse_loosely(input: &str) -> Option<DateTime<Local>> {
    if let Ok(date) = DateTime::parse_from_rfc2822(input) {
        return Some(date.with_timezone(&Local));
    }

    // the weekday is ignored rather than checked against the date
    let stripped = ORDINAL_SUFFIX.replace_all(input, "$1");
    let stripped = LEADING_WEEKDAY.replace(&stripped, "");

    LOOSE_DATE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(&stripped, layout).ok())
        .and_then(local_midnight)
}

fn local_midnight(date: NaiveDate) -> Option<DateTime<Local>> {
    resolve_local(&Local, date.and_hms_opt(0, 0, 0)?)
}

/// The instant `naive` names in `zone`. A wall-clock time skipped by a
/// daylight-saving transition resolves to the first minute after the gap.
fn resolve_local<Tz: TimeZone>(zone: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    (0..=GAP_SEARCH_MINUTES).find_map(|minutes| {
        zone.from_local_datetime(&(naive + Duration::minutes(minutes)))
            .earliest()
    })
}

/// A record with a canonical and a legacy date field.
pub trait Dated {
    /// The ISO-8601 timestamp, if any.
    fn event_date(&self) -> Option<&str>;

    /// The free-form display date, if any.
    fn date(&self) -> Option<&str>;
}

impl<T: Dated + ?Sized> Dated for &T {
    fn event_date(&self) -> Option<&str> {
        (**self).event_date()
    }

    fn date(&self) -> Option<&str> {
        (**self).date()
    }
}

/// The canonical date if it parses, otherwise the legacy one.
pub fn effective_date<T: Dated + ?Sized>(record: &T) -> Option<DateTime<Local>> {
    parse_event_date(record.event_date()).or_else(|| parse_event_date(record.date()))
}

/// Events split around a pivot day.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Schedule<T> {
    /// Events on or after the pivot day, earliest first.
    pub upcoming: Vec<T>,

    /// Events before the pivot day or without a usable date, most
    /// recent first.
    pub past: Vec<T>,
}

/// Splits `records` into upcoming and past relative to `today`.
///
/// Records without a usable date always land in `past`, ordered as if
/// dated at the Unix epoch: after anything dated since 1970 and before
/// anything older. Both sorts are stable, so records with equal dates
/// keep their input order.
pub fn categorize<T, I>(records: I, today: NaiveDate) -> Schedule<T>
where
    T: Dated,
    I: IntoIterator<Item = T>,
{
    let mut upcoming = vec![];
    let mut past = vec![];

    for record in records {
        match effective_date(&record) {
            Some(date) if date.naive_local().date() >= today => {
                upcoming.push((sort_key(Some(date)), record))
            }
            date => past.push((sort_key(date), record)),
        }
    }

    upcoming.sort_by_key(|(key, _)| *key);
    past.sort_by(|(a, _), (b, _)| b.cmp(a));

    Schedule {
        upcoming: upcoming.into_iter().map(|(_, record)| record).collect(),
        past: past.into_iter().map(|(_, record)| record).collect(),
    }
}

/// [`categorize`] against the current local date.
pub fn categorize_now<T, I>(records: I) -> Schedule<T>
where
    T: Dated,
    I: IntoIterator<Item = T>,
{
    categorize(records, Local::now().naive_local().date())
}

fn sort_key(date: Option<DateTime<Local>>) -> i64 {
    date.map_or(0, |date| date.timestamp_millis())
}
