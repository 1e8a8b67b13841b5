//! Observed-holiday calculation.
//!
//! Four rule shapes cover the built-in US holiday table: fixed month/day,
//! Nth-weekday-of-month, last-weekday-of-month, and Easter Sunday via the
//! Meeus/Jones/Butcher algorithm. Range queries evaluate every rule for each
//! candidate year and keep the dates that land inside the range.

use chrono::{Datelike, NaiveDate, Weekday};

/// How a holiday's concrete date is derived for a given year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolidayRule {
    /// Same month/day every year (e.g. July 4).
    Fixed { month: u32, day: u32 },
    /// Nth occurrence of a weekday in a month, 1-based (e.g. 3rd Monday of
    /// January).
    NthWeekday { month: u32, weekday: Weekday, nth: u8 },
    /// Last occurrence of a weekday in a month (e.g. last Monday of May).
    LastWeekday { month: u32, weekday: Weekday },
    /// Easter Sunday, computed ecclesiastically.
    Easter,
}

/// A named calendar event with a concrete date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holiday {
    pub name: String,
    pub date: NaiveDate,
}

/// The built-in observed-holiday table (US).
const OBSERVED: &[(&str, HolidayRule)] = &[
    ("New Year's Day", HolidayRule::Fixed { month: 1, day: 1 }),
    (
        "Martin Luther King Jr. Day",
        HolidayRule::NthWeekday { month: 1, weekday: Weekday::Mon, nth: 3 },
    ),
    ("Valentine's Day", HolidayRule::Fixed { month: 2, day: 14 }),
    (
        "Presidents' Day",
        HolidayRule::NthWeekday { month: 2, weekday: Weekday::Mon, nth: 3 },
    ),
    ("St. Patrick's Day", HolidayRule::Fixed { month: 3, day: 17 }),
    ("Easter Sunday", HolidayRule::Easter),
    (
        "Mother's Day",
        HolidayRule::NthWeekday { month: 5, weekday: Weekday::Sun, nth: 2 },
    ),
    (
        "Memorial Day",
        HolidayRule::LastWeekday { month: 5, weekday: Weekday::Mon },
    ),
    (
        "Father's Day",
        HolidayRule::NthWeekday { month: 6, weekday: Weekday::Sun, nth: 3 },
    ),
    ("Independence Day", HolidayRule::Fixed { month: 7, day: 4 }),
    (
        "Labor Day",
        HolidayRule::NthWeekday { month: 9, weekday: Weekday::Mon, nth: 1 },
    ),
    ("Halloween", HolidayRule::Fixed { month: 10, day: 31 }),
    ("Veterans Day", HolidayRule::Fixed { month: 11, day: 11 }),
    (
        "Thanksgiving",
        HolidayRule::NthWeekday { month: 11, weekday: Weekday::Thu, nth: 4 },
    ),
    ("Christmas", HolidayRule::Fixed { month: 12, day: 25 }),
    ("New Year's Eve", HolidayRule::Fixed { month: 12, day: 31 }),
];

/// Compute Easter Sunday for a Gregorian year.
///
/// Meeus/Jones/Butcher algorithm, integer arithmetic throughout. Valid for
/// any Gregorian year; callers only exercise it for years near the planning
/// window.
pub fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    // month is always 3 or 4 and day is in range, so the construction cannot
    // fail; the fallback keeps the function total without a panicking path.
    NaiveDate::from_ymd_opt(year, month as u32, day as u32).unwrap_or_default()
}

/// Evaluate a rule for a specific year.
///
/// Returns `None` only for dates that do not exist in that year (e.g. a 5th
/// weekday the month lacks); the built-in table never requests one.
fn rule_date(rule: HolidayRule, year: i32) -> Option<NaiveDate> {
    match rule {
        HolidayRule::Fixed { month, day } => NaiveDate::from_ymd_opt(year, month, day),
        HolidayRule::NthWeekday { month, weekday, nth } => {
            NaiveDate::from_weekday_of_month_opt(year, month, weekday, nth)
        }
        HolidayRule::LastWeekday { month, weekday } => last_weekday_of_month(year, month, weekday),
        HolidayRule::Easter => Some(easter_sunday(year)),
    }
}

/// Last occurrence of `weekday` in `(year, month)`.
fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    // Last day of the month = day before the first of the next month.
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let mut date = first_of_next.pred_opt()?;
    while date.weekday() != weekday {
        date = date.pred_opt()?;
    }
    Some(date)
}

/// All observed holidays whose dates fall inside `[start, end]` inclusive,
/// sorted ascending by date (name breaks ties), deduplicated by (name, date).
///
/// Rules are evaluated for every year in `[start.year - 1, end.year + 1]`:
/// a rule anchored to an adjacent year can still land near a range boundary.
/// Pure: no wall-clock dependency. An empty or inverted range yields an
/// empty vec.
pub fn holidays_in_range(start: NaiveDate, end: NaiveDate) -> Vec<Holiday> {
    let mut out = Vec::new();
    for year in (start.year() - 1)..=(end.year() + 1) {
        for (name, rule) in OBSERVED {
            if let Some(date) = rule_date(*rule, year) {
                if date >= start && date <= end {
                    out.push(Holiday { name: (*name).to_string(), date });
                }
            }
        }
    }
    out.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));
    out.dedup_by(|a, b| a.name == b.name && a.date == b.date);
    out
}
