//! Posting-schedule generation.
//!
//! A plan posts twice a week on a fixed weekday pair. The schedule has a
//! single anchor point: the earliest occurrence of the pair's first weekday
//! on or after the start date. Every other slot derives from the anchor by
//! whole-week increments plus the fixed intra-week offset. The anchor search
//! never looks backward from the start date, even when the start date falls
//! between the pair's two weekdays in the same calendar week.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The two supported posting-weekday configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeekdayPair {
    MonWed,
    TueThu,
}

impl WeekdayPair {
    /// Earlier weekday of the pair (slot 0 of each week).
    pub fn first(self) -> Weekday {
        match self {
            Self::MonWed => Weekday::Mon,
            Self::TueThu => Weekday::Tue,
        }
    }

    /// Later weekday of the pair (slot 1 of each week).
    pub fn second(self) -> Weekday {
        match self {
            Self::MonWed => Weekday::Wed,
            Self::TueThu => Weekday::Thu,
        }
    }

    /// Days from the first weekday to the second within one week.
    fn intra_week_offset(self) -> u64 {
        // Both supported pairs are two days apart.
        2
    }
}

impl fmt::Display for WeekdayPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MonWed => write!(f, "mon-wed"),
            Self::TueThu => write!(f, "tue-thu"),
        }
    }
}

impl FromStr for WeekdayPair {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mon-wed" | "monday-wednesday" => Ok(Self::MonWed),
            "tue-thu" | "tuesday-thursday" => Ok(Self::TueThu),
            other => Err(format!(
                "unknown weekday pair {other:?} (expected mon-wed or tue-thu)"
            )),
        }
    }
}

/// One scheduled publishing opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingSlot {
    /// 1-based position across the entire plan, strictly increasing with
    /// date.
    pub sequence: usize,
    /// 1-based week number.
    pub week: usize,
    /// 0 for the week's first weekday, 1 for the second.
    pub slot_in_week: u8,
    /// Calendar date. No time-of-day component, so there is nothing to drift
    /// across timezones.
    pub date: NaiveDate,
}

/// Errors from schedule generation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// Defensive: unreachable through validated requests.
    #[error("invalid schedule length: {0} weeks (must be at least 1)")]
    InvalidLength(usize),
}

/// Number of days to advance from `from` to reach the next `target` weekday,
/// counting `from` itself as a candidate.
fn days_until_weekday(from: NaiveDate, target: Weekday) -> u64 {
    let from_idx = from.weekday().num_days_from_monday();
    let target_idx = target.num_days_from_monday();
    u64::from((target_idx + 7 - from_idx) % 7)
}

/// Generate the ordered, gapless posting-slot sequence.
///
/// Produces exactly `2 * num_weeks` slots in strictly chronological order.
/// `sequence` is assigned by final chronological order and cross-checked
/// after generation; a violation would be a programming error, so it panics
/// only in debug builds via `debug_assert`.
pub fn build_schedule(
    start: NaiveDate,
    pair: WeekdayPair,
    num_weeks: usize,
) -> Result<Vec<PostingSlot>, ScheduleError> {
    if num_weeks == 0 {
        return Err(ScheduleError::InvalidLength(num_weeks));
    }

    let anchor = start + Days::new(days_until_weekday(start, pair.first()));
    let intra = pair.intra_week_offset();

    let mut slots = Vec::with_capacity(num_weeks * 2);
    for week in 0..num_weeks {
        let first = anchor + Days::new(week as u64 * 7);
        slots.push(PostingSlot {
            sequence: 0,
            week: week + 1,
            slot_in_week: 0,
            date: first,
        });
        slots.push(PostingSlot {
            sequence: 0,
            week: week + 1,
            slot_in_week: 1,
            date: first + Days::new(intra),
        });
    }

    // Sequence follows chronological order. The per-week construction is
    // already chronological; the sort is the correctness guarantee.
    slots.sort_by_key(|s| s.date);
    for (i, slot) in slots.iter_mut().enumerate() {
        slot.sequence = i + 1;
    }
    debug_assert!(slots.windows(2).all(|w| w[0].date < w[1].date));

    Ok(slots)
}
