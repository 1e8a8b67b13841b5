//! User-declared milestones: recurring personal events (birthdays, work
//! anniversaries) that compete for posting slots exactly like holidays.
//!
//! Milestones arrive either structured (request-file tables) or as free
//! text, one per line. Only month and day matter for recurrence; a trailing
//! year in the free-text form is accepted and ignored.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category tag for a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneKind {
    Birthday,
    Anniversary,
    Other,
}

impl MilestoneKind {
    fn parse(s: &str) -> Self {
        let s = s.trim().to_ascii_lowercase();
        if s.contains("birth") {
            Self::Birthday
        } else if s.contains("annivers") {
            Self::Anniversary
        } else {
            Self::Other
        }
    }
}

/// A recurring personal event with a month/day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub name: String,
    pub kind: MilestoneKind,
    pub month: u32,
    pub day: u32,
}

/// Errors from free-text milestone parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MilestoneParseError {
    #[error("milestone line {0:?} has no date part (expected `Name - kind - MM/DD`)")]
    MissingDate(String),
    #[error("milestone line {0:?} has an empty name")]
    MissingName(String),
    #[error("invalid month/day {month}/{day} in milestone line {line:?}")]
    InvalidDate { line: String, month: u32, day: u32 },
}

/// Parse one free-text milestone line.
///
/// Accepted shapes: `Name - kind - MM/DD`, `Name, kind, MM/DD/YYYY`, and
/// `Name - MM/DD` (kind defaults to `Other`). Fields split on `-` or `,`;
/// the last field must contain the `MM/DD` date, any middle field is the
/// kind tag.
pub fn parse_milestone_line(line: &str) -> Result<Milestone, MilestoneParseError> {
    let fields: Vec<&str> = line
        .split(|c| c == '-' || c == ',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();

    let (date_field, rest) = fields
        .split_last()
        .ok_or_else(|| MilestoneParseError::MissingDate(line.to_string()))?;

    let (month, day) =
        parse_month_day(date_field).ok_or_else(|| MilestoneParseError::MissingDate(line.to_string()))?;
    // Validate against a leap year so 2/29 stays representable.
    if NaiveDate::from_ymd_opt(2024, month, day).is_none() {
        return Err(MilestoneParseError::InvalidDate {
            line: line.to_string(),
            month,
            day,
        });
    }

    let name = rest
        .first()
        .map(|s| s.to_string())
        .ok_or_else(|| MilestoneParseError::MissingName(line.to_string()))?;
    let kind = rest
        .get(1)
        .map(|s| MilestoneKind::parse(s))
        .unwrap_or(MilestoneKind::Other);

    Ok(Milestone { name, kind, month, day })
}

/// Parse `MM/DD` with an optional ignored `/YYYY` suffix.
fn parse_month_day(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let day: u32 = parts.next()?.trim().parse().ok()?;
    // A third component, if present, is a year; accepted and ignored.
    Some((month, day))
}

impl Milestone {
    /// Concrete occurrences of this milestone inside `[start, end]`
    /// inclusive, ascending. Feb 29 clamps to Feb 28 in non-leap years.
    pub fn occurrences_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut out = Vec::new();
        for year in (start.year() - 1)..=(end.year() + 1) {
            let date = NaiveDate::from_ymd_opt(year, self.month, self.day).or_else(|| {
                // Feb 29 in a non-leap year.
                (self.month == 2 && self.day == 29)
                    .then(|| NaiveDate::from_ymd_opt(year, 2, 28))
                    .flatten()
            });
            if let Some(date) = date {
                if date >= start && date <= end {
                    out.push(date);
                }
            }
        }
        out
    }
}
