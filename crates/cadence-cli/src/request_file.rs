//! Plan-request TOML parsing.
//!
//! A plan request file looks like:
//!
//! ```toml
//! [practice]
//! name = "Lakeside Dental"
//! website = "lakesidedental.example"
//! phone = "555-0100"             # optional
//! location = "Madison, WI"       # optional
//! special_instructions = "..."   # optional
//! onboarding_doc = "notes.txt"   # optional, path relative to this file
//! past_posts_doc = "posts.txt"   # optional
//!
//! [schedule]
//! start_date = "2024-09-01"
//! weekday_pair = "tue-thu"
//! weeks = 12                     # optional, default 12
//!
//! [[milestones]]
//! name = "Dr. Patel"
//! kind = "birthday"
//! month = 10
//! day = 14
//! ```
//!
//! Milestones may also be given as free-text `lines = ["Dr. Patel - birthday
//! - 10/14"]` under `[schedule]`. Document paths are extracted here so a
//! per-file failure is reported per file and does not block the other.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use cadence_core::calendar::{parse_milestone_line, Milestone, WeekdayPair};
use cadence_core::document::{DocumentExtractor, PlainTextExtractor};
use cadence_core::plan::{PlanRequest, PracticeProfile};

const DEFAULT_WEEKS: usize = 12;

/// Errors from reading and validating a request file.
#[derive(Debug, Error)]
pub enum RequestFileError {
    #[error("failed to read request file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid start date {0:?} (expected YYYY-MM-DD)")]
    InvalidStartDate(String),

    #[error("invalid weekday pair: {0}")]
    InvalidWeekdayPair(String),

    #[error("invalid milestone: {0}")]
    InvalidMilestone(#[from] cadence_core::calendar::MilestoneParseError),

    #[error(transparent)]
    Validation(#[from] cadence_core::plan::RequestValidationError),
}

#[derive(Debug, Deserialize)]
struct RequestToml {
    practice: PracticeToml,
    schedule: ScheduleToml,
    #[serde(default)]
    milestones: Vec<MilestoneToml>,
}

#[derive(Debug, Deserialize)]
struct PracticeToml {
    name: String,
    website: String,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    special_instructions: Option<String>,
    #[serde(default)]
    onboarding_doc: Option<PathBuf>,
    #[serde(default)]
    past_posts_doc: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ScheduleToml {
    /// ISO date string; TOML's native date type does not round-trip
    /// through serde into chrono.
    start_date: String,
    weekday_pair: String,
    #[serde(default)]
    weeks: Option<usize>,
    /// Free-text milestone lines, one event per entry.
    #[serde(default)]
    lines: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MilestoneToml {
    name: String,
    #[serde(default = "default_kind")]
    kind: String,
    month: u32,
    day: u32,
}

fn default_kind() -> String {
    "other".to_string()
}

impl MilestoneToml {
    fn into_milestone(self) -> Milestone {
        let kind = match self.kind.to_ascii_lowercase().as_str() {
            "birthday" => cadence_core::calendar::MilestoneKind::Birthday,
            "anniversary" => cadence_core::calendar::MilestoneKind::Anniversary,
            _ => cadence_core::calendar::MilestoneKind::Other,
        };
        Milestone {
            name: self.name,
            kind,
            month: self.month,
            day: self.day,
        }
    }
}

/// Extract one optional document, relative to the request file's directory.
/// Extraction failures are warnings, not fatal: the plan proceeds without
/// that context.
fn extract_doc(base_dir: &Path, path: Option<&Path>, label: &str) -> Option<String> {
    let path = path?;
    let resolved = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    };
    let bytes = match std::fs::read(&resolved) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(doc = label, path = %resolved.display(), error = %e, "cannot read document, skipping");
            return None;
        }
    };
    match PlainTextExtractor.extract(&bytes) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(doc = label, path = %resolved.display(), error = %e, "cannot extract document, skipping");
            None
        }
    }
}

/// Parse and validate a request file into a ready-to-run [`PlanRequest`].
pub fn load_request(path: &Path) -> Result<PlanRequest, RequestFileError> {
    let contents = std::fs::read_to_string(path).map_err(|e| RequestFileError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let parsed: RequestToml = toml::from_str(&contents)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let start_date = NaiveDate::parse_from_str(&parsed.schedule.start_date, "%Y-%m-%d")
        .map_err(|_| RequestFileError::InvalidStartDate(parsed.schedule.start_date.clone()))?;
    let weekday_pair: WeekdayPair = parsed
        .schedule
        .weekday_pair
        .parse()
        .map_err(RequestFileError::InvalidWeekdayPair)?;

    let mut milestones: Vec<Milestone> = parsed
        .milestones
        .into_iter()
        .map(MilestoneToml::into_milestone)
        .collect();
    for line in &parsed.schedule.lines {
        milestones.push(parse_milestone_line(line)?);
    }

    let profile = PracticeProfile {
        name: parsed.practice.name,
        website: parsed.practice.website,
        phone: parsed.practice.phone,
        location: parsed.practice.location,
        special_instructions: parsed.practice.special_instructions,
        onboarding_text: extract_doc(
            base_dir,
            parsed.practice.onboarding_doc.as_deref(),
            "onboarding",
        ),
        past_posts_text: extract_doc(
            base_dir,
            parsed.practice.past_posts_doc.as_deref(),
            "past-posts",
        ),
    };

    let request = PlanRequest {
        profile,
        start_date,
        weekday_pair,
        num_weeks: parsed.schedule.weeks.unwrap_or(DEFAULT_WEEKS),
        milestones,
    };
    request.validate()?;
    Ok(request)
}
