//! The saved plan document: the session artifact `cadence plan` writes and
//! `cadence regenerate` / `cadence export` read back.
//!
//! Holds the request alongside the plan so regeneration can recompute the
//! schedule and alignment deterministically from the same inputs.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use cadence_core::calendar::{AlignmentAssignment, PostingSlot};
use cadence_core::plan::{ContentPlan, PlanRequest};

#[derive(Debug, Serialize, Deserialize)]
pub struct PlanDocument {
    pub request: PlanRequest,
    pub slots: Vec<PostingSlot>,
    pub assignments: Vec<AlignmentAssignment>,
    pub plan: ContentPlan,
}

pub fn load_plan(path: &Path) -> Result<PlanDocument> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read plan file at {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse plan file at {}", path.display()))
}

pub fn save_plan(path: &Path, document: &PlanDocument) -> Result<()> {
    let contents = serde_json::to_string_pretty(document).context("failed to serialize plan")?;
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write plan file at {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::calendar::WeekdayPair;
    use cadence_core::plan::{Post, PracticeProfile, WeekPlan};
    use chrono::NaiveDate;

    #[test]
    fn plan_document_round_trips() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("plan.json");
        let document = PlanDocument {
            request: PlanRequest {
                profile: PracticeProfile {
                    name: "Lakeside Dental".into(),
                    website: "lakesidedental.example".into(),
                    ..PracticeProfile::default()
                },
                start_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
                weekday_pair: WeekdayPair::TueThu,
                num_weeks: 1,
                milestones: vec![],
            },
            slots: vec![],
            assignments: vec![],
            plan: ContentPlan {
                weeks: vec![WeekPlan {
                    week: 1,
                    posts: vec![
                        Post { title: "a".into(), caption: "b".into(), photo_ideas: None },
                        Post { title: "c".into(), caption: "d".into(), photo_ideas: Some("e".into()) },
                    ],
                }],
            },
        };
        save_plan(&path, &document).unwrap();
        let back = load_plan(&path).unwrap();
        assert_eq!(back.request, document.request);
        assert_eq!(back.plan, document.plan);
    }

    #[test]
    fn missing_plan_file_is_a_readable_error() {
        let err = load_plan(Path::new("/nonexistent/plan.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/plan.json"));
    }
}
