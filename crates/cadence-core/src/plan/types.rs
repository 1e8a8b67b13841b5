//! Plan data model: practice facts, requests, and the assembled plan.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::{Milestone, WeekdayPair};

/// Facts about the practice the plan is for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeProfile {
    /// Display name. Required, non-empty.
    pub name: String,
    /// Canonical lookup identity for research caching. Required.
    pub website: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Free-text instructions passed through to the generator verbatim.
    #[serde(default)]
    pub special_instructions: Option<String>,
    /// Extracted onboarding-document text, treated as an opaque context
    /// string.
    #[serde(default)]
    pub onboarding_text: Option<String>,
    /// Extracted past-posts text, likewise opaque.
    #[serde(default)]
    pub past_posts_text: Option<String>,
}

/// Everything needed to generate one plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub profile: PracticeProfile,
    pub start_date: NaiveDate,
    pub weekday_pair: WeekdayPair,
    pub num_weeks: usize,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
}

/// Pre-flight request validation failures. Raised before any external call,
/// so no partial state is ever created.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestValidationError {
    #[error("practice name is required")]
    MissingPracticeName,
    #[error("practice website is required")]
    MissingWebsite,
    #[error("plan length must be at least 1 week")]
    ZeroWeeks,
}

impl PlanRequest {
    /// Validate required fields.
    pub fn validate(&self) -> Result<(), RequestValidationError> {
        if self.profile.name.trim().is_empty() {
            return Err(RequestValidationError::MissingPracticeName);
        }
        if self.profile.website.trim().is_empty() {
            return Err(RequestValidationError::MissingWebsite);
        }
        if self.num_weeks == 0 {
            return Err(RequestValidationError::ZeroWeeks);
        }
        Ok(())
    }
}

/// One generated post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    pub caption: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_ideas: Option<String>,
}

/// One week of the plan: exactly two posts once validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekPlan {
    /// 1-based absolute week number within the plan.
    pub week: usize,
    pub posts: Vec<Post>,
}

/// The full ordered plan. `(week_index, post_index)` maps 1:1 to a posting
/// slot's sequence: `sequence = week_index * 2 + post_index + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPlan {
    pub weeks: Vec<WeekPlan>,
}

impl ContentPlan {
    /// Borrow a post by zero-based week/post indices.
    pub fn post(&self, week_index: usize, post_index: usize) -> Option<&Post> {
        self.weeks.get(week_index)?.posts.get(post_index)
    }

    /// Iterate `(week_index, post_index, post)` in plan order.
    pub fn iter_posts(&self) -> impl Iterator<Item = (usize, usize, &Post)> {
        self.weeks.iter().enumerate().flat_map(|(wi, week)| {
            week.posts
                .iter()
                .enumerate()
                .map(move |(pi, post)| (wi, pi, post))
        })
    }
}
