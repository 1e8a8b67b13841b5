//! Post-generation normalization.
//!
//! The model's output is trusted for content but not for bookkeeping: week
//! numbers get renumbered to the requested absolute range, and hashtag
//! tokens are lowercased so exports and duplicate checks compare cleanly.
//! Both operations are idempotent.

use super::types::{Post, WeekPlan};

/// Lowercase every hashtag token in `text`.
///
/// A hashtag token is `#` followed by alphanumerics/underscores; the token
/// ends at the first other character. Text outside hashtags is untouched.
pub fn normalize_hashtags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        if in_tag {
            if c.is_alphanumeric() || c == '_' {
                out.extend(c.to_lowercase());
                continue;
            }
            in_tag = false;
        }
        if c == '#' {
            in_tag = true;
        }
        out.push(c);
    }
    out
}

/// Apply hashtag normalization to every text field of a post.
pub fn normalize_post(post: &mut Post) {
    post.title = normalize_hashtags(&post.title);
    post.caption = normalize_hashtags(&post.caption);
    if let Some(ideas) = &post.photo_ideas {
        post.photo_ideas = Some(normalize_hashtags(ideas));
    }
}

/// Force week numbers to the absolute indices of the requested range.
///
/// Models asked for weeks 5..=8 routinely label them 1..=4 (or all 1); the
/// generated order within the batch is trusted, the labels are not.
pub fn renumber_weeks(weeks: &mut [WeekPlan], first_week: usize) {
    for (offset, week) in weeks.iter_mut().enumerate() {
        week.week = first_week + offset;
    }
}
