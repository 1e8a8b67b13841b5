//! Tolerant parsing of model output.
//!
//! Models are asked for bare JSON but routinely wrap it in markdown code
//! fences and occasionally emit raw control characters inside string
//! literals. The contract here: strip fences, try a standard parse, and on
//! failure apply exactly one structural repair (escape bare control
//! characters inside string literals) before retrying once. Anything still
//! unparseable after that is fatal for the request.

use serde::Deserialize;

use super::trait_def::GenerateError;
use crate::plan::types::{Post, WeekPlan};

/// Wire shape for a full-plan or batch response.
#[derive(Debug, Deserialize)]
struct WeeksPayload {
    weeks: Vec<WeekPayload>,
}

#[derive(Debug, Deserialize)]
struct WeekPayload {
    week: usize,
    posts: Vec<PostPayload>,
}

/// Wire shape for one post, shared by batch and single-post responses.
#[derive(Debug, Deserialize)]
struct PostPayload {
    title: String,
    caption: String,
    #[serde(default, rename = "photoIdeas")]
    photo_ideas: Option<String>,
}

impl From<PostPayload> for Post {
    fn from(p: PostPayload) -> Self {
        Self {
            title: p.title,
            caption: p.caption,
            photo_ideas: p.photo_ideas,
        }
    }
}

/// Strip a leading/trailing markdown code fence, if any.
///
/// Handles ```json, bare ```, and surrounding prose-free whitespace. Text
/// without fences passes through untouched.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") up to the first newline.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Escape bare control characters inside JSON string literals.
///
/// Models sometimes emit literal newlines or tabs inside a string value,
/// which standard JSON forbids. Characters outside string literals are left
/// alone so structural whitespace survives.
pub fn repair_json(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
                out.push(c);
                continue;
            }
            match c {
                '\\' => {
                    escaped = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if (c as u32) < 0x20 => {
                    out.push_str(&format!("\\u{:04x}", c as u32));
                }
                c => out.push(c),
            }
        } else {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
        }
    }
    out
}

/// Parse with the one-repair-then-retry policy.
fn parse_tolerant<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    let body = strip_code_fences(text);
    match serde_json::from_str(body) {
        Ok(v) => Ok(v),
        Err(_) => serde_json::from_str(&repair_json(body)),
    }
}

/// Summarize response text for error messages without dumping whole
/// payloads into logs.
fn found_summary(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "empty text".to_string();
    }
    let head: String = trimmed.chars().take(80).collect();
    if trimmed.chars().count() > 80 {
        format!("{head:?}... ({} chars)", trimmed.chars().count())
    } else {
        format!("{head:?}")
    }
}

/// Parse a batch response into week plans.
///
/// Requires a non-empty `weeks` array where every week holds exactly two
/// posts. Week numbers are taken as-is here; the orchestrator renumbers
/// them to the requested absolute range afterwards.
pub fn parse_weeks(text: &str) -> Result<Vec<WeekPlan>, GenerateError> {
    if text.trim().is_empty() {
        return Err(GenerateError::EmptyResponse);
    }
    let payload: WeeksPayload =
        parse_tolerant(text).map_err(|_| GenerateError::MalformedResponse {
            expected: "JSON object with a `weeks` array".to_string(),
            found: found_summary(text),
        })?;
    if payload.weeks.is_empty() {
        return Err(GenerateError::MalformedResponse {
            expected: "at least one entry in `weeks`".to_string(),
            found: "empty `weeks` array".to_string(),
        });
    }
    let mut weeks = Vec::with_capacity(payload.weeks.len());
    for week in payload.weeks {
        if week.posts.len() != 2 {
            return Err(GenerateError::MalformedResponse {
                expected: format!("exactly 2 posts in week {}", week.week),
                found: format!("{} posts", week.posts.len()),
            });
        }
        weeks.push(WeekPlan {
            week: week.week,
            posts: week.posts.into_iter().map(Post::from).collect(),
        });
    }
    Ok(weeks)
}

/// Parse a single-post response: a bare `{title, caption, photoIdeas?}`.
pub fn parse_single_post(text: &str) -> Result<Post, GenerateError> {
    if text.trim().is_empty() {
        return Err(GenerateError::EmptyResponse);
    }
    let payload: PostPayload =
        parse_tolerant(text).map_err(|_| GenerateError::MalformedResponse {
            expected: "JSON object with `title` and `caption`".to_string(),
            found: found_summary(text),
        })?;
    Ok(payload.into())
}
