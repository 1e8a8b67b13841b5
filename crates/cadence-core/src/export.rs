//! Plan export: CSV rendering and filename derivation.
//!
//! The default export is the two-column caption sheet (one row per post);
//! the full export adds date, title, and photo-idea columns using the slot
//! schedule. Writers take `&mut dyn Write` so output can go to a file or
//! stdout.

use std::io::Write;

use crate::calendar::PostingSlot;
use crate::plan::types::ContentPlan;

/// Derive an export filename stem from the practice name: lowercase, runs
/// of non-alphanumerics collapsed to single hyphens.
pub fn sanitize_filename(practice_name: &str) -> String {
    let mut out = String::with_capacity(practice_name.len());
    let mut pending_hyphen = false;
    for c in practice_name.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.extend(c.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    if out.is_empty() {
        "content-plan".to_string()
    } else {
        out
    }
}

/// Quote a CSV field per RFC 4180 when it needs it.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Write the default caption-only export: `week,caption`, one row per post.
pub fn captions_csv(plan: &ContentPlan, writer: &mut dyn Write) -> std::io::Result<()> {
    writeln!(writer, "week,caption")?;
    for week in &plan.weeks {
        for post in &week.posts {
            writeln!(writer, "Week {},{}", week.week, csv_field(&post.caption))?;
        }
    }
    Ok(())
}

/// Write the rich export: week, ISO date, title, caption, photo ideas.
///
/// Rows pair with slots by plan order; a plan/schedule length mismatch
/// leaves the date column empty for the unmatched rows rather than failing
/// an otherwise useful export.
pub fn full_csv(
    plan: &ContentPlan,
    slots: &[PostingSlot],
    writer: &mut dyn Write,
) -> std::io::Result<()> {
    writeln!(writer, "week,date,title,caption,photo_ideas")?;
    let mut slot_iter = slots.iter();
    for week in &plan.weeks {
        for post in &week.posts {
            let date = slot_iter
                .next()
                .map(|s| s.date.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            writeln!(
                writer,
                "{},{},{},{},{}",
                week.week,
                date,
                csv_field(&post.title),
                csv_field(&post.caption),
                csv_field(post.photo_ideas.as_deref().unwrap_or("")),
            )?;
        }
    }
    Ok(())
}
