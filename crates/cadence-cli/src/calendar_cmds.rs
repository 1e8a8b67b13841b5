//! The `cadence holidays` and `cadence schedule` commands: read-only views
//! of the deterministic calendar core, no API key required.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use cadence_core::calendar::{
    align, build_schedule, facts_order, holidays_in_range, parse_milestone_line, Anchor,
    SlotRelation, WeekdayPair,
};

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("invalid date {value:?} (expected YYYY-MM-DD)"))
}

/// Execute `cadence holidays`: list observed holidays in a date range.
pub fn cmd_holidays(from: &str, to: &str) -> Result<()> {
    let from = parse_date(from)?;
    let to = parse_date(to)?;
    if to < from {
        anyhow::bail!("--to must not precede --from");
    }

    let holidays = holidays_in_range(from, to);
    if holidays.is_empty() {
        println!("No observed holidays between {from} and {to}.");
        return Ok(());
    }
    for holiday in &holidays {
        println!("{}  {}", holiday.date.format("%Y-%m-%d (%a)"), holiday.name);
    }
    Ok(())
}

/// Execute `cadence schedule`: print the posting slots for a window and the
/// holiday/milestone anchors each slot picks up.
pub fn cmd_schedule(
    start: &str,
    pair: &str,
    weeks: usize,
    milestones_file: Option<&Path>,
) -> Result<()> {
    let start = parse_date(start)?;
    let pair: WeekdayPair = pair.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let slots = build_schedule(start, pair, weeks)?;
    let window_end = slots.last().map(|s| s.date).unwrap_or(start);

    let mut anchors: Vec<Anchor> = holidays_in_range(start, window_end)
        .iter()
        .map(Anchor::from_holiday)
        .collect();
    if let Some(path) = milestones_file {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read milestones file {}", path.display()))?;
        for line in contents.lines().filter(|l| !l.trim().is_empty()) {
            let milestone = parse_milestone_line(line)
                .with_context(|| format!("invalid milestone line {line:?}"))?;
            for occurrence in milestone.occurrences_in_range(start, window_end) {
                anchors.push(Anchor::from_milestone(&milestone, occurrence));
            }
        }
    }

    let mut assignments = align(&slots, &anchors);
    facts_order(&mut assignments);

    println!("Posting schedule: {weeks} weeks of {pair}, starting {start}");
    for slot in &slots {
        let mut notes: Vec<String> = Vec::new();
        for assignment in &assignments {
            if assignment.slot.sequence != slot.sequence {
                continue;
            }
            let note = match assignment.relation {
                SlotRelation::Exact => format!("{} (same day)", assignment.anchor.name),
                SlotRelation::Before => format!(
                    "{} in {} day(s)",
                    assignment.anchor.name, assignment.distance_days
                ),
                SlotRelation::After => format!(
                    "{} {} day(s) ago",
                    assignment.anchor.name, assignment.distance_days
                ),
            };
            notes.push(note);
        }
        println!("{}", schedule_line(slot, &notes));
    }
    Ok(())
}

/// Render one schedule row. Post numbers are 1-based, matching prompt lines
/// and `regenerate --post`.
fn schedule_line(slot: &cadence_core::calendar::PostingSlot, notes: &[String]) -> String {
    let suffix = if notes.is_empty() {
        String::new()
    } else {
        format!("  <- {}", notes.join("; "))
    };
    format!(
        "  week {:>2} post {}  {}{}",
        slot.week,
        slot.slot_in_week + 1,
        slot.date.format("%Y-%m-%d (%a)"),
        suffix,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn schedule_lines_number_posts_from_one() {
        let slots = build_schedule(
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            WeekdayPair::MonWed,
            1,
        )
        .unwrap();
        assert_eq!(schedule_line(&slots[0], &[]), "  week  1 post 1  2024-07-01 (Mon)");
        assert_eq!(
            schedule_line(&slots[1], &["Independence Day in 9 day(s)".to_string()]),
            "  week  1 post 2  2024-07-03 (Wed)  <- Independence Day in 9 day(s)"
        );
    }
}
