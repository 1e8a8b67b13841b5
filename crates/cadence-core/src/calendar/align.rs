//! Anchor-to-slot alignment.
//!
//! Each anchor event (holiday or milestone occurrence) is assigned to at
//! most one posting slot. The resolver prefers the latest slot that does not
//! fall after the anchor: a holiday-themed post must not appear to originate
//! after the holiday has passed, so anticipatory placement is a hard product
//! constraint rather than an arbitrary tie-break. A slot after the anchor is
//! chosen only when no slot on or before it exists in range.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::holiday::Holiday;
use super::milestone::{Milestone, MilestoneKind};
use super::schedule::PostingSlot;

/// What kind of event an anchor is. Holidays outrank milestones when
/// several anchors share a slot (see [`facts_order`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorKind {
    Holiday,
    Milestone,
}

/// A named calendar event competing for placement onto a posting slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub name: String,
    pub date: NaiveDate,
    pub kind: AnchorKind,
}

impl Anchor {
    pub fn from_holiday(h: &Holiday) -> Self {
        Self {
            name: h.name.clone(),
            date: h.date,
            kind: AnchorKind::Holiday,
        }
    }

    /// One anchor per concrete occurrence of a milestone inside the plan
    /// window.
    pub fn from_milestone(m: &Milestone, occurrence: NaiveDate) -> Self {
        let label = match m.kind {
            MilestoneKind::Birthday => format!("{} (birthday)", m.name),
            MilestoneKind::Anniversary => format!("{} (anniversary)", m.name),
            MilestoneKind::Other => m.name.clone(),
        };
        Self {
            name: label,
            date: occurrence,
            kind: AnchorKind::Milestone,
        }
    }
}

/// How a chosen slot relates to its anchor's date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotRelation {
    /// Slot date equals the anchor date.
    Exact,
    /// Slot date is before the anchor date (the preferred direction).
    Before,
    /// Slot date is after the anchor date; chosen only because no valid
    /// before-slot exists in range.
    After,
}

/// The result of resolving one anchor against the slot sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentAssignment {
    pub anchor: Anchor,
    pub slot: PostingSlot,
    pub relation: SlotRelation,
    pub distance_days: u64,
}

/// Resolve every anchor against the slot sequence.
///
/// Per anchor: the latest slot with `slot.date <= anchor.date` wins
/// (`Exact` on equality, `Before` otherwise); if no such slot exists, the
/// nearest later slot wins with relation `After`; if there are no slots at
/// all, the anchor yields no assignment. Anchors outside the slot range are
/// not an error, merely unaddressed. Output order follows input anchor
/// order, so identical inputs produce identical output.
pub fn align(slots: &[PostingSlot], anchors: &[Anchor]) -> Vec<AlignmentAssignment> {
    let mut out = Vec::with_capacity(anchors.len());
    for anchor in anchors {
        let before = slots
            .iter()
            .filter(|s| s.date <= anchor.date)
            .max_by_key(|s| s.date);
        let chosen = match before {
            Some(slot) => Some((slot, if slot.date == anchor.date {
                SlotRelation::Exact
            } else {
                SlotRelation::Before
            })),
            None => slots
                .iter()
                .filter(|s| s.date > anchor.date)
                .min_by_key(|s| s.date)
                .map(|slot| (slot, SlotRelation::After)),
        };
        if let Some((slot, relation)) = chosen {
            let distance_days = (slot.date - anchor.date).num_days().unsigned_abs();
            out.push(AlignmentAssignment {
                anchor: anchor.clone(),
                slot: *slot,
                relation,
                distance_days,
            });
        }
    }
    out
}

/// Order assignments for presentation as scheduling facts: by slot sequence,
/// then holidays before milestones, then anchor date, then name. This is the
/// resolved priority rule for several anchors sharing one slot.
pub fn facts_order(assignments: &mut [AlignmentAssignment]) {
    assignments.sort_by(|a, b| {
        a.slot
            .sequence
            .cmp(&b.slot.sequence)
            .then_with(|| a.anchor.kind.cmp(&b.anchor.kind))
            .then_with(|| a.anchor.date.cmp(&b.anchor.date))
            .then_with(|| a.anchor.name.cmp(&b.anchor.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::schedule::{build_schedule, WeekdayPair};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn anchor(name: &str, date: NaiveDate) -> Anchor {
        Anchor {
            name: name.into(),
            date,
            kind: AnchorKind::Holiday,
        }
    }

    #[test]
    fn prefers_before_when_anchor_falls_between_slots() {
        // 2024-12-23 is a Monday, so the week's slots land on 12/23 and
        // 12/25.
        let slots = build_schedule(d(2024, 12, 23), WeekdayPair::MonWed, 1).unwrap();
        assert_eq!(slots[0].date, d(2024, 12, 23));
        assert_eq!(slots[1].date, d(2024, 12, 25));

        // Christmas Eve sits strictly between the two slots.
        let got = align(&slots, &[anchor("Christmas Eve", d(2024, 12, 24))]);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].slot.date, d(2024, 12, 23));
        assert_eq!(got[0].relation, SlotRelation::Before);
        assert_eq!(got[0].distance_days, 1);
    }

    #[test]
    fn exact_match_wins_with_zero_distance() {
        let slots = build_schedule(d(2024, 12, 23), WeekdayPair::MonWed, 1).unwrap();
        let got = align(&slots, &[anchor("Christmas", d(2024, 12, 25))]);
        assert_eq!(got[0].relation, SlotRelation::Exact);
        assert_eq!(got[0].distance_days, 0);
        assert_eq!(got[0].slot.date, d(2024, 12, 25));
    }

    #[test]
    fn anchor_before_all_slots_takes_nearest_after() {
        let slots = build_schedule(d(2024, 7, 1), WeekdayPair::MonWed, 2).unwrap();
        // Anchor precedes the entire range.
        let got = align(&slots, &[anchor("Pre-range", d(2024, 6, 25))]);
        assert_eq!(got[0].relation, SlotRelation::After);
        assert_eq!(got[0].slot.date, d(2024, 7, 1));
        assert_eq!(got[0].distance_days, 6);
    }

    #[test]
    fn anchor_with_no_slots_yields_no_assignment() {
        let got = align(&[], &[anchor("Nowhere", d(2024, 1, 1))]);
        assert!(got.is_empty());
    }

    #[test]
    fn anchor_after_all_slots_takes_latest_before() {
        let slots = build_schedule(d(2024, 7, 1), WeekdayPair::MonWed, 1).unwrap();
        // Anchor weeks after the range still lands on the last slot.
        let got = align(&slots, &[anchor("Late", d(2024, 8, 30))]);
        assert_eq!(got[0].relation, SlotRelation::Before);
        assert_eq!(got[0].slot.date, d(2024, 7, 3));
    }

    #[test]
    fn at_most_one_assignment_per_anchor_and_deterministic() {
        let slots = build_schedule(d(2024, 9, 2), WeekdayPair::MonWed, 12).unwrap();
        let anchors = vec![
            anchor("Halloween", d(2024, 10, 31)),
            anchor("Veterans Day", d(2024, 11, 11)),
            anchor("Thanksgiving", d(2024, 11, 28)),
        ];
        let a = align(&slots, &anchors);
        let b = align(&slots, &anchors);
        assert_eq!(a, b);
        assert_eq!(a.len(), anchors.len());
    }

    #[test]
    fn multiple_anchors_may_share_a_slot() {
        let slots = build_schedule(d(2024, 12, 23), WeekdayPair::MonWed, 1).unwrap();
        let anchors = vec![
            anchor("Christmas Eve", d(2024, 12, 24)),
            Anchor {
                name: "Dr. Patel (birthday)".into(),
                date: d(2024, 12, 24),
                kind: AnchorKind::Milestone,
            },
        ];
        let got = align(&slots, &anchors);
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].slot.sequence, got[1].slot.sequence);
    }

    #[test]
    fn facts_order_puts_holidays_before_milestones_on_shared_slots() {
        let slots = build_schedule(d(2024, 12, 23), WeekdayPair::MonWed, 1).unwrap();
        let anchors = vec![
            Anchor {
                name: "Maria (anniversary)".into(),
                date: d(2024, 12, 23),
                kind: AnchorKind::Milestone,
            },
            anchor("Christmas Eve", d(2024, 12, 24)),
        ];
        let mut got = align(&slots, &anchors);
        facts_order(&mut got);
        assert_eq!(got[0].anchor.kind, AnchorKind::Holiday);
        assert_eq!(got[1].anchor.kind, AnchorKind::Milestone);
    }
}
