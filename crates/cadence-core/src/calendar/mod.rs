//! Deterministic calendar math: holidays, posting slots, milestones, and the
//! anchor-to-slot alignment resolver.

pub mod align;
pub mod holiday;
pub mod milestone;
pub mod schedule;

pub use align::{align, facts_order, AlignmentAssignment, Anchor, AnchorKind, SlotRelation};
pub use holiday::{easter_sunday, holidays_in_range, Holiday, HolidayRule};
pub use milestone::{parse_milestone_line, Milestone, MilestoneKind, MilestoneParseError};
pub use schedule::{build_schedule, PostingSlot, ScheduleError, WeekdayPair};
