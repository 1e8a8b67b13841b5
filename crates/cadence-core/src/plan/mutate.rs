//! In-place plan edits and in-flight regeneration tracking.
//!
//! `edit_field` is pure: it returns a new plan with only the targeted field
//! changed, so callers can diff or roll back freely. `InFlightSlots` is the
//! shared set of slots currently regenerating; claims are RAII guards so a
//! panicked or failed regeneration always releases its slot.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use super::types::ContentPlan;

/// Which post field an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostField {
    Title,
    Caption,
    PhotoIdeas,
}

/// Errors from plan mutation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MutateError {
    #[error("no post at week {week_index}, post {post_index}")]
    OutOfRange { week_index: usize, post_index: usize },
}

/// Return a new plan with one field of one post replaced.
///
/// Every other post compares equal to the input plan's. Indices are
/// zero-based.
pub fn edit_field(
    plan: &ContentPlan,
    week_index: usize,
    post_index: usize,
    field: PostField,
    value: String,
) -> Result<ContentPlan, MutateError> {
    let mut next = plan.clone();
    let post = next
        .weeks
        .get_mut(week_index)
        .and_then(|w| w.posts.get_mut(post_index))
        .ok_or(MutateError::OutOfRange { week_index, post_index })?;
    match field {
        PostField::Title => post.title = value,
        PostField::Caption => post.caption = value,
        PostField::PhotoIdeas => post.photo_ideas = Some(value),
    }
    Ok(next)
}

/// Replace one post wholesale, leaving the rest untouched.
pub fn replace_post(
    plan: &ContentPlan,
    week_index: usize,
    post_index: usize,
    post: super::types::Post,
) -> Result<ContentPlan, MutateError> {
    let mut next = plan.clone();
    let target = next
        .weeks
        .get_mut(week_index)
        .and_then(|w| w.posts.get_mut(post_index))
        .ok_or(MutateError::OutOfRange { week_index, post_index })?;
    *target = post;
    Ok(next)
}

/// Identity of a slot being regenerated.
pub type SlotKey = (usize, usize);

/// Shared set of slots with a regeneration in flight.
///
/// Each regeneration is independent and keyed by `(week_index,
/// post_index)`; completion of one never blocks or corrupts another. The
/// UI layer reads `snapshot()` to disable only the affected slots.
#[derive(Debug, Clone, Default)]
pub struct InFlightSlots {
    inner: Arc<Mutex<HashSet<SlotKey>>>,
}

/// RAII claim on one slot; dropping it releases the slot.
pub struct SlotClaim {
    set: Arc<Mutex<HashSet<SlotKey>>>,
    key: SlotKey,
}

impl Drop for SlotClaim {
    fn drop(&mut self) {
        if let Ok(mut set) = self.set.lock() {
            set.remove(&self.key);
        }
    }
}

impl InFlightSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a slot. Returns `None` if that slot already has a regeneration
    /// in flight.
    pub fn claim(&self, key: SlotKey) -> Option<SlotClaim> {
        let mut set = self.inner.lock().ok()?;
        if !set.insert(key) {
            return None;
        }
        Some(SlotClaim {
            set: Arc::clone(&self.inner),
            key,
        })
    }

    /// Whether a slot currently has a regeneration in flight.
    pub fn contains(&self, key: SlotKey) -> bool {
        self.inner.lock().map(|set| set.contains(&key)).unwrap_or(false)
    }

    /// Current in-flight slot keys, unordered.
    pub fn snapshot(&self) -> Vec<SlotKey> {
        self.inner
            .lock()
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }
}
