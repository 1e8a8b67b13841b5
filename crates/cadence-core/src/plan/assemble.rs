//! Plan assembly: batch fan-out to the generator and merge of the results.
//!
//! A full plan is split into week-range batches dispatched concurrently.
//! Whatever order the batches complete in, concatenation follows week order;
//! a failure in any batch fails the whole operation, so a partial plan is
//! never surfaced. Responses are parsed tolerantly, validated against the
//! requested range, renumbered, and hashtag-normalized before merging.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info};

use crate::calendar::{AlignmentAssignment, PostingSlot};
use crate::generator::{parse, prompt, GenerateError, Generator};
use crate::plan::normalize;
use crate::plan::types::{ContentPlan, Post, WeekPlan};

/// Knobs for plan assembly.
#[derive(Debug, Clone)]
pub struct AssembleConfig {
    /// Weeks per generation request. 12-week plans default to 3 concurrent
    /// batches of 4.
    pub batch_weeks: usize,
}

impl Default for AssembleConfig {
    fn default() -> Self {
        Self { batch_weeks: 4 }
    }
}

/// Inclusive week ranges covering `1..=num_weeks` in `batch_weeks` chunks.
fn week_batches(num_weeks: usize, batch_weeks: usize) -> Vec<(usize, usize)> {
    let step = batch_weeks.max(1);
    let mut out = Vec::new();
    let mut first = 1;
    while first <= num_weeks {
        let last = (first + step - 1).min(num_weeks);
        out.push((first, last));
        first = last + 1;
    }
    out
}

/// Generate, parse, and normalize one batch of weeks.
async fn generate_batch(
    generator: Arc<dyn Generator>,
    request: crate::generator::GenerationRequest,
    range: (usize, usize),
) -> Result<Vec<WeekPlan>, GenerateError> {
    debug!(first = range.0, last = range.1, "dispatching batch");
    let text = generator.generate(&request).await?;
    let mut weeks = parse::parse_weeks(&text)?;

    let expected_weeks = range.1 - range.0 + 1;
    if weeks.len() != expected_weeks {
        return Err(GenerateError::MalformedResponse {
            expected: format!("{expected_weeks} weeks for range {}..={}", range.0, range.1),
            found: format!("{} weeks", weeks.len()),
        });
    }

    normalize::renumber_weeks(&mut weeks, range.0);
    for week in &mut weeks {
        for post in &mut week.posts {
            normalize::normalize_post(post);
        }
    }
    debug!(first = range.0, last = range.1, "batch complete");
    Ok(weeks)
}

/// Assemble a full plan from the resolved schedule.
///
/// `slots` and `assignments` are the complete plan-wide sets, and every
/// batch prompt carries all of them: a batch writing weeks 1-2 must still
/// know a holiday is pinned to a week-4 slot, or it would theme one of its
/// own posts around it. Only the task line narrows each request to its week
/// range. Week numbers in the result run 1..=num_weeks regardless of how
/// the model labeled them.
pub async fn assemble(
    generator: Arc<dyn Generator>,
    ctx: &prompt::PromptContext,
    slots: &[PostingSlot],
    assignments: &[AlignmentAssignment],
    num_weeks: usize,
    config: &AssembleConfig,
) -> Result<ContentPlan, GenerateError> {
    let batches = week_batches(num_weeks, config.batch_weeks);
    info!(
        weeks = num_weeks,
        batches = batches.len(),
        generator = generator.name(),
        "assembling content plan"
    );

    let futures = batches.into_iter().map(|range| {
        let request = prompt::weeks_prompt(ctx, slots, assignments, range);
        generate_batch(Arc::clone(&generator), request, range)
    });

    // try_join_all returns results in dispatch order (week order), whatever
    // order the batches actually completed in, and short-circuits on the
    // first failure.
    let batch_results = try_join_all(futures).await?;
    let weeks: Vec<WeekPlan> = batch_results.into_iter().flatten().collect();
    debug_assert!(weeks.windows(2).all(|w| w[0].week + 1 == w[1].week));

    Ok(ContentPlan { weeks })
}

/// Generate one replacement post: the degenerate single-slot case of the
/// same contract, with full duplicate-avoidance context from the rest of
/// the plan.
pub async fn generate_single_post(
    generator: Arc<dyn Generator>,
    ctx: &prompt::PromptContext,
    slot: &PostingSlot,
    assignments: &[AlignmentAssignment],
    plan: &ContentPlan,
    week_index: usize,
    post_index: usize,
    instructions: Option<&str>,
) -> Result<Post, GenerateError> {
    let request = prompt::single_post_prompt(
        ctx,
        slot,
        assignments,
        plan,
        week_index,
        post_index,
        instructions,
    );
    let text = generator.generate(&request).await?;
    let mut post = parse::parse_single_post(&text)?;
    normalize::normalize_post(&mut post);
    Ok(post)
}
