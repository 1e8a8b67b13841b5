//! Prompt construction for plan and single-post generation.
//!
//! The scheduling facts computed by the calendar core are passed to the
//! model as non-negotiable: the prompt states outright that holiday and
//! milestone placements may not be moved to a different slot. Free-text
//! context (research summary, onboarding/past-posts text, special
//! instructions) is appended verbatim under labeled headings.

use crate::calendar::{AlignmentAssignment, PostingSlot, SlotRelation};
use crate::plan::types::{ContentPlan, PracticeProfile};

use super::trait_def::GenerationRequest;

/// Fixed persona/style prompt shared by every request.
pub const PERSONA_PROMPT: &str = "\
You are a social media content writer for a local healthcare practice. \
Your voice is warm, specific, and community-minded; never salesy, never \
generic. Captions run 2-4 sentences, end with 2-4 relevant hashtags, and \
read like a real person at the front desk wrote them.";

/// Output-shape contract for batch (weeks) requests.
const WEEKS_OUTPUT_CONTRACT: &str = "\
Respond with ONLY a JSON object, no surrounding prose, shaped as:\n\
{\"weeks\": [{\"week\": <number>, \"posts\": [{\"title\": \"...\", \
\"caption\": \"...\", \"photoIdeas\": \"...\"}, {...}]}]}\n\
Every week must contain exactly 2 posts.";

/// Output-shape contract for single-post requests.
const POST_OUTPUT_CONTRACT: &str = "\
Respond with ONLY a JSON object, no surrounding prose, shaped as:\n\
{\"title\": \"...\", \"caption\": \"...\", \"photoIdeas\": \"...\"}";

/// Everything the prompt builder needs besides the schedule itself.
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    pub profile: PracticeProfile,
    /// Research/grounding summary (or the unavailable placeholder).
    pub research: String,
}

fn push_profile(out: &mut String, profile: &PracticeProfile) {
    out.push_str("## Practice\n\n");
    out.push_str(&format!("- Name: {}\n", profile.name));
    out.push_str(&format!("- Website: {}\n", profile.website));
    if let Some(phone) = &profile.phone {
        out.push_str(&format!("- Phone: {phone}\n"));
    }
    if let Some(location) = &profile.location {
        out.push_str(&format!("- Location: {location}\n"));
    }
    out.push('\n');
}

fn push_context_sections(out: &mut String, ctx: &PromptContext) {
    out.push_str("## About the practice (research)\n\n");
    out.push_str(&ctx.research);
    out.push_str("\n\n");

    if let Some(text) = &ctx.profile.onboarding_text {
        out.push_str("## Onboarding notes\n\n");
        out.push_str(text);
        out.push_str("\n\n");
    }
    if let Some(text) = &ctx.profile.past_posts_text {
        out.push_str("## Past posts (match this voice, do not repeat topics)\n\n");
        out.push_str(text);
        out.push_str("\n\n");
    }
    if let Some(text) = &ctx.profile.special_instructions {
        out.push_str("## Special instructions\n\n");
        out.push_str(text);
        out.push_str("\n\n");
    }
}

/// Render one slot as a scheduling-fact line: human-readable plus ISO date.
fn slot_line(slot: &PostingSlot) -> String {
    format!(
        "- Week {}, post {}: {} ({})\n",
        slot.week,
        slot.slot_in_week + 1,
        slot.date.format("%A, %B %-d, %Y"),
        slot.date.format("%Y-%m-%d"),
    )
}

/// Render one alignment assignment as a scheduling-fact line.
fn assignment_line(a: &AlignmentAssignment) -> String {
    let relation = match a.relation {
        SlotRelation::Exact => "on the day".to_string(),
        SlotRelation::Before => format!("{} day(s) ahead of it", a.distance_days),
        SlotRelation::After => format!("{} day(s) after it", a.distance_days),
    };
    format!(
        "- {} ({}) is covered by the week {} post {} slot on {}, {}\n",
        a.anchor.name,
        a.anchor.date.format("%Y-%m-%d"),
        a.slot.week,
        a.slot.slot_in_week + 1,
        a.slot.date.format("%Y-%m-%d"),
        relation,
    )
}

fn push_scheduling_facts(
    out: &mut String,
    slots: &[PostingSlot],
    assignments: &[AlignmentAssignment],
) {
    out.push_str("## Posting schedule (fixed, not negotiable)\n\n");
    for slot in slots {
        out.push_str(&slot_line(slot));
    }
    out.push('\n');

    if assignments.is_empty() {
        out.push_str("No holidays or milestones fall in this window.\n\n");
    } else {
        out.push_str("## Holiday and milestone placements (fixed, not negotiable)\n\n");
        out.push_str(
            "These placements were computed deterministically. Write the themed \
             post for EXACTLY the slot listed; never move a holiday or milestone \
             to a different slot, and never theme any other slot around it.\n\n",
        );
        for a in assignments {
            out.push_str(&assignment_line(a));
        }
        out.push('\n');
    }
}

/// Build the request for one batch of weeks.
///
/// `slots` and `assignments` are always the complete plan-wide sets, even
/// when the batch covers only part of the plan: the model must see every
/// placement so it never themes one of its own posts around a holiday that
/// belongs to a slot outside its range. `week_range` scopes only the task.
pub fn weeks_prompt(
    ctx: &PromptContext,
    slots: &[PostingSlot],
    assignments: &[AlignmentAssignment],
    week_range: (usize, usize),
) -> GenerationRequest {
    let mut user = String::with_capacity(4096);
    push_profile(&mut user, &ctx.profile);
    push_context_sections(&mut user, ctx);
    push_scheduling_facts(&mut user, slots, assignments);

    let batch_posts = (week_range.1 - week_range.0 + 1) * 2;
    user.push_str(&format!(
        "## Task\n\nThe schedule and placements above cover the ENTIRE plan. \
         Write the posts for weeks {} through {} only ({} posts total). \
         Use the absolute week numbers shown above in the `week` field. \
         No two posts in the plan may share a theme, and a holiday or \
         milestone placed in a week outside your range must not be themed \
         by any post you write.\n",
        week_range.0,
        week_range.1,
        batch_posts,
    ));

    GenerationRequest {
        system_prompt: format!("{PERSONA_PROMPT}\n\n{WEEKS_OUTPUT_CONTRACT}"),
        user_prompt: user,
    }
}

/// Build the request for regenerating one post.
///
/// Every other post's title and caption in `plan` becomes a
/// duplicate-avoidance blocklist; `(week_index, post_index)` are zero-based.
pub fn single_post_prompt(
    ctx: &PromptContext,
    slot: &PostingSlot,
    assignments: &[AlignmentAssignment],
    plan: &ContentPlan,
    week_index: usize,
    post_index: usize,
    instructions: Option<&str>,
) -> GenerationRequest {
    let mut user = String::with_capacity(4096);
    push_profile(&mut user, &ctx.profile);
    push_context_sections(&mut user, ctx);

    user.push_str("## Slot being rewritten (fixed, not negotiable)\n\n");
    user.push_str(&slot_line(slot));
    user.push('\n');
    let slot_assignments: Vec<&AlignmentAssignment> = assignments
        .iter()
        .filter(|a| a.slot.sequence == slot.sequence)
        .collect();
    if !slot_assignments.is_empty() {
        user.push_str("This slot carries the following placement(s):\n\n");
        for a in &slot_assignments {
            user.push_str(&assignment_line(a));
        }
        user.push('\n');
    }

    user.push_str("## Existing posts (do NOT duplicate any theme below)\n\n");
    for (wi, pi, post) in plan.iter_posts() {
        if (wi, pi) == (week_index, post_index) {
            continue;
        }
        user.push_str(&format!("- {}: {}\n", post.title, post.caption));
    }
    user.push('\n');

    if let Some(instructions) = instructions {
        user.push_str("## Instructions for the rewrite\n\n");
        user.push_str(instructions);
        user.push_str("\n\n");
    }

    user.push_str("## Task\n\nWrite one replacement post for the slot above.\n");

    GenerationRequest {
        system_prompt: format!("{PERSONA_PROMPT}\n\n{POST_OUTPUT_CONTRACT}"),
        user_prompt: user,
    }
}
