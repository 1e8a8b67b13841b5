//! The `cadence regenerate` command: replace one post in a saved plan.
//!
//! Week and post numbers are 1-based on the command line. The plan file is
//! rewritten only after the new post comes back, so a failed generation
//! leaves the document exactly as it was.

use std::path::Path;

use anyhow::{Context, Result};

use cadence_core::plan::replace_post;

use crate::config::CadenceConfig;
use crate::plan_cmd::build_service;
use crate::plan_file::{load_plan, save_plan};

pub async fn cmd_regenerate(
    plan_path: &Path,
    week: usize,
    post: usize,
    instructions: Option<&str>,
    api_key: Option<&str>,
) -> Result<()> {
    if week == 0 || post == 0 {
        anyhow::bail!("--week and --post are 1-based");
    }
    let week_index = week - 1;
    let post_index = post - 1;

    let mut document = load_plan(plan_path)?;
    let current = document
        .plan
        .post(week_index, post_index)
        .with_context(|| format!("the plan has no week {week}, post {post}"))?;
    println!("Regenerating week {week}, post {post} ({:?})...", current.title);

    let config = CadenceConfig::resolve(api_key)?;
    let service = build_service(&config)?;

    let new_post = service
        .regenerate_post(
            &document.request,
            &document.plan,
            week_index,
            post_index,
            instructions,
        )
        .await
        .context("Failed to regenerate post.")?;

    println!("New post: {:?}", new_post.title);
    document.plan = replace_post(&document.plan, week_index, post_index, new_post)
        .context("Failed to regenerate post.")?;
    save_plan(plan_path, &document)?;

    println!("Plan updated at {}.", plan_path.display());
    Ok(())
}
