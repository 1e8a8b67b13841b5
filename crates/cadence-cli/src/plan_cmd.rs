//! The `cadence plan` command: run the full pipeline and write the plan
//! document.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use cadence_core::generator::ClaudeGenerator;
use cadence_core::plan::{AssembleConfig, PlanService};
use cadence_core::research::{GeneratorResearcher, MemoryStore};

use crate::config::CadenceConfig;
use crate::plan_file::{save_plan, PlanDocument};
use crate::request_file::load_request;

/// Build a plan service backed by the configured Claude client.
pub fn build_service(config: &CadenceConfig) -> Result<PlanService> {
    let mut generator = ClaudeGenerator::new(config.api_key.clone(), config.model.clone())
        .context("Failed to configure the generator.")?;
    if let Some(ref base_url) = config.base_url {
        generator = generator.with_base_url(base_url.clone());
    }
    let generator: Arc<dyn cadence_core::generator::Generator> = Arc::new(generator);
    let researcher = Arc::new(GeneratorResearcher::new(Arc::clone(&generator)));
    let store = Arc::new(MemoryStore::new());
    Ok(PlanService::new(generator, researcher, store))
}

pub async fn cmd_plan(
    request_path: &Path,
    output: Option<&Path>,
    weeks: Option<usize>,
    batch_weeks: Option<usize>,
    api_key: Option<&str>,
) -> Result<()> {
    let mut request = load_request(request_path)
        .with_context(|| format!("failed to load request file {}", request_path.display()))?;
    if let Some(weeks) = weeks {
        request.num_weeks = weeks;
    }

    let config = CadenceConfig::resolve(api_key)?;
    let mut service = build_service(&config)?;
    if let Some(batch_weeks) = batch_weeks {
        service = service.with_assemble_config(AssembleConfig { batch_weeks });
    }

    println!(
        "Generating a {}-week plan for {}...",
        request.num_weeks, request.profile.name
    );
    let outcome = service
        .generate_plan(&request)
        .await
        .context("Failed to generate content plan.")?;

    let default_output = Path::new("plan.json");
    let output = output.unwrap_or(default_output);
    let document = PlanDocument {
        request,
        slots: outcome.slots,
        assignments: outcome.assignments,
        plan: outcome.plan,
    };
    save_plan(output, &document)?;

    println!(
        "Plan written to {} ({} weeks, {} posts, {} calendar anchors).",
        output.display(),
        document.plan.weeks.len(),
        document.plan.iter_posts().count(),
        document.assignments.len(),
    );
    Ok(())
}
