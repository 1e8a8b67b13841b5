//! The `cadence export` command: render a saved plan as CSV.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use cadence_core::export::{captions_csv, full_csv, sanitize_filename};

use crate::plan_file::load_plan;

pub fn cmd_export(plan_path: &Path, output: Option<&Path>, full: bool) -> Result<()> {
    let document = load_plan(plan_path)?;

    let mut buf = Vec::new();
    if full {
        full_csv(&document.plan, &document.slots, &mut buf)
    } else {
        captions_csv(&document.plan, &mut buf)
    }
    .context("failed to render CSV")?;

    match output {
        Some(path) if path.as_os_str() == "-" => {
            std::io::stdout().write_all(&buf)?;
        }
        Some(path) => {
            std::fs::write(path, &buf)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Exported {} rows to {}.", row_count(&buf), path.display());
        }
        None => {
            let path = default_output(&document.request.profile.name, full);
            std::fs::write(&path, &buf)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Exported {} rows to {}.", row_count(&buf), path.display());
        }
    }
    Ok(())
}

fn default_output(practice_name: &str, full: bool) -> PathBuf {
    let stem = sanitize_filename(practice_name);
    let suffix = if full { "full" } else { "captions" };
    PathBuf::from(format!("{stem}-{suffix}.csv"))
}

fn row_count(csv: &[u8]) -> usize {
    // Data rows only; the header doesn't count.
    csv.iter().filter(|&&b| b == b'\n').count().saturating_sub(1)
}
