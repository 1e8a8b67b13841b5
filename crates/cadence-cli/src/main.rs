mod calendar_cmds;
mod config;
mod export_cmd;
mod plan_cmd;
mod plan_file;
mod regen_cmd;
mod request_file;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cadence", about = "Social media content calendar planner")]
struct Cli {
    /// API key (overrides CADENCE_API_KEY env var and the config file)
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a cadence config file
    Init {
        /// Anthropic API key to store
        #[arg(long)]
        api_key: String,
        /// Model name (defaults to the client's built-in)
        #[arg(long)]
        model: Option<String>,
        /// API base URL override (proxies, mock servers)
        #[arg(long)]
        base_url: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Generate a content plan from a request file
    Plan {
        /// Path to the request TOML file
        request: PathBuf,
        /// Where to write the plan document (default: plan.json)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Override the number of weeks in the request file
        #[arg(long)]
        weeks: Option<usize>,
        /// Weeks per generation batch
        #[arg(long)]
        batch_weeks: Option<usize>,
    },
    /// List observed holidays in a date range
    Holidays {
        /// Range start, YYYY-MM-DD (inclusive)
        #[arg(long)]
        from: String,
        /// Range end, YYYY-MM-DD (inclusive)
        #[arg(long)]
        to: String,
    },
    /// Print the posting schedule and calendar alignment for a window
    Schedule {
        /// Start date, YYYY-MM-DD
        #[arg(long)]
        start: String,
        /// Posting days: mon-wed or tue-thu
        #[arg(long, default_value = "mon-wed")]
        pair: String,
        /// Number of weeks
        #[arg(long, default_value_t = 12)]
        weeks: usize,
        /// File of milestone lines (e.g. "Dr. Patel - birthday - 10/14")
        #[arg(long)]
        milestones: Option<PathBuf>,
    },
    /// Regenerate one post in a saved plan
    Regenerate {
        /// Path to the plan JSON written by `cadence plan`
        plan: PathBuf,
        /// Week number (1-based)
        #[arg(long)]
        week: usize,
        /// Post number within the week (1 or 2)
        #[arg(long)]
        post: usize,
        /// Extra instructions for the replacement post
        #[arg(long)]
        instructions: Option<String>,
    },
    /// Export a saved plan as CSV
    Export {
        /// Path to the plan JSON written by `cadence plan`
        plan: PathBuf,
        /// Output file ("-" for stdout; default derives from the practice name)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Include date, title, and photo-idea columns
        #[arg(long)]
        full: bool,
    },
}

/// Execute the `cadence init` command: write config file.
fn cmd_init(
    api_key: String,
    model: Option<String>,
    base_url: Option<String>,
    force: bool,
) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        api: config::ApiSection {
            api_key,
            model,
            base_url,
        },
    };
    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    if let Some(model) = &cfg.api.model {
        println!("  api.model = {model}");
    }
    println!();
    println!("Next: run `cadence plan <request.toml>` to generate a plan.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let api_key = cli.api_key.as_deref();

    match cli.command {
        Commands::Init {
            api_key,
            model,
            base_url,
            force,
        } => cmd_init(api_key, model, base_url, force),
        Commands::Plan {
            request,
            output,
            weeks,
            batch_weeks,
        } => plan_cmd::cmd_plan(&request, output.as_deref(), weeks, batch_weeks, api_key).await,
        Commands::Holidays { from, to } => calendar_cmds::cmd_holidays(&from, &to),
        Commands::Schedule {
            start,
            pair,
            weeks,
            milestones,
        } => calendar_cmds::cmd_schedule(&start, &pair, weeks, milestones.as_deref()),
        Commands::Regenerate {
            plan,
            week,
            post,
            instructions,
        } => regen_cmd::cmd_regenerate(&plan, week, post, instructions.as_deref(), api_key).await,
        Commands::Export { plan, output, full } => {
            export_cmd::cmd_export(&plan, output.as_deref(), full)
        }
    }
}
