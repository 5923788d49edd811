//! # gt-cli
//!
//! Command-line front end for the goal tracker.
//!
//! - `gt list` / `gt show`: goals with progress and day counts
//! - `gt create` / `gt edit` / `gt delete`: manage goals and their steps
//! - `gt complete` / `gt reset`: track step progress
//! - `gt generate`: ask the step generator for a plan
//! - `gt shell`: interactive goals page

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gt_api::ClientConfig;
use tracing_subscriber::EnvFilter;

/// Goal tracker CLI.
#[derive(Parser)]
#[command(name = "gt", version, about)]
struct Cli {
    /// Project root directory, where gt.toml is looked up.
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Goals service base URL (overrides gt.toml and GT_API_URL).
    #[arg(long)]
    api_url: Option<String>,

    /// Owner id for newly created goals (overrides gt.toml and GT_USER_ID).
    #[arg(long)]
    user: Option<String>,

    /// Also append notifications as JSON lines to this file.
    #[arg(long)]
    notice_log: Option<PathBuf>,

    /// Log debug detail (requests, reconciliation) to stderr.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Goal(commands::goal::GoalCommands),
    /// Open the interactive goals page.
    Shell,
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    // Logs go to stderr so they don't mix with rendered views on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("gt_page={}", level).parse()?)
                .add_directive(format!("gt_api={}", level).parse()?)
                .add_directive(format!("gt={}", level).parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let project_root = cli.project_root.canonicalize().unwrap_or(cli.project_root);
    let mut config = ClientConfig::for_project(&project_root)?;
    config.apply_overrides(cli.api_url, cli.user);
    tracing::debug!(base_url = %config.base_url, "resolved client config");

    let ctx = commands::Context::new(&config, cli.notice_log.as_deref())?;

    match cli.command {
        Commands::Goal(command) => commands::goal::execute(command, ctx).await,
        Commands::Shell => commands::shell::execute(ctx).await,
    }
}
