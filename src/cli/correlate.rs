use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use search_view::correlate::find_first_match;
use search_view::LogPattern;
use tokio::fs;
use tracing::info;

use crate::config::AppConfig;

#[derive(Args, Clone, Debug)]
pub struct CorrelateArgs {
    /// Planner log to scan
    #[arg(long, value_name = "FILE")]
    pub log: PathBuf,

    /// Planner-side state id (`origId`)
    #[arg(long)]
    pub orig_id: String,

    /// Override the configured state log pattern
    #[arg(long, value_name = "REGEX")]
    pub pattern: Option<String>,
}

pub async fn cmd_correlate(args: CorrelateArgs, config: &AppConfig) -> Result<()> {
    let line = correlate_log(&args, config).await?;
    println!("{line}");
    Ok(())
}

/// Zero-based index of the first line whose captured id equals `orig_id`.
pub async fn correlate_log(args: &CorrelateArgs, config: &AppConfig) -> Result<usize> {
    let source = args
        .pattern
        .as_deref()
        .unwrap_or(&config.search_debugger.state_log_pattern);
    let pattern = LogPattern::compile(source).context("Invalid state log pattern")?;
    let text = fs::read_to_string(&args.log)
        .await
        .with_context(|| format!("Failed to read log {}", args.log.display()))?;

    match find_first_match(&text, &pattern, &args.orig_id) {
        Some(line) => {
            info!(orig_id = %args.orig_id, line, "state found in log");
            Ok(line)
        }
        None => bail!(
            "no line of {} matches state {}",
            args.log.display(),
            args.orig_id
        ),
    }
}
