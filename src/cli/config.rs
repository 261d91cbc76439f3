use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use search_view::LogPattern;

use crate::cli::context::CliContext;
use crate::config::AppConfig;

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Validate configuration
    Validate,
}

pub async fn cmd_config(args: ConfigArgs, ctx: &CliContext) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            match ctx.config_path() {
                Some(path) => println!("Current configuration ({}):", path.display()),
                None => println!("Current configuration (defaults):"),
            }
            println!("{}", serde_yaml::to_string(ctx.config())?);
        }
        ConfigAction::Validate => {
            validate_config(ctx.config())?;
            println!("Configuration is valid");
        }
    }
    Ok(())
}

pub fn validate_config(config: &AppConfig) -> Result<()> {
    LogPattern::compile(&config.search_debugger.state_log_pattern)
        .context("search_debugger.state_log_pattern")?;
    if config.planimation.timeout_secs == 0 {
        bail!("planimation.timeout_secs must be positive");
    }
    if config.animation_enabled() && config.planimation.url.trim().is_empty() {
        bail!("planimation.url is required when node animation is enabled");
    }
    Ok(())
}
