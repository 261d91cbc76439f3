use super::config::cmd_config;
use super::correlate::cmd_correlate;
use super::env::CliArgs;
use super::replay::cmd_replay;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Replay(args) => cmd_replay(args, ctx).await,
        Commands::Correlate(args) => cmd_correlate(args, ctx.config()).await,
        Commands::Config(args) => cmd_config(args, ctx).await,
    }
}
