use clap::Subcommand;

use super::config::ConfigArgs;
use super::correlate::CorrelateArgs;
use super::replay::ReplayArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Replay recorded search events through the view over stdin/stdout
    Replay(ReplayArgs),

    /// Find the first log line that mentions a planner state id
    Correlate(CorrelateArgs),

    /// Inspect the search debugger configuration
    Config(ConfigArgs),
}
