pub mod app;
pub mod commands;
pub mod config;
pub mod context;
pub mod correlate;
pub mod dispatch;
pub mod env;
pub mod replay;
pub mod runtime;

pub use config::{cmd_config, ConfigAction, ConfigArgs};
pub use correlate::{cmd_correlate, CorrelateArgs};
pub use replay::{cmd_replay, ReplayArgs};
