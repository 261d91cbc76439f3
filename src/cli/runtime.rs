use std::path::PathBuf;

use anyhow::{Context, Result};
use ::config::{Config, Environment, File, FileFormat};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;

/// Variables such as `SEARCH_DEBUGGER__PLANIMATION__URL` override file values.
pub const ENV_PREFIX: &str = "SEARCH_DEBUGGER";
const ENV_SEPARATOR: &str = "__";

pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    // stdout carries surface messages during replay, so logs go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

pub struct LoadedConfig {
    pub config: AppConfig,
    /// The file that contributed to `config`, if any.
    pub path: Option<PathBuf>,
}

/// Priority: `--config` > ./config/search-debugger.yaml > ~/.config/search-debugger/config.yaml
pub fn default_config_path() -> Option<PathBuf> {
    let local_config = PathBuf::from("config/search-debugger.yaml");
    if local_config.exists() {
        return Some(local_config);
    }
    let mut path = dirs::config_dir()?;
    path.push("search-debugger");
    path.push("config.yaml");
    Some(path)
}

pub fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let candidate = config_path.cloned().or_else(default_config_path);

    let defaults =
        Config::try_from(&AppConfig::default()).context("Failed to encode default configuration")?;
    let mut builder = Config::builder().add_source(defaults);

    let path = match candidate {
        Some(path) if path.exists() => {
            builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Yaml));
            info!("Loaded configuration from: {}", path.display());
            Some(path)
        }
        Some(path) => {
            warn!("Config file not found, using defaults: {}", path.display());
            None
        }
        None => None,
    };

    let config = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR),
        )
        .build()
        .context("Failed to load configuration")?
        .try_deserialize::<AppConfig>()
        .context("Failed to parse configuration")?;

    Ok(LoadedConfig { config, path })
}
