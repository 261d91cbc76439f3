use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use search_debugger_net::PlanimationClient;
use search_view::adapters::{ChannelSurface, InMemorySearchSource, NoopAnimation};
use search_view::ports::AnimationPort;
use search_view::{PlanContext, SearchDebuggerView, SearchEvent, ViewPolicyHandle, ViewPorts};
use serde_json::Value;
use tokio::fs;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::info;

use crate::adapters::{pump_messages, read_surface_input, FsEditor, HtmlPlanReport, LoggingHost};
use crate::cli::context::CliContext;
use crate::config::AppConfig;

#[derive(Args, Clone, Debug)]
pub struct ReplayArgs {
    /// Search events, one JSON object per line
    #[arg(value_name = "EVENTS")]
    pub events: PathBuf,

    /// Planner log to correlate selected states with
    #[arg(long, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// PDDL domain used for plan reports and node images
    #[arg(long, value_name = "FILE")]
    pub domain: Option<PathBuf>,

    /// PDDL problem whose goal is replaced when rendering node images
    #[arg(long, value_name = "FILE")]
    pub problem: Option<PathBuf>,

    /// Start with the surface hidden
    #[arg(long)]
    pub hidden: bool,
}

/// Everything a replay needs besides the configuration and the event stream.
#[derive(Debug, Clone, Default)]
pub struct ReplaySession {
    pub log: Option<PathBuf>,
    pub plan_context: PlanContext,
}

pub async fn cmd_replay(args: ReplayArgs, ctx: &CliContext) -> Result<()> {
    let events = load_events(&args.events).await?;
    let session = ReplaySession {
        log: args.log.clone(),
        plan_context: PlanContext {
            domain: read_optional(args.domain.as_deref()).await?,
            problem: read_optional(args.problem.as_deref()).await?,
        },
    };

    let (surface, outbound) = ChannelSurface::new(!args.hidden);
    let writer = tokio::spawn(pump_messages(outbound, tokio::io::stdout()));
    let (inbound_tx, inbound_rx) = mpsc::channel(64);
    let (visibility_tx, visibility_rx) = mpsc::channel(8);
    let reader = tokio::spawn(read_surface_input(
        BufReader::new(tokio::io::stdin()),
        Arc::clone(&surface),
        inbound_tx,
        visibility_tx,
    ));

    replay_session(
        ctx.config(),
        session,
        events,
        surface,
        inbound_rx,
        visibility_rx,
    )
    .await?;

    let forwarded = reader.await.context("surface reader panicked")??;
    let written = writer.await.context("surface writer panicked")??;
    info!(forwarded, written, "replay finished");
    Ok(())
}

/// Publishes `events` through an in-memory source and drives the view until
/// `inbound` closes.
pub async fn replay_session(
    config: &AppConfig,
    session: ReplaySession,
    events: Vec<SearchEvent>,
    surface: Arc<ChannelSurface>,
    inbound: mpsc::Receiver<Value>,
    visibility: mpsc::Receiver<bool>,
) -> Result<()> {
    let policy = ViewPolicyHandle::new_with(config.view_policy())
        .context("Invalid search debugger configuration")?;
    let animation: Arc<dyn AnimationPort> = if config.animation_enabled() {
        Arc::new(
            PlanimationClient::new(config.planimation.clone())
                .context("Failed to build Planimation client")?,
        )
    } else {
        Arc::new(NoopAnimation)
    };
    let ports = ViewPorts {
        surface,
        host: Arc::new(LoggingHost::new(config.search_debugger.port)),
        editor: Arc::new(FsEditor::new(session.log.clone())),
        plan_report: Arc::new(HtmlPlanReport::new()),
        animation,
    };

    let mut view = SearchDebuggerView::new(policy, ports);
    view.set_plan_context(session.plan_context);
    let source = InMemorySearchSource::new();
    view.observe(source.clone());
    if session.log.is_some() {
        view.toggle_state_log().await;
    }

    // Drain as we publish so long traces never overrun the bus.
    let total = events.len();
    let mut relayed = 0;
    for event in events {
        source.apply(event).await;
        relayed += view.process_pending_events().await;
    }
    info!(total, relayed, states = source.len(), "search events replayed");

    view.run(inbound, visibility).await;
    view.settle_animations().await;
    info!(status = %view.debugger_status(), "replay session closed");
    Ok(())
}

pub async fn load_events(path: &Path) -> Result<Vec<SearchEvent>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read events from {}", path.display()))?;
    parse_events(&content).with_context(|| format!("Invalid events file {}", path.display()))
}

pub fn parse_events(content: &str) -> Result<Vec<SearchEvent>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<SearchEvent>(line)
                .with_context(|| format!("line {}", idx + 1))
        })
        .collect()
}

async fn read_optional(path: Option<&Path>) -> Result<Option<String>> {
    match path {
        Some(path) => fs::read_to_string(path)
            .await
            .map(Some)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => Ok(None),
    }
}
