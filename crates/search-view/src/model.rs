use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD as Base64, Engine as _};
use search_debugger_core_types::{DebuggerStatus, SearchState, StateId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ViewError, ViewResult};

/// Notifications emitted by a search event source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SearchEvent {
    StateAdded { state: SearchState },
    StateUpdated { state: SearchState },
    BetterState { state: SearchState },
    PlanFound { states: Vec<SearchState> },
}

impl SearchEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SearchEvent::StateAdded { .. } => "stateAdded",
            SearchEvent::StateUpdated { .. } => "stateUpdated",
            SearchEvent::BetterState { .. } => "betterState",
            SearchEvent::PlanFound { .. } => "planFound",
        }
    }
}

const INBOUND_COMMANDS: &[&str] = &[
    "onload",
    "stateSelected",
    "startDebugger",
    "stopDebugger",
    "reset",
    "toggleStateLog",
];

/// Commands sent by the presentation surface.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum InboundMessage {
    Onload,
    StateSelected {
        #[serde(rename = "stateId", default)]
        state_id: Option<StateId>,
        #[serde(rename = "stateInfo", default)]
        state_info: String,
    },
    StartDebugger,
    StopDebugger,
    Reset,
    ToggleStateLog,
}

impl InboundMessage {
    pub fn parse(value: &Value) -> ViewResult<Self> {
        let command = value
            .get("command")
            .and_then(Value::as_str)
            .ok_or_else(|| ViewError::InvalidMessage("missing command field".into()))?;
        if !INBOUND_COMMANDS.contains(&command) {
            return Err(ViewError::UnknownCommand(command.to_string()));
        }
        serde_json::from_value(value.clone())
            .map_err(|err| ViewError::InvalidMessage(format!("{command}: {err}")))
    }
}

/// Commands pushed to the presentation surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum OutboundMessage {
    DebuggerState { state: DebuggerStatus },
    StateAdded { state: SearchState },
    StateUpdated { state: SearchState },
    ShowAllStates { state: Vec<SearchState> },
    ShowPlan { state: Vec<SearchState> },
    ShowStatePlan { state: String },
    #[serde(rename = "getPNGOfNode")]
    GetPngOfNode { state: String },
    StateLog { state: Option<String> },
    Clear { state: String },
}

impl OutboundMessage {
    pub fn clear() -> Self {
        OutboundMessage::Clear {
            state: "n/a".to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            OutboundMessage::DebuggerState { .. } => "debuggerState",
            OutboundMessage::StateAdded { .. } => "stateAdded",
            OutboundMessage::StateUpdated { .. } => "stateUpdated",
            OutboundMessage::ShowAllStates { .. } => "showAllStates",
            OutboundMessage::ShowPlan { .. } => "showPlan",
            OutboundMessage::ShowStatePlan { .. } => "showStatePlan",
            OutboundMessage::GetPngOfNode { .. } => "getPNGOfNode",
            OutboundMessage::StateLog { .. } => "stateLog",
            OutboundMessage::Clear { .. } => "clear",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HostCommand {
    Start,
    Stop,
    Reset,
}

impl HostCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostCommand::Start => "start",
            HostCommand::Stop => "stop",
            HostCommand::Reset => "reset",
        }
    }
}

/// Domain and problem text the current search runs against.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanContext {
    pub domain: Option<String>,
    pub problem: Option<String>,
}

/// An editor view opened onto a log document.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct EditorHandle {
    pub id: u64,
    pub path: PathBuf,
}

/// Encodes a rendered node image for the `getPNGOfNode` command.
pub fn png_data_uri(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", Base64.encode(bytes))
}
