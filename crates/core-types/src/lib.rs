use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Shared error type for the low-level crates.
#[derive(Debug, Error, Clone)]
pub enum CoreError {
    #[error("{message}")]
    Message { message: String },
}

impl CoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

/// Identifier the view assigns to a search state.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(pub u64);

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StateId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A node of the planner's search space.
///
/// Only `id` and `origId` are interpreted here; everything else the planner
/// reports travels in `detail` untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub id: StateId,
    #[serde(rename = "origId")]
    pub orig_id: String,
    #[serde(flatten)]
    pub detail: Map<String, Value>,
}

impl SearchState {
    pub fn new(id: impl Into<StateId>, orig_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            orig_id: orig_id.into(),
            detail: Map::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.detail.insert(key.into(), value.into());
        self
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    On,
    Off,
}

impl From<bool> for RunState {
    fn from(on: bool) -> Self {
        if on {
            RunState::On
        } else {
            RunState::Off
        }
    }
}

/// Debugger process status as shown in the panel header.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DebuggerStatus {
    pub running: RunState,
    pub port: u16,
}

impl DebuggerStatus {
    pub fn new(on: bool, port: u16) -> Self {
        Self {
            running: on.into(),
            port,
        }
    }

    pub fn off() -> Self {
        Self::new(false, 0)
    }

    pub fn is_running(&self) -> bool {
        self.running == RunState::On
    }
}

impl Default for DebuggerStatus {
    fn default() -> Self {
        Self::off()
    }
}

impl fmt::Display for DebuggerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let running = match self.running {
            RunState::On => "on",
            RunState::Off => "off",
        };
        write!(f, "running={} port={}", running, self.port)
    }
}
