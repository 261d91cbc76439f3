use std::path::{Path, PathBuf};

use async_trait::async_trait;
use search_debugger_core_types::{DebuggerStatus, SearchState, StateId};
use tokio::sync::broadcast;

use crate::errors::ViewResult;
use crate::model::{EditorHandle, HostCommand, OutboundMessage, PlanContext, SearchEvent};

/// Live subscription to a search event source. Dropping it unsubscribes.
pub struct SearchSubscription {
    receiver: broadcast::Receiver<SearchEvent>,
}

impl SearchSubscription {
    pub fn new(receiver: broadcast::Receiver<SearchEvent>) -> Self {
        Self { receiver }
    }

    pub fn receiver_mut(&mut self) -> &mut broadcast::Receiver<SearchEvent> {
        &mut self.receiver
    }
}

/// Backend producing search states: the planner being debugged.
#[async_trait]
pub trait SearchEventSource: Send + Sync {
    fn subscribe(&self) -> SearchSubscription;
    async fn state_by_id(&self, id: StateId) -> ViewResult<Option<SearchState>>;
    async fn all_states(&self) -> ViewResult<Vec<SearchState>>;
}

/// Sandboxed display the user looks at. Only message passing crosses it.
#[async_trait]
pub trait PresentationSurface: Send + Sync {
    fn is_visible(&self) -> bool;
    async fn post(&self, message: OutboundMessage) -> ViewResult<()>;
}

#[async_trait]
pub trait DebuggerHost: Send + Sync {
    /// Runs `command` and reports the debugger status it leaves behind.
    async fn execute(&self, command: HostCommand) -> ViewResult<DebuggerStatus>;
    async fn show_error(&self, message: &str);
}

/// File pickers and text editors of the hosting IDE.
#[async_trait]
pub trait EditorPort: Send + Sync {
    async fn pick_log_file(&self) -> ViewResult<Option<PathBuf>>;
    /// Opens `path` in a view column next to the active editor without taking focus.
    async fn open_beside(&self, path: &Path) -> ViewResult<EditorHandle>;
    fn is_document_closed(&self, editor: &EditorHandle) -> bool;
    async fn document_text(&self, editor: &EditorHandle) -> ViewResult<String>;
    /// Scrolls so that `line` (zero-based) is the first visible line.
    fn reveal_line(&self, editor: &EditorHandle, line: usize);
}

#[async_trait]
pub trait PlanReportPort: Send + Sync {
    async fn render_state_plan(
        &self,
        state: &SearchState,
        context: &PlanContext,
    ) -> ViewResult<String>;
}

/// External renderer producing an image of a state's sub-goal.
#[async_trait]
pub trait AnimationPort: Send + Sync {
    async fn render_node(&self, state_info: &str, context: &PlanContext) -> ViewResult<Vec<u8>>;
}
