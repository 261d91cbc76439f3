use search_debugger_core_types::{CoreError, StateId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid message: {0}")]
    InvalidMessage(String),
    #[error("unrecognized command: {0}")]
    UnknownCommand(String),
    #[error("presentation surface unavailable")]
    SurfaceClosed,
    #[error("state {0} cannot be rendered: {1}")]
    Render(StateId, String),
    #[error("editor error: {0}")]
    Editor(String),
    #[error("animation request failed: {0}")]
    Animation(String),
    #[error("event source error: {0}")]
    Source(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<CoreError> for ViewError {
    fn from(err: CoreError) -> Self {
        ViewError::Source(err.to_string())
    }
}

pub type ViewResult<T> = Result<T, ViewError>;
