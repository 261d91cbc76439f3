use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status code {status} from {url}")]
    Status { status: u16, url: String },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl NetError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            NetError::Status { status, .. } => Some(*status),
            NetError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type NetResult<T> = Result<T, NetError>;
