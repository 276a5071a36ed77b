use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid API response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("request cancelled")]
    Cancelled,
}

impl SearchError {
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
