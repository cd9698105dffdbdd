use std::time::Duration;

use tokio_tungstenite::tungstenite;

/// Transport-level failure while fetching a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("no response headers within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("unable to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("websocket error: {0}")]
    WebSocket(Box<tungstenite::Error>),

    #[error("invalid websocket request: {0}")]
    InvalidRequest(String),

    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("handshake frame {index} failed: {reason}")]
    Handshake { index: usize, reason: String },

    #[error("connection closed by server")]
    Closed,
}

impl From<tungstenite::Error> for WatchError {
    fn from(e: tungstenite::Error) -> Self {
        WatchError::WebSocket(Box::new(e))
    }
}
