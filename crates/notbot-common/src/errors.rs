use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("malformed {kind} mapping '{value}': {reason}")]
    Mapping {
        kind: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum NotbotError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("chat protocol error: {0}")]
    Protocol(#[from] irc_proto::error::ProtocolError),

    #[error("chat connection closed")]
    ChatClosed,

    #[error("chat registration failed: {0}")]
    Registration(String),

    #[error("{0}")]
    Other(String),
}
