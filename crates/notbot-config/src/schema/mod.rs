//! Configuration schema types for notbot.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod chat;
mod watchers;

pub use chat::*;
pub use watchers::*;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotbotConfig {
    pub irc: IrcConfig,
    pub checkin: CheckinConfig,
    pub jitsi: JitsiConfig,
    pub spaceapi: SpaceApiConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

/// Limits applied to every snapshot fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Applies separately to connect (including TLS) and to waiting for
    /// response headers.
    pub timeout_secs: u64,
    /// Bodies longer than this are truncated, not rejected.
    pub max_body_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            max_body_bytes: 5 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "notbot=info".into(),
        }
    }
}
