//! Built-in dispatchers.

use async_trait::async_trait;
use notbot_common::{ChatSender, Command, Dispatcher, Message, Response};
use tracing::{debug, info, warn};

/// Logs every inbound line.
pub struct Logger;

#[async_trait]
impl Dispatcher for Logger {
    fn name(&self) -> &str {
        "logger"
    }

    async fn dispatch(&self, _chat: ChatSender, message: Message) {
        debug!(line = %message.to_string().trim_end(), "inbound");
    }
}

/// Joins every configured channel once registration completes (`001`).
pub struct Joiner {
    channels: Vec<String>,
}

impl Joiner {
    pub fn new(channels: Vec<String>) -> Self {
        Self { channels }
    }
}

#[async_trait]
impl Dispatcher for Joiner {
    fn name(&self) -> &str {
        "joiner"
    }

    async fn dispatch(&self, chat: ChatSender, message: Message) {
        if !matches!(message.command, Command::Response(Response::RPL_WELCOME, _)) {
            return;
        }
        info!(channels = ?self.channels, "registered, joining channels");
        for channel in &self.channels {
            if let Err(e) = chat.join(channel) {
                warn!(channel = %channel, error = %e, "failed to queue join");
                return;
            }
        }
    }
}
