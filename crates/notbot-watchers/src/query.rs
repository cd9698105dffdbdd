//! On-demand "who is there?" answered from a spaceAPI endpoint.

use std::collections::HashMap;

use async_trait::async_trait;
use notbot_common::{ChatSender, Command, Dispatcher, Message};
use tracing::{debug, warn};

use crate::fetch::HttpFetcher;
use crate::obfuscate::obfuscate_all;
use crate::polling::fetch_present_names;

/// Key in the room map used when a channel has no entry of its own.
pub const DEFAULT_ROOM: &str = "default";

pub struct PresenceQuery {
    fetcher: HttpFetcher,
    keywords: Vec<String>,
    empty_response: String,
    room_map: HashMap<String, String>,
}

impl PresenceQuery {
    pub fn new(
        fetcher: HttpFetcher,
        keywords: Vec<String>,
        empty_response: impl Into<String>,
        room_map: HashMap<String, String>,
    ) -> Self {
        Self {
            fetcher,
            keywords,
            empty_response: empty_response.into(),
            room_map,
        }
    }

    fn endpoint_for(&self, channel: &str) -> Option<&str> {
        self.room_map
            .get(channel)
            .or_else(|| self.room_map.get(DEFAULT_ROOM))
            .map(String::as_str)
    }

    /// The channel to answer in, when `message` is a presence question.
    pub fn triggered_by<'m>(&self, message: &'m Message) -> Option<&'m str> {
        let Command::PRIVMSG(target, text) = &message.command else {
            return None;
        };
        if !target.starts_with('#') {
            return None;
        }
        let text = text.trim();
        self.keywords
            .iter()
            .any(|k| k.eq_ignore_ascii_case(text))
            .then_some(target.as_str())
    }

    /// Build the reply text for one spaceAPI lookup.
    pub async fn answer(&self, channel: &str) -> String {
        let Some(url) = self.endpoint_for(channel) else {
            return self.empty_response.clone();
        };

        match fetch_present_names(&self.fetcher, url).await {
            Ok(names) if names.is_empty() => self.empty_response.clone(),
            Ok(names) => obfuscate_all(&names).join(", "),
            Err(e) => {
                warn!(channel = %channel, url = %url, error = %e, "presence query failed");
                format!("error getting presence status: {e}")
            }
        }
    }
}

#[async_trait]
impl Dispatcher for PresenceQuery {
    fn name(&self) -> &str {
        "presence-query"
    }

    async fn dispatch(&self, chat: ChatSender, message: Message) {
        let Some(channel) = self.triggered_by(&message) else {
            return;
        };
        debug!(channel = %channel, from = ?message.source_nickname(), "presence query");

        let reply = self.answer(channel).await;
        if let Err(e) = chat.notice(channel, &reply) {
            warn!(channel = %channel, error = %e, "failed to queue presence reply");
        }
    }
}
