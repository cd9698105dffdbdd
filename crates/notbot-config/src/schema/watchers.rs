//! Per-watcher configuration sections.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Check-in API watcher. One source, one channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckinConfig {
    pub enabled: bool,
    pub channel: String,
    pub api: String,
    pub interval_secs: u64,
    /// Announce everyone already present on the first successful poll.
    pub announce_initial: bool,
}

impl Default for CheckinConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            channel: "#hswaw-members".into(),
            api: "https://at.hackerspace.pl/api".into(),
            interval_secs: 10,
            announce_initial: true,
        }
    }
}

/// Conference room watchers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JitsiConfig {
    /// `channel,server,room` strings.
    pub mappings: Vec<String>,
    pub keepalive_secs: u64,
    pub reconnect_delay_secs: u64,
}

impl Default for JitsiConfig {
    fn default() -> Self {
        Self {
            mappings: Vec::new(),
            keepalive_secs: 5,
            reconnect_delay_secs: 1,
        }
    }
}

/// spaceAPI watchers and the presence query keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceApiConfig {
    /// `channel,url` strings. Mappings sharing a URL share one watcher.
    pub mappings: Vec<String>,
    pub interval_secs: u64,
    pub announce_initial: bool,
    /// Channel messages that trigger a presence query.
    pub keywords: Vec<String>,
    /// Reply used when a query finds nobody present.
    pub empty_response: String,
    /// Channel to endpoint map for queries. `default` is the fallback entry.
    pub room_map: HashMap<String, String>,
}

impl Default for SpaceApiConfig {
    fn default() -> Self {
        Self {
            mappings: Vec::new(),
            interval_secs: 10,
            announce_initial: false,
            keywords: vec!["at".into()],
            empty_response: "Nikdo není doma...".into(),
            room_map: HashMap::new(),
        }
    }
}
