use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// One room relayed into one chat channel.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    pub channel: String,
    pub server: String,
    pub room: String,
    /// Nickname the bot announces in the room.
    pub nick: String,
    /// Overrides the websocket URL derived from `server` and `room`.
    pub endpoint: Option<String>,
    /// Interval between liveness probes (default: 5s).
    pub keepalive: Duration,
    /// Fixed delay before reconnecting (default: 1s).
    pub reconnect_delay: Duration,
    /// Limit on TCP + TLS + upgrade (default: 20s).
    pub connect_timeout: Duration,
}

impl RoomConfig {
    pub fn new(
        channel: impl Into<String>,
        server: impl Into<String>,
        room: impl Into<String>,
        nick: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            server: server.into(),
            room: room.into(),
            nick: nick.into(),
            endpoint: None,
            keepalive: Duration::from_secs(5),
            reconnect_delay: Duration::from_secs(1),
            connect_timeout: Duration::from_secs(20),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_keepalive(mut self, keepalive: Duration) -> Self {
        self.keepalive = keepalive;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn ws_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("wss://{}/xmpp-websocket?room={}", self.server, self.room),
        }
    }

    pub fn origin(&self) -> String {
        format!("https://{}", self.server)
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Handshaking,
    Streaming,
    /// Terminal: the watcher saw its shutdown signal and returned.
    Stopped,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Handshaking => "handshaking",
            ConnectionState::Streaming => "streaming",
            ConnectionState::Stopped => "stopped",
        })
    }
}
