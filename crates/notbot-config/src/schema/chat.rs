use serde::{Deserialize, Serialize};

/// Chat relay connection settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IrcConfig {
    /// `host:port` of the relay server.
    pub server: String,
    pub nick: String,
    pub user: String,
    pub realname: String,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Joined on connect in addition to every watcher's target channel.
    pub channels: Vec<String>,
}

impl std::fmt::Debug for IrcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IrcConfig")
            .field("server", &self.server)
            .field("nick", &self.nick)
            .field("user", &self.user)
            .field("realname", &self.realname)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("channels", &self.channels)
            .finish()
    }
}

impl Default for IrcConfig {
    fn default() -> Self {
        Self {
            server: "irc.libera.chat:6667".into(),
            nick: "notbot".into(),
            user: "bot".into(),
            realname: "notbot".into(),
            password: None,
            channels: Vec::new(),
        }
    }
}
