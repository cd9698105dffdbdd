use std::path::PathBuf;

use clap::Parser;
use notbot_config::NotbotConfig;

/// notbot: relays hackerspace presence into IRC.
#[derive(Parser, Debug)]
#[command(name = "notbot", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (e.g. debug, notbot=trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// IRC server as host:port.
    #[arg(long)]
    pub server: Option<String>,

    /// IRC nickname; also announced in conference rooms.
    #[arg(long)]
    pub nick: Option<String>,

    /// IRC server password.
    #[arg(long, env = "NOTBOT_IRC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Channel to join; may be repeated.
    #[arg(long = "channel")]
    pub channels: Vec<String>,

    /// Channel for check-in arrival/departure notices.
    #[arg(long)]
    pub at_channel: Option<String>,

    /// Check-in API address.
    #[arg(long)]
    pub at_api: Option<String>,

    /// Disable the check-in watcher.
    #[arg(long)]
    pub no_checkin: bool,

    /// channel,server,room mapping; may be repeated.
    #[arg(long = "jitsi-channel", value_name = "CHANNEL,SERVER,ROOM")]
    pub jitsi_channels: Vec<String>,

    /// channel,url spaceAPI mapping; may be repeated.
    #[arg(long = "spaceapi-channel", value_name = "CHANNEL,URL")]
    pub spaceapi_channels: Vec<String>,
}

impl Args {
    /// Layer command-line values over the loaded config. Mappings and
    /// channels are appended, scalar options replace.
    pub fn apply(&self, config: &mut NotbotConfig) {
        if let Some(server) = &self.server {
            config.irc.server = server.clone();
        }
        if let Some(nick) = &self.nick {
            config.irc.nick = nick.clone();
        }
        if let Some(password) = &self.password {
            config.irc.password = Some(password.clone());
        }
        config.irc.channels.extend(self.channels.iter().cloned());

        if let Some(channel) = &self.at_channel {
            config.checkin.channel = channel.clone();
        }
        if let Some(api) = &self.at_api {
            config.checkin.api = api.clone();
        }
        if self.no_checkin {
            config.checkin.enabled = false;
        }

        config.jitsi.mappings.extend(self.jitsi_channels.iter().cloned());
        config
            .spaceapi
            .mappings
            .extend(self.spaceapi_channels.iter().cloned());
    }
}

pub fn parse() -> Args {
    Args::parse()
}
