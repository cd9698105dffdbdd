//! Composition root: turns the resolved config into a registry and runs it
//! against one IRC connection.

use std::time::Duration;

use notbot_common::{CancellationToken, ChatSender, NotbotError, Registry};
use notbot_config::schema::IrcConfig;
use notbot_config::{NotbotConfig, Topology};
use notbot_watchers::{
    CheckinSource, FirstPoll, HttpFetcher, PollingWatcher, PresenceQuery, RoomConfig, RoomWatcher,
    SpaceApiSource,
};
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{error, info, warn};

use crate::codec::LineCodec;
use crate::dispatchers::{Joiner, Logger};
use crate::irc;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Register one watcher per mapping plus the built-in dispatchers.
pub fn build_registry(config: &NotbotConfig, topology: &Topology, fetcher: HttpFetcher) -> Registry {
    let mut registry = Registry::new();

    if config.checkin.enabled {
        registry.add_watcher(PollingWatcher::new(
            CheckinSource::new(fetcher.clone(), config.checkin.api.clone()),
            vec![config.checkin.channel.clone()],
            Duration::from_secs(config.checkin.interval_secs),
            FirstPoll::from_announce(config.checkin.announce_initial),
        ));
    }

    for mapping in &topology.jitsi {
        let room = RoomConfig::new(
            mapping.channel.clone(),
            mapping.server.clone(),
            mapping.room.clone(),
            config.irc.nick.clone(),
        )
        .with_keepalive(Duration::from_secs(config.jitsi.keepalive_secs))
        .with_reconnect_delay(Duration::from_secs(config.jitsi.reconnect_delay_secs));
        registry.add_watcher(RoomWatcher::new(room));
    }

    for target in &topology.spaceapi {
        registry.add_watcher(PollingWatcher::new(
            SpaceApiSource::new(fetcher.clone(), target.url.clone()),
            target.channels.clone(),
            Duration::from_secs(config.spaceapi.interval_secs),
            FirstPoll::from_announce(config.spaceapi.announce_initial),
        ));
    }

    let channels = join_channels(config, &registry);
    registry.add_dispatcher(Logger).add_dispatcher(Joiner::new(channels));

    if !config.spaceapi.room_map.is_empty() && !config.spaceapi.keywords.is_empty() {
        registry.add_dispatcher(PresenceQuery::new(
            fetcher,
            config.spaceapi.keywords.clone(),
            config.spaceapi.empty_response.clone(),
            config.spaceapi.room_map.clone(),
        ));
    }

    registry
}

/// Configured channels first, then every watcher target not already listed.
pub fn join_channels(config: &NotbotConfig, registry: &Registry) -> Vec<String> {
    let mut channels = config.irc.channels.clone();
    for channel in registry.watcher_channels() {
        if !channels.contains(&channel) {
            channels.push(channel);
        }
    }
    channels
}

/// Connect, register, start every watcher and pump inbound lines until the
/// connection drops or `shutdown` fires.
pub async fn run(irc_config: &IrcConfig, registry: Registry, shutdown: CancellationToken) -> Result<(), NotbotError> {
    info!(server = %irc_config.server, nick = %irc_config.nick, "connecting to IRC");
    let stream = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(&irc_config.server))
        .await
        .map_err(|_| NotbotError::Other(format!("connect to {} timed out", irc_config.server)))??;
    let (read_half, write_half) = stream.into_split();
    let inbound = FramedRead::new(read_half, LineCodec::new()?);

    let (chat, outbound) = ChatSender::channel();
    let writer = tokio::spawn(irc::writer_task(
        FramedWrite::new(write_half, LineCodec::new()?),
        outbound,
    ));
    for command in irc::registration(irc_config) {
        chat.send(command)?;
    }

    let running = registry.start(chat.clone(), &shutdown);
    info!(watchers = ?running.watcher_names(), "watchers started");

    let result = irc::read_loop(inbound, &chat, &running, &shutdown).await;

    running.shutdown(SHUTDOWN_GRACE).await;
    drop(chat);
    match tokio::time::timeout(DRAIN_TIMEOUT, writer).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => warn!(error = %e, "IRC writer failed"),
        Ok(Err(e)) => warn!(error = %e, "IRC writer task failed"),
        Err(_) => warn!("IRC writer did not drain in time"),
    }

    if let Err(e) = &result {
        error!(error = %e, "IRC connection lost");
    }
    result
}
