//! Websocket connection loop with fixed-delay reconnect.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use notbot_common::{CancellationToken, ChatSender, Watcher};
use tokio::sync::{watch, Mutex};
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, ORIGIN, SEC_WEBSOCKET_PROTOCOL};
use tokio_tungstenite::tungstenite::{self, Message as WsMessage};
use tracing::{debug, info, trace, warn};

use super::frames;
use super::roster::{Roster, RosterChange};
use super::stanza::parse_presence;
use super::types::{ConnectionState, RoomConfig};
use crate::errors::WatchError;
use crate::obfuscate::obfuscate;

/// Upper bound on sending the close frame when a cycle ends.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

pub struct RoomWatcher {
    config: RoomConfig,
    roster: Roster,
    state: watch::Sender<ConnectionState>,
}

impl RoomWatcher {
    pub fn new(config: RoomConfig) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            config,
            roster: Roster::new(),
            state,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Observe state transitions, e.g. to wait for `Streaming` in tests.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    fn label(&self) -> String {
        format!("{}/{}", self.config.server, self.config.room)
    }

    fn set_state(&self, state: ConnectionState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            debug!(room = %self.label(), from = %previous, to = %state, "room state");
        }
    }

    /// Feed one inbound frame through the parser and roster, posting a notice
    /// for joins and departures. Frames that are not presence stanzas are
    /// expected and dropped quietly.
    pub fn handle_frame(&mut self, frame: &str, chat: &ChatSender) -> Option<RosterChange> {
        let Some(presence) = parse_presence(frame) else {
            trace!(room = %self.label(), "ignoring non-presence frame");
            return None;
        };

        let change = self.roster.apply(&presence)?;
        let channel = &self.config.channel;
        let notice = match &change {
            RosterChange::Joined { nick, .. } => {
                info!(room = %self.label(), nick = %nick, "user joined");
                obfuscate(nick).map(|n| format!("jitsi: +{n}"))
            }
            RosterChange::Left { nick, .. } => {
                info!(room = %self.label(), nick = %nick, "user left");
                obfuscate(nick).map(|n| format!("jitsi: -{n}"))
            }
            RosterChange::Renamed { from, to, .. } => {
                info!(room = %self.label(), from = %from, to = %to, "user changed nickname");
                None
            }
        };

        if let Some(text) = notice {
            if let Err(e) = chat.notice(channel, &text) {
                warn!(channel = %channel, error = %e, "failed to queue notice");
            }
        }
        Some(change)
    }

    /// Reconnect until `shutdown` fires, then settle in `Stopped`.
    pub async fn run_until_stopped(&mut self, chat: &ChatSender, shutdown: &CancellationToken) {
        info!(room = %self.label(), channel = %self.config.channel, "room watcher running");

        loop {
            match self.connection_cycle(chat, shutdown).await {
                Ok(()) => break,
                Err(e) => {
                    self.set_state(ConnectionState::Disconnected);
                    warn!(room = %self.label(), error = %e, "room connection lost");
                }
            }

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.config.reconnect_delay) => {}
            }
            info!(room = %self.label(), "reconnecting");
        }

        self.set_state(ConnectionState::Stopped);
        info!(room = %self.label(), "room watcher stopped");
    }

    /// One attempt: connect, handshake, stream. `Ok` means shutdown was
    /// requested; every failure comes back as `Err`. The socket is closed on
    /// every exit path once it is open.
    pub async fn connection_cycle(
        &mut self,
        chat: &ChatSender,
        shutdown: &CancellationToken,
    ) -> Result<(), WatchError> {
        self.set_state(ConnectionState::Connecting);

        let mut request = self.config.ws_url().into_client_request()?;
        let origin = HeaderValue::from_str(&self.config.origin())
            .map_err(|e| WatchError::InvalidRequest(e.to_string()))?;
        request
            .headers_mut()
            .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static("xmpp"));
        request.headers_mut().insert(ORIGIN, origin);

        let connect_timeout = self.config.connect_timeout;
        let ws_stream = tokio::select! {
            biased;
            _ = shutdown.cancelled() => return Ok(()),
            connected = tokio::time::timeout(connect_timeout, tokio_tungstenite::connect_async(request)) => {
                connected.map_err(|_| WatchError::ConnectTimeout(connect_timeout))??.0
            }
        };

        let (ws_write, mut ws_read) = ws_stream.split();
        let ws_write = Arc::new(Mutex::new(ws_write));

        let outcome = match self.handshake(&*ws_write).await {
            Ok(()) => {
                let keepalive = tokio::spawn(keepalive_task(
                    Arc::clone(&ws_write),
                    self.config.keepalive,
                    self.label(),
                ));
                self.set_state(ConnectionState::Streaming);
                info!(room = %self.label(), "streaming presence");

                let outcome = self.read_frames(&mut ws_read, chat, shutdown).await;
                keepalive.abort();
                outcome
            }
            Err(e) => Err(e),
        };

        let mut writer = ws_write.lock().await;
        match tokio::time::timeout(CLOSE_TIMEOUT, writer.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => trace!(room = %self.label(), error = %e, "websocket close failed"),
            Err(_) => trace!(room = %self.label(), "websocket close timed out"),
        }

        outcome
    }

    async fn handshake<S>(&self, ws_write: &Mutex<S>) -> Result<(), WatchError>
    where
        S: Sink<WsMessage, Error = tungstenite::Error> + Unpin,
    {
        self.set_state(ConnectionState::Handshaking);

        // A fresh occupant id per cycle avoids colliding with our own
        // lingering session from before the reconnect.
        let occupant = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
        let frames = frames::handshake(
            &self.config.server,
            &self.config.room,
            &occupant,
            &self.config.nick,
        );

        let mut writer = ws_write.lock().await;
        for (index, frame) in frames.into_iter().enumerate() {
            writer
                .send(WsMessage::Text(frame.into()))
                .await
                .map_err(|e| WatchError::Handshake {
                    index,
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }

    async fn read_frames<R>(
        &mut self,
        ws_read: &mut R,
        chat: &ChatSender,
        shutdown: &CancellationToken,
    ) -> Result<(), WatchError>
    where
        R: Stream<Item = Result<WsMessage, tungstenite::Error>> + Unpin,
    {
        loop {
            let next = tokio::select! {
                biased;
                _ = shutdown.cancelled() => return Ok(()),
                next = ws_read.next() => next,
            };

            match next {
                Some(Ok(WsMessage::Text(text))) => {
                    self.handle_frame(text.as_str(), chat);
                }
                Some(Ok(WsMessage::Binary(bytes))) => {
                    if let Ok(text) = std::str::from_utf8(&bytes) {
                        self.handle_frame(text, chat);
                    }
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    debug!(room = %self.label(), frame = ?frame, "server closed websocket");
                    return Err(WatchError::Closed);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Err(WatchError::Closed),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Keepalive
// ---------------------------------------------------------------------------

/// Write a ping frame every `period` until a write fails.
async fn keepalive_task<S>(ws_write: Arc<Mutex<S>>, period: Duration, room: String)
where
    S: Sink<WsMessage> + Unpin,
    S::Error: Display,
{
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    let mut seq: u64 = 0;
    loop {
        interval.tick().await;
        seq += 1;
        let mut writer = ws_write.lock().await;
        if let Err(e) = writer.send(WsMessage::Text(frames::ping(seq).into())).await {
            warn!(room = %room, error = %e, "keepalive failed");
            break;
        }
    }
}

#[async_trait]
impl Watcher for RoomWatcher {
    fn name(&self) -> String {
        format!("jitsi {}", self.label())
    }

    fn channels(&self) -> Vec<String> {
        vec![self.config.channel.clone()]
    }

    async fn run(self: Box<Self>, chat: ChatSender, shutdown: CancellationToken) {
        let mut this = self;
        this.run_until_stopped(&chat, &shutdown).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use notbot_common::Command;

    const ZWSP: char = '\u{200B}';

    fn watcher() -> RoomWatcher {
        RoomWatcher::new(RoomConfig::new("#hswaw", "meet.example.org", "hswaw", "notbot"))
    }

    fn join(jid: &str, nick: &str) -> String {
        format!(
            r#"<presence from="hswaw@conference.meet.example.org/x"><nick xmlns="http://jabber.org/protocol/nick">{nick}</nick><x xmlns="http://jabber.org/protocol/muc#user"><item jid="{jid}"/></x></presence>"#
        )
    }

    fn leave(jid: &str) -> String {
        format!(
            r#"<presence type="unavailable"><x xmlns="http://jabber.org/protocol/muc#user"><item jid="{jid}"/></x></presence>"#
        )
    }

    #[test]
    fn join_then_leave_posts_two_notices_in_order() {
        let mut w = watcher();
        let (chat, mut rx) = ChatSender::channel();

        w.handle_frame(&join("j1@m/a", "alice"), &chat);
        w.handle_frame(&leave("j1@m/a"), &chat);

        assert_eq!(
            rx.try_recv().unwrap().command,
            Command::NOTICE("#hswaw".into(), format!("jitsi: +a{ZWSP}lice"))
        );
        assert_eq!(
            rx.try_recv().unwrap().command,
            Command::NOTICE("#hswaw".into(), format!("jitsi: -a{ZWSP}lice"))
        );
        assert!(rx.try_recv().is_err());
        assert!(w.roster().is_empty());
    }

    #[test]
    fn rename_is_silent_and_updates_roster() {
        let mut w = watcher();
        let (chat, mut rx) = ChatSender::channel();

        w.handle_frame(&join("j1@m/a", "alice"), &chat);
        rx.try_recv().unwrap();

        let change = w.handle_frame(&join("j1@m/a", "alicja"), &chat);
        assert!(matches!(change, Some(RosterChange::Renamed { .. })));
        assert!(rx.try_recv().is_err());
        assert_eq!(w.roster().nick("j1@m/a"), Some("alicja"));
    }

    #[test]
    fn noise_frames_are_ignored() {
        let mut w = watcher();
        let (chat, mut rx) = ChatSender::channel();

        for frame in [
            r#"<open from="meet.example.org" version="1.0"/>"#,
            r#"<success xmlns="urn:ietf:params:xml:ns:xmpp-sasl"/>"#,
            r#"<iq type="result" id="ping-1"/>"#,
            "<presence><nick>trunc",
            r#"<presence><nick>nobody</nick></presence>"#,
        ] {
            assert_eq!(w.handle_frame(frame, &chat), None);
        }
        assert!(rx.try_recv().is_err());
        assert!(w.roster().is_empty());
    }

    #[test]
    fn watcher_name_and_channel() {
        let w = watcher();
        assert_eq!(w.name(), "jitsi meet.example.org/hswaw");
        assert_eq!(w.channels(), vec!["#hswaw"]);
        assert_eq!(*w.subscribe_state().borrow(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn refused_connection_is_an_error() {
        let mut w = RoomWatcher::new(
            RoomConfig::new("#a", "127.0.0.1", "r", "n")
                .with_endpoint("ws://127.0.0.1:9/xmpp-websocket?room=r"),
        );
        let (chat, _rx) = ChatSender::channel();
        let result = w.connection_cycle(&chat, &CancellationToken::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn cancelled_before_connect_returns_ok() {
        let mut w = watcher();
        let (chat, _rx) = ChatSender::channel();
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        w.run_until_stopped(&chat, &shutdown).await;
        assert_eq!(*w.subscribe_state().borrow(), ConnectionState::Stopped);
    }
}
