//! Timer-driven watchers that poll a JSON presence endpoint.
//!
//! Every tick fetches a fresh snapshot, diffs it against the previous one and
//! posts a single report (`arrived: ...; left: ...; also there: ...`) to each
//! target channel. The two sources differ only in how the JSON is decoded.

mod checkin;
mod spaceapi;


use std::time::Duration;

use async_trait::async_trait;
use notbot_common::{CancellationToken, ChatSender, Watcher};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::diff::{diff, SnapshotDiff};
use crate::errors::WatchError;
use crate::obfuscate::obfuscate_all;

pub use checkin::{CheckinResponse, CheckinSource, CheckinUser};
pub use spaceapi::{fetch_present_names, PeopleNowPresent, Sensors, SpaceApiResponse, SpaceApiSource};

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Something that can produce the current list of present identities.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Short human-readable description, used in the watcher name and logs.
    fn describe(&self) -> String;

    async fn snapshot(&self) -> Result<Vec<String>, WatchError>;
}

/// Drop empty names and repeated names, keeping first-seen order.
pub(crate) fn normalize_names<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if name.is_empty() || out.contains(&name) {
            continue;
        }
        out.push(name);
    }
    out
}

// ---------------------------------------------------------------------------
// Watcher
// ---------------------------------------------------------------------------

/// What the first successful poll does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstPoll {
    /// Report everyone present as arrived.
    Announce,
    /// Store the snapshot without posting anything.
    Baseline,
}

impl FirstPoll {
    pub fn from_announce(announce: bool) -> Self {
        if announce {
            FirstPoll::Announce
        } else {
            FirstPoll::Baseline
        }
    }
}

pub struct PollingWatcher<S> {
    source: S,
    channels: Vec<String>,
    interval: Duration,
    first_poll: FirstPoll,
    previous: Option<Vec<String>>,
}

impl<S: SnapshotSource> PollingWatcher<S> {
    pub fn new(source: S, channels: Vec<String>, interval: Duration, first_poll: FirstPoll) -> Self {
        Self {
            source,
            channels,
            interval,
            first_poll,
            previous: None,
        }
    }

    /// Snapshot stored by the last successful poll, if any.
    pub fn previous(&self) -> Option<&[String]> {
        self.previous.as_deref()
    }

    /// Run one fetch-diff-notify cycle. Returns the posted report, if any.
    ///
    /// On error nothing is posted and the stored snapshot is untouched. On
    /// success the stored snapshot is always replaced, changed or not.
    pub async fn poll_once(&mut self, chat: &ChatSender) -> Result<Option<String>, WatchError> {
        let current = self.source.snapshot().await?;

        let report = match (&self.previous, self.first_poll) {
            (None, FirstPoll::Baseline) => {
                debug!(source = %self.source.describe(), present = current.len(), "baseline stored");
                None
            }
            (previous, _) => {
                let previous = previous.as_deref().unwrap_or_default();
                render_report(&diff(&current, previous))
            }
        };

        if let Some(text) = &report {
            info!(source = %self.source.describe(), report = %text, "presence changed");
            for channel in &self.channels {
                if let Err(e) = chat.notice(channel, text) {
                    warn!(channel = %channel, error = %e, "failed to queue notice");
                }
            }
        }

        self.previous = Some(current);
        Ok(report)
    }
}

/// Render a diff as one notice line, or `None` when nobody came or went.
pub fn render_report(diff: &SnapshotDiff<String>) -> Option<String> {
    if diff.is_empty() {
        return None;
    }

    let mut segments = Vec::with_capacity(3);
    if !diff.arrived.is_empty() {
        segments.push(format!("arrived: {}", obfuscate_all(&diff.arrived).join(", ")));
    }
    if !diff.left.is_empty() {
        segments.push(format!("left: {}", obfuscate_all(&diff.left).join(", ")));
    }
    if !diff.still_present.is_empty() {
        segments.push(format!(
            "also there: {}",
            obfuscate_all(&diff.still_present).join(", ")
        ));
    }

    Some(segments.join("; "))
}

#[async_trait]
impl<S: SnapshotSource + 'static> Watcher for PollingWatcher<S> {
    fn name(&self) -> String {
        self.source.describe()
    }

    fn channels(&self) -> Vec<String> {
        self.channels.clone()
    }

    async fn run(self: Box<Self>, chat: ChatSender, shutdown: CancellationToken) {
        let mut this = self;
        let source = this.source.describe();
        info!(source = %source, interval = ?this.interval, channels = ?this.channels, "polling watcher running");

        let mut ticker = tokio::time::interval_at(Instant::now() + this.interval, this.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!(source = %source, "polling watcher stopped");
                    return;
                }
                _ = ticker.tick() => {}
            }

            match this.poll_once(&chat).await {
                Ok(_) => {}
                Err(WatchError::Decode(e)) => {
                    warn!(source = %source, error = %e, "unable to decode snapshot, skipping tick");
                }
                Err(e) => {
                    warn!(source = %source, error = %e, "unable to fetch snapshot, skipping tick");
                }
            }
        }
    }
}
