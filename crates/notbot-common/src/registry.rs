//! Extension registry: the composition root for watchers and dispatchers.
//!
//! Everything is registered up front on a plain `Registry` value owned by
//! the startup code. `start` consumes it, launches every watcher in its own
//! task with its own shutdown token, and returns a `RunningRegistry` whose
//! dispatcher list is immutable and shared without locking.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use irc_proto::Message;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::chat::ChatSender;

// ---------------------------------------------------------------------------
// Extension points
// ---------------------------------------------------------------------------

/// Callback invoked for every inbound chat message.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    fn name(&self) -> &str;

    async fn dispatch(&self, chat: ChatSender, message: Message);
}

/// Long-running background task owning one presence source.
#[async_trait]
pub trait Watcher: Send {
    fn name(&self) -> String;

    /// Channels this watcher posts to, so the runtime can join them.
    fn channels(&self) -> Vec<String>;

    /// Run until `shutdown` is cancelled.
    async fn run(self: Box<Self>, chat: ChatSender, shutdown: CancellationToken);
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct Registry {
    dispatchers: Vec<Arc<dyn Dispatcher>>,
    watchers: Vec<Box<dyn Watcher>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dispatcher(&mut self, dispatcher: impl Dispatcher + 'static) -> &mut Self {
        debug!(dispatcher = dispatcher.name(), "registering dispatcher");
        self.dispatchers.push(Arc::new(dispatcher));
        self
    }

    pub fn add_watcher(&mut self, watcher: impl Watcher + 'static) -> &mut Self {
        debug!(watcher = %watcher.name(), "registering watcher");
        self.watchers.push(Box::new(watcher));
        self
    }

    pub fn dispatcher_count(&self) -> usize {
        self.dispatchers.len()
    }

    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }

    /// Every channel some registered watcher posts to, deduplicated, in
    /// registration order.
    pub fn watcher_channels(&self) -> Vec<String> {
        let mut channels: Vec<String> = Vec::new();
        for channel in self.watchers.iter().flat_map(|w| w.channels()) {
            if !channels.contains(&channel) {
                channels.push(channel);
            }
        }
        channels
    }

    /// Start every watcher concurrently. Each one gets a child of `shutdown`,
    /// so cancelling the parent stops all of them while each token can still
    /// be cancelled on its own.
    pub fn start(self, chat: ChatSender, shutdown: &CancellationToken) -> RunningRegistry {
        let mut watchers = Vec::with_capacity(self.watchers.len());

        for watcher in self.watchers {
            let name = watcher.name();
            let token = shutdown.child_token();
            info!(watcher = %name, "starting watcher");
            let handle = tokio::spawn(watcher.run(chat.clone(), token.clone()));
            watchers.push(RunningWatcher {
                name,
                token,
                handle,
            });
        }

        RunningRegistry {
            dispatchers: self.dispatchers.into(),
            watchers,
        }
    }
}

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

struct RunningWatcher {
    name: String,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct RunningRegistry {
    dispatchers: Arc<[Arc<dyn Dispatcher>]>,
    watchers: Vec<RunningWatcher>,
}

impl RunningRegistry {
    /// Fan one inbound message out to every dispatcher, one task each. Every
    /// task gets its own copy of the message.
    pub fn dispatch(&self, chat: &ChatSender, message: &Message) -> Vec<JoinHandle<()>> {
        self.dispatchers
            .iter()
            .map(|dispatcher| {
                let dispatcher = Arc::clone(dispatcher);
                let chat = chat.clone();
                let message = message.clone();
                tokio::spawn(async move { dispatcher.dispatch(chat, message).await })
            })
            .collect()
    }

    pub fn watcher_names(&self) -> Vec<&str> {
        self.watchers.iter().map(|w| w.name.as_str()).collect()
    }

    /// Signal every watcher and wait up to `grace` for each to return.
    /// Watchers still running after that are aborted.
    pub async fn shutdown(self, grace: Duration) {
        for watcher in &self.watchers {
            watcher.token.cancel();
        }

        for mut watcher in self.watchers {
            match tokio::time::timeout(grace, &mut watcher.handle).await {
                Ok(Ok(())) => debug!(watcher = %watcher.name, "watcher stopped"),
                Ok(Err(e)) => warn!(watcher = %watcher.name, error = %e, "watcher task failed"),
                Err(_) => {
                    warn!(watcher = %watcher.name, "watcher did not stop in time, aborting");
                    watcher.handle.abort();
                }
            }
        }
    }
}
