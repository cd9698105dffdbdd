//! Presence watchers for notbot.
//!
//! Each watcher owns one external presence source, keeps a snapshot of who
//! is there, and posts arrivals and departures to its chat channels:
//!
//! - [`room::RoomWatcher`] streams a conference room over XMPP-on-websocket.
//! - [`polling::PollingWatcher`] polls a JSON endpoint on a timer, with
//!   [`polling::CheckinSource`] and [`polling::SpaceApiSource`] variants.
//!
//! [`query::PresenceQuery`] answers on-demand presence questions in chat.

pub mod diff;
pub mod errors;
pub mod fetch;
pub mod obfuscate;
pub mod polling;
pub mod query;
pub mod room;

pub use diff::{diff, SnapshotDiff};
pub use errors::{FetchError, WatchError};
pub use fetch::{FetchLimits, HttpFetcher};
pub use obfuscate::obfuscate;
pub use polling::{CheckinSource, FirstPoll, PollingWatcher, SnapshotSource, SpaceApiSource};
pub use query::PresenceQuery;
pub use room::{ConnectionState, RoomConfig, RoomWatcher};
