//! Conference room watcher over XMPP-on-websocket.
//!
//! Joins a room as a muted observer, keeps a roster of participants keyed by
//! their jid, and posts `jitsi: +nick` / `jitsi: -nick` notices as people come
//! and go. Any transport failure drops the connection and starts over with a
//! full handshake after a fixed delay.

mod connection;
pub mod frames;
mod roster;
mod stanza;
mod types;

pub use connection::RoomWatcher;
pub use roster::{Roster, RosterChange};
pub use stanza::{parse_presence, Presence};
pub use types::{ConnectionState, RoomConfig};
