pub mod chat;
pub mod errors;
pub mod registry;

pub use chat::ChatSender;
pub use errors::{ConfigError, NotbotError};
pub use registry::{Dispatcher, Registry, RunningRegistry, Watcher};

pub use irc_proto::{Command, Message, Response};
pub use tokio_util::sync::CancellationToken;
