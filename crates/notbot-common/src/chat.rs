//! Chat relay interface: the outbound message handle shared by every watcher.
//! Inbound and outbound lines are [`irc_proto::Message`] values.

use irc_proto::{Command, Message};
use tokio::sync::mpsc;

use crate::errors::NotbotError;

/// Cloneable handle for queueing whole messages on the chat connection.
///
/// Every clone feeds the same writer task, so concurrent writers never
/// interleave partial lines.
#[derive(Debug, Clone)]
pub struct ChatSender {
    tx: mpsc::UnboundedSender<Message>,
}

impl ChatSender {
    /// Create a sender together with the receiving end the writer drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue one message as-is.
    pub fn send(&self, message: impl Into<Message>) -> Result<(), NotbotError> {
        self.tx.send(message.into()).map_err(|_| NotbotError::ChatClosed)
    }

    /// `NOTICE <channel> :<text>`. Line breaks in either argument are
    /// flattened so one call never produces more than one line on the wire.
    pub fn notice(&self, channel: &str, text: &str) -> Result<(), NotbotError> {
        self.send(Command::NOTICE(flatten(channel), flatten(text)))
    }

    /// `JOIN <channel>`
    pub fn join(&self, channel: &str) -> Result<(), NotbotError> {
        self.send(Command::JOIN(flatten(channel), None, None))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

fn flatten(text: &str) -> String {
    text.trim_end_matches(['\r', '\n'])
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_targets_the_channel() {
        let (chat, mut rx) = ChatSender::channel();
        chat.notice("#members", "arrived: alice").unwrap();
        assert_eq!(
            rx.try_recv().unwrap().command,
            Command::NOTICE("#members".into(), "arrived: alice".into())
        );
    }

    #[test]
    fn embedded_line_breaks_are_flattened() {
        let (chat, mut rx) = ChatSender::channel();
        chat.notice("#members", "bob\r\nQUIT :pwned").unwrap();
        let message = rx.try_recv().unwrap();
        assert_eq!(
            message.command,
            Command::NOTICE("#members".into(), "bob  QUIT :pwned".into())
        );
        assert_eq!(message.to_string().matches('\n').count(), 1);
    }

    #[test]
    fn trailing_newline_is_dropped() {
        let (chat, mut rx) = ChatSender::channel();
        chat.join("#a\n").unwrap();
        assert_eq!(rx.try_recv().unwrap().command, Command::JOIN("#a".into(), None, None));
    }

    #[test]
    fn raw_commands_pass_through() {
        let (chat, mut rx) = ChatSender::channel();
        chat.send(Command::QUIT(Some("bye".into()))).unwrap();
        assert_eq!(rx.try_recv().unwrap().command, Command::QUIT(Some("bye".into())));
    }

    #[test]
    fn write_after_receiver_dropped_fails() {
        let (chat, rx) = ChatSender::channel();
        drop(rx);
        assert!(chat.is_closed());
        assert!(matches!(chat.join("#a"), Err(NotbotError::ChatClosed)));
    }
}
