//! Minimal IRC transport: registration, keepalive replies, dispatch.

use futures_util::{SinkExt, StreamExt};
use notbot_common::{CancellationToken, ChatSender, Command, Message, NotbotError, Response, RunningRegistry};
use notbot_config::schema::IrcConfig;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, trace};

use crate::codec::LineCodec;

/// `PASS` (when set), `NICK` and `USER`, in that order.
pub fn registration(irc: &IrcConfig) -> Vec<Command> {
    let mut commands = Vec::with_capacity(3);
    if let Some(password) = &irc.password {
        commands.push(Command::PASS(password.clone()));
    }
    commands.push(Command::NICK(irc.nick.clone()));
    commands.push(Command::USER(irc.user.clone(), "0".into(), irc.realname.clone()));
    commands
}

/// Drain queued messages onto the socket until every sender is gone.
pub async fn writer_task<W>(
    mut sink: FramedWrite<W, LineCodec>,
    mut outbound: mpsc::UnboundedReceiver<Message>,
) -> Result<(), NotbotError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = outbound.recv().await {
        if !matches!(message.command, Command::PASS(_)) {
            trace!(line = %message.to_string().trim_end(), "outbound");
        }
        sink.send(message).await?;
    }
    sink.close().await?;
    Ok(())
}

/// Read messages until the server goes away or `shutdown` fires. Answers
/// `PING` directly and hands everything else to the dispatchers.
pub async fn read_loop<R>(
    mut lines: FramedRead<R, LineCodec>,
    chat: &ChatSender,
    registry: &RunningRegistry,
    shutdown: &CancellationToken,
) -> Result<(), NotbotError>
where
    R: AsyncRead + Unpin,
{
    loop {
        let next = tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                info!("leaving IRC");
                chat.send(Command::QUIT(Some("shutting down".into())))?;
                return Ok(());
            }
            next = lines.next() => next,
        };
        let message = match next {
            Some(message) => message?,
            None => return Err(NotbotError::Other("IRC server closed the connection".into())),
        };

        match &message.command {
            Command::PING(server, _) => {
                chat.send(Command::PONG(server.clone(), None))?;
                continue;
            }
            Command::ERROR(reason) => {
                return Err(NotbotError::Other(format!("IRC server error: {reason}")));
            }
            Command::Response(Response::ERR_NICKNAMEINUSE | Response::ERR_PASSWDMISMATCH, args) => {
                return Err(NotbotError::Registration(args.last().cloned().unwrap_or_default()));
            }
            _ => {}
        }

        debug!(command = %String::from(&message.command), "dispatching");
        registry.dispatch(chat, &message);
    }
}
