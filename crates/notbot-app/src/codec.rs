//! Line framing for the IRC connection.

use std::io;

use bytes::BytesMut;
use irc_proto::error::ProtocolError;
use irc_proto::{IrcCodec, Message};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

/// Longest inbound line accepted, message tags included.
pub const MAX_LINE_BYTES: usize = 8192;

/// [`IrcCodec`] with a cap on inbound line length. Lines that do not parse
/// as a message, blank ones included, are skipped instead of ending the
/// stream.
pub struct LineCodec {
    inner: IrcCodec,
}

impl LineCodec {
    pub fn new() -> Result<Self, ProtocolError> {
        Ok(Self {
            inner: IrcCodec::new("utf-8")?,
        })
    }
}

impl Decoder for LineCodec {
    type Item = Message;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>, ProtocolError> {
        loop {
            match src.iter().position(|b| *b == b'\n') {
                Some(end) if end < MAX_LINE_BYTES => {}
                None if src.len() < MAX_LINE_BYTES => return Ok(None),
                _ => {
                    src.clear();
                    return Err(ProtocolError::Io(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("inbound line longer than {MAX_LINE_BYTES} bytes"),
                    )));
                }
            }

            match self.inner.decode(src) {
                Err(ProtocolError::InvalidMessage { string, cause, .. }) => {
                    trace!(line = %string.trim_end(), error = %cause, "skipping unparseable line");
                }
                decoded => return decoded,
            }
        }
    }
}

impl Encoder<Message> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, message: Message, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        self.inner.encode(message, dst)
    }
}
