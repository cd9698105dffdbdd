//! Inbound presence stanza parsing.
//!
//! Only three things matter: the `type` attribute, the `<nick>` text, and the
//! `jid` attribute of `<x><item/></x>`. Anything that is not a complete
//! `<presence>` document parses to `None`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Presence {
    pub kind: Option<String>,
    pub nick: Option<String>,
    pub jid: Option<String>,
}

impl Presence {
    pub fn is_unavailable(&self) -> bool {
        self.kind.as_deref() == Some("unavailable")
    }
}

fn attr(element: &BytesStart<'_>, name: &str) -> Option<String> {
    let value = element.try_get_attribute(name).ok()??;
    let value = value.unescape_value().ok()?;
    (!value.is_empty()).then(|| value.into_owned())
}

pub fn parse_presence(frame: &str) -> Option<Presence> {
    let mut reader = Reader::from_str(frame);
    let mut presence = Presence::default();
    // Element names from the root down to the current element.
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut nick = String::new();

    loop {
        match reader.read_event().ok()? {
            Event::Start(e) => {
                visit(&e, &path, &mut presence)?;
                path.push(e.local_name().as_ref().to_vec());
            }
            Event::Empty(e) => {
                visit(&e, &path, &mut presence)?;
                if path.is_empty() {
                    // Self-closing root.
                    break;
                }
            }
            Event::End(_) => {
                path.pop();
                if path.is_empty() {
                    break;
                }
            }
            Event::Text(t) if in_nick(&path) => nick.push_str(&t.unescape().ok()?),
            Event::CData(t) if in_nick(&path) => nick.push_str(std::str::from_utf8(&t).ok()?),
            Event::Eof => return None,
            _ => {}
        }
    }

    if !nick.is_empty() {
        presence.nick = Some(nick);
    }
    Some(presence)
}

fn in_nick(path: &[Vec<u8>]) -> bool {
    path.len() == 2 && path[1] == b"nick"
}

/// Inspect one opening tag. Returns `None` when the root is not `presence`.
fn visit(element: &BytesStart<'_>, path: &[Vec<u8>], presence: &mut Presence) -> Option<()> {
    let name = element.local_name();
    match path.len() {
        0 => {
            if name.as_ref() != b"presence" {
                return None;
            }
            presence.kind = attr(element, "type");
        }
        2 if path[1] == b"x" && name.as_ref() == b"item" && presence.jid.is_none() => {
            presence.jid = attr(element, "jid");
        }
        _ => {}
    }
    Some(())
}
