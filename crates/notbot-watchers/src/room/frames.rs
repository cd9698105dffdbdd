//! Outbound XMPP frames. Every substituted value is XML-escaped.

use quick_xml::escape::escape;

const FRAMING_NS: &str = "urn:ietf:params:xml:ns:xmpp-framing";

pub fn stream_open(server: &str) -> String {
    format!(
        r#"<open to="{}" version="1.0" xmlns="{FRAMING_NS}"/>"#,
        escape(server)
    )
}

pub fn anonymous_auth() -> String {
    r#"<auth mechanism="ANONYMOUS" xmlns="urn:ietf:params:xml:ns:xmpp-sasl"/>"#.to_string()
}

pub fn bind_resource() -> String {
    r#"<iq id="_bind_auth_2" type="set" xmlns="jabber:client"><bind xmlns="urn:ietf:params:xml:ns:xmpp-bind"/></iq>"#
        .to_string()
}

pub fn establish_session() -> String {
    r#"<iq id="_session_auth_2" type="set" xmlns="jabber:client"><session xmlns="urn:ietf:params:xml:ns:xmpp-session"/></iq>"#
        .to_string()
}

/// Join `room` as occupant `occupant`, muted, under display name `nick`.
pub fn join_room(server: &str, room: &str, occupant: &str, nick: &str) -> String {
    format!(
        concat!(
            r#"<presence to="{room}@conference.{server}/{occupant}" xmlns="jabber:client">"#,
            r#"<x xmlns="http://jabber.org/protocol/muc"/>"#,
            "<videomuted>true</videomuted><audiomuted>true</audiomuted>",
            r#"<nick xmlns="http://jabber.org/protocol/nick">{nick}</nick>"#,
            "</presence>"
        ),
        room = escape(room),
        server = escape(server),
        occupant = escape(occupant),
        nick = escape(nick),
    )
}

/// Liveness probe; `seq` only makes the iq id unique.
pub fn ping(seq: u64) -> String {
    format!(r#"<iq type="get" id="ping-{seq}" xmlns="jabber:client"><ping xmlns="urn:xmpp:ping"/></iq>"#)
}

/// The full opening sequence, in the order it must be written: open, auth,
/// reopen, bind, session, join.
pub fn handshake(server: &str, room: &str, occupant: &str, nick: &str) -> Vec<String> {
    vec![
        stream_open(server),
        anonymous_auth(),
        stream_open(server),
        bind_resource(),
        establish_session(),
        join_room(server, room, occupant, nick),
    ]
}
