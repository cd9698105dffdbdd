//! Local servers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

/// `NOTICE <target> :<text>` for a queued chat message; panics on anything else.
pub fn as_notice(message: notbot_common::Message) -> String {
    match message.command {
        notbot_common::Command::NOTICE(target, text) => format!("NOTICE {target} :{text}"),
        other => panic!("expected a notice, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

async fn read_request_head(stream: &mut TcpStream) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
}

/// Serve `bodies` in order, one per connection; the last one repeats.
pub async fn serve_sequence(status: &'static str, bodies: Vec<Vec<u8>>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let bodies = Arc::new(Mutex::new(bodies));

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let body = {
                let mut bodies = bodies.lock().unwrap();
                if bodies.len() > 1 {
                    bodies.remove(0)
                } else {
                    bodies.first().cloned().unwrap_or_default()
                }
            };
            tokio::spawn(async move {
                read_request_head(&mut stream).await;
                let head = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes()).await;
                let _ = stream.write_all(&body).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    format!("http://{addr}/api")
}

pub async fn serve_body(body: Vec<u8>) -> String {
    serve_sequence("200 OK", vec![body]).await
}

/// Accept connections and read the request, but never answer.
pub async fn serve_stalled() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((mut stream, _)) = listener.accept().await {
            read_request_head(&mut stream).await;
            held.push(stream);
        }
    });

    format!("http://{addr}/api")
}

/// An address nothing listens on.
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

// ---------------------------------------------------------------------------
// Websocket
// ---------------------------------------------------------------------------

pub struct Accepted {
    pub ws: WebSocketStream<TcpStream>,
    pub path: String,
    pub origin: Option<String>,
    pub protocol: Option<String>,
}

impl Accepted {
    /// Next text frame from the client, skipping control frames.
    pub async fn next_text(&mut self) -> Option<String> {
        while let Some(message) = self.ws.next().await {
            match message {
                Ok(Message::Text(text)) => return Some(text.as_str().to_string()),
                Ok(Message::Close(_)) | Err(_) => return None,
                Ok(_) => {}
            }
        }
        None
    }

    pub async fn handshake_frames(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        for _ in 0..6 {
            frames.push(self.next_text().await.expect("handshake frame"));
        }
        frames
    }
}

/// Websocket server that speaks the `xmpp` subprotocol and hands every
/// accepted connection to the test.
pub async fn xmpp_server() -> (String, mpsc::UnboundedReceiver<Accepted>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let seen = Arc::new(Mutex::new((String::new(), None, None)));
            let record = Arc::clone(&seen);
            let callback = move |req: &Request, mut resp: Response| -> Result<Response, ErrorResponse> {
                let header = |name: &str| {
                    req.headers()
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .map(String::from)
                };
                *record.lock().unwrap() = (
                    req.uri().to_string(),
                    header("origin"),
                    header("sec-websocket-protocol"),
                );
                resp.headers_mut()
                    .insert("sec-websocket-protocol", HeaderValue::from_static("xmpp"));
                Ok(resp)
            };

            let Ok(ws) = tokio_tungstenite::accept_hdr_async(stream, callback).await else {
                continue;
            };
            let (path, origin, protocol) = seen.lock().unwrap().clone();
            if tx
                .send(Accepted {
                    ws,
                    path,
                    origin,
                    protocol,
                })
                .is_err()
            {
                return;
            }
        }
    });

    (format!("ws://{addr}/xmpp-websocket?room=hswaw"), rx)
}

pub fn join_frame(jid: &str, nick: &str) -> String {
    format!(
        concat!(
            r#"<presence xmlns="jabber:client" from="hswaw@conference.meet.example.org/{jid}">"#,
            r#"<nick xmlns="http://jabber.org/protocol/nick">{nick}</nick>"#,
            r#"<x xmlns="http://jabber.org/protocol/muc#user"><item affiliation="none" role="participant" jid="{jid}@meet.example.org/r"/></x>"#,
            "</presence>"
        ),
        jid = jid,
        nick = nick
    )
}

pub fn leave_frame(jid: &str) -> String {
    format!(
        concat!(
            r#"<presence type="unavailable" xmlns="jabber:client">"#,
            r#"<x xmlns="http://jabber.org/protocol/muc#user"><item role="none" jid="{jid}@meet.example.org/r"/></x>"#,
            "</presence>"
        ),
        jid = jid
    )
}
