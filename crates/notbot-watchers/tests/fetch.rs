mod common;

use std::time::Duration;

use notbot_common::ChatSender;
use notbot_watchers::fetch::DEFAULT_MAX_BODY_BYTES;
use notbot_watchers::{
    CheckinSource, FetchError, FetchLimits, FirstPoll, HttpFetcher, PollingWatcher, SpaceApiSource,
    WatchError,
};

fn fetcher(limits: FetchLimits) -> HttpFetcher {
    HttpFetcher::without_proxy(limits).unwrap()
}

#[tokio::test]
async fn body_at_cap_is_returned_whole() {
    let body = vec![b'a'; DEFAULT_MAX_BODY_BYTES];
    let url = common::serve_body(body.clone()).await;

    let got = fetcher(FetchLimits::default()).fetch(&url).await.unwrap();
    assert_eq!(got.len(), DEFAULT_MAX_BODY_BYTES);
    assert!(got == body);
}

#[tokio::test]
async fn body_past_cap_is_truncated_without_error() {
    let mut body = vec![b'a'; DEFAULT_MAX_BODY_BYTES];
    body.push(b'z');
    let url = common::serve_body(body).await;

    let got = fetcher(FetchLimits::default()).fetch(&url).await.unwrap();
    assert_eq!(got.len(), DEFAULT_MAX_BODY_BYTES);
    assert!(got.iter().all(|b| *b == b'a'));
}

#[tokio::test]
async fn custom_cap_applies() {
    let url = common::serve_body(vec![b'x'; 4000]).await;
    let limits = FetchLimits {
        max_body_bytes: 1024,
        ..FetchLimits::default()
    };

    let got = fetcher(limits).fetch(&url).await.unwrap();
    assert_eq!(got.len(), 1024);
}

#[tokio::test]
async fn error_status_still_yields_body() {
    let url = common::serve_sequence("503 Service Unavailable", vec![b"{\"oops\":1}".to_vec()]).await;

    let got = fetcher(FetchLimits::default()).fetch(&url).await.unwrap();
    assert_eq!(got, b"{\"oops\":1}");
}

#[tokio::test]
async fn silent_server_times_out() {
    let url = common::serve_stalled().await;
    let limits = FetchLimits {
        timeout: Duration::from_millis(200),
        ..FetchLimits::default()
    };

    let err = fetcher(limits).fetch(&url).await.unwrap_err();
    assert!(matches!(err, FetchError::Timeout(_)), "{err}");
}

#[tokio::test]
async fn refused_connection_is_a_request_error() {
    let url = common::refused_url().await;

    let err = fetcher(FetchLimits::default()).fetch(&url).await.unwrap_err();
    assert!(matches!(err, FetchError::Request(_)), "{err}");
}

#[tokio::test]
async fn checkin_watcher_reports_over_http() {
    let url = common::serve_sequence(
        "200 OK",
        vec![
            br#"{"Users":[{"Login":"alice","Timestamp":1.0,"pretty_time":"now"},{"Login":"bob","Timestamp":2.0,"pretty_time":"now"}],"Esps":0,"Kektops":0,"Vms":0,"Unknown":0}"#.to_vec(),
            br#"{"Users":[{"Login":"bob","Timestamp":2.0,"pretty_time":"now"},{"Login":"carol","Timestamp":3.0,"pretty_time":"now"}],"Esps":0,"Kektops":0,"Vms":0,"Unknown":0}"#.to_vec(),
        ],
    )
    .await;

    let mut watcher = PollingWatcher::new(
        CheckinSource::new(fetcher(FetchLimits::default()), url),
        vec!["#hswaw-members".into()],
        Duration::from_secs(10),
        FirstPoll::Baseline,
    );
    let (chat, mut rx) = ChatSender::channel();

    assert_eq!(watcher.poll_once(&chat).await.unwrap(), None);
    watcher.poll_once(&chat).await.unwrap();

    assert_eq!(
        common::as_notice(rx.try_recv().unwrap()),
        "NOTICE #hswaw-members :arrived: c\u{200B}arol; left: a\u{200B}lice; also there: b\u{200B}ob"
    );
    assert_eq!(watcher.previous().unwrap(), ["bob", "carol"]);
}

#[tokio::test]
async fn spaceapi_decode_failure_keeps_snapshot() {
    let url = common::serve_sequence(
        "200 OK",
        vec![
            br#"{"sensors":{"people_now_present":[{"value":1,"names":["dave"]}]}}"#.to_vec(),
            b"<html>maintenance</html>".to_vec(),
        ],
    )
    .await;

    let mut watcher = PollingWatcher::new(
        SpaceApiSource::new(fetcher(FetchLimits::default()), url),
        vec!["#hswaw".into()],
        Duration::from_secs(10),
        FirstPoll::Baseline,
    );
    let (chat, mut rx) = ChatSender::channel();

    watcher.poll_once(&chat).await.unwrap();
    let err = watcher.poll_once(&chat).await.unwrap_err();
    assert!(matches!(err, WatchError::Decode(_)), "{err}");
    assert_eq!(watcher.previous().unwrap(), ["dave"]);
    assert!(rx.try_recv().is_err());
}
