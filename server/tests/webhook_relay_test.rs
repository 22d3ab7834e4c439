//! Webhook Relay Integration Tests
//!
//! Drives `WebhookHandler` end to end against an in-memory messenger:
//! path validation, immediate acknowledgement, and background relaying.
//!
//! Run with: `cargo test --test webhook_relay_test`

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use goplum_relay::webhooks::handler::{DELIVERED, NOT_FOUND};
use goplum_relay::webhooks::{notify, NotifyOutcome};
use helpers::{
    drain, handler_with, request, webhook_path, LogBuffer, RecordingMessenger, CHANNEL,
};

#[tokio::test]
async fn wrong_path_is_not_found_and_sends_nothing() {
    let messenger = Arc::new(RecordingMessenger::default());
    let handler = handler_with(messenger.clone());
    let body = br#"{"text":"db down"}"#;

    for path in [
        "/goplum/wrong",
        "/goplum/s3cr3t/",
        "/goplum/",
        "/goplum",
        "/other/s3cr3t",
        "goplum/s3cr3t",
        "",
    ] {
        let response = handler.handle(request(path, body));
        assert_eq!(response.status, 404, "path {path:?}");
        assert_eq!(response.body, NOT_FOUND.as_bytes(), "path {path:?}");
    }

    drain(&handler).await;
    assert!(messenger.sent().is_empty());
}

#[tokio::test]
async fn matching_path_is_delivered_regardless_of_body() {
    let messenger = Arc::new(RecordingMessenger::default());
    let handler = handler_with(messenger.clone());

    for body in [
        &br#"{"text":"db down"}"#[..],
        br#"{"text":""}"#,
        b"not json",
        b"",
    ] {
        let response = handler.handle(request(&webhook_path(), body));
        assert_eq!(response.status, 200);
        assert_eq!(response.body, DELIVERED.as_bytes());
    }

    drain(&handler).await;
    assert_eq!(messenger.sent().len(), 1);
}

#[tokio::test]
async fn relays_summary_text_once() {
    let messenger = Arc::new(RecordingMessenger::default());
    let handler = handler_with(messenger.clone());

    let response = handler.handle(request("/goplum/s3cr3t", br#"{"text":"db down"}"#));
    assert_eq!(response.status, 200);
    assert_eq!(response.body, b"Delivered");

    drain(&handler).await;
    assert_eq!(
        messenger.sent(),
        vec![(CHANNEL.to_owned(), "Monitoring: db down".to_owned())]
    );
}

#[tokio::test]
async fn empty_text_sends_nothing() {
    let messenger = Arc::new(RecordingMessenger::default());
    let handler = handler_with(messenger.clone());

    let response = handler.handle(request(&webhook_path(), br#"{"text":""}"#));
    assert_eq!(response.status, 200);

    drain(&handler).await;
    assert!(messenger.sent().is_empty());
    assert_eq!(
        notify(messenger.as_ref(), CHANNEL, br#"{"text":""}"#).await,
        NotifyOutcome::EmptyText
    );
}

#[tokio::test]
async fn malformed_body_is_acknowledged_but_not_relayed() {
    let messenger = Arc::new(RecordingMessenger::default());
    let handler = handler_with(messenger.clone());

    let response = handler.handle(request(&webhook_path(), b"{not json"));
    assert_eq!(response.status, 200);
    assert_eq!(response.body, DELIVERED.as_bytes());

    drain(&handler).await;
    assert!(messenger.sent().is_empty());
    assert_eq!(
        notify(messenger.as_ref(), CHANNEL, b"{not json").await,
        NotifyOutcome::DecodeFailed
    );
    assert!(messenger.sent().is_empty());
}

#[tokio::test]
async fn non_object_body_is_acknowledged_but_not_relayed() {
    let messenger = Arc::new(RecordingMessenger::default());
    let handler = handler_with(messenger.clone());

    let response = handler.handle(request(&webhook_path(), br#"["db down"]"#));
    assert_eq!(response.status, 200);
    assert_eq!(response.body, DELIVERED.as_bytes());

    drain(&handler).await;
    assert!(messenger.sent().is_empty());
    assert_eq!(
        notify(messenger.as_ref(), CHANNEL, br#"["db down"]"#).await,
        NotifyOutcome::DecodeFailed
    );
    assert!(messenger.sent().is_empty());
}

#[tokio::test]
async fn malformed_body_logs_one_decode_error() {
    let messenger = RecordingMessenger::default();
    let logs = LogBuffer::default();
    let guard = logs.install();

    let outcome = notify(&messenger, CHANNEL, b"{not json").await;
    drop(guard);

    assert_eq!(outcome, NotifyOutcome::DecodeFailed);
    let errors = logs.lines_at("ERROR");
    assert_eq!(errors.len(), 1, "logged: {}", logs.contents());
    assert!(errors[0].contains("Unable to decode webhook payload"));
    assert!(messenger.sent().is_empty());
}

#[tokio::test]
async fn rejected_path_is_not_logged() {
    let messenger = Arc::new(RecordingMessenger::default());
    let handler = handler_with(messenger.clone());
    let logs = LogBuffer::default();
    let guard = logs.install();

    let response = handler.handle(request("/goplum/guessed-secret", b"{}"));
    drop(guard);

    assert_eq!(response.status, 404);
    let contents = logs.contents();
    assert!(contents.contains("Rejected webhook for unknown path"));
    assert!(!contents.contains("guessed-secret"), "logged: {contents}");
}

#[tokio::test]
async fn send_failure_does_not_affect_response() {
    let messenger = Arc::new(RecordingMessenger::failing());
    let handler = handler_with(messenger.clone());

    let response = handler.handle(request(&webhook_path(), br#"{"text":"db down"}"#));
    assert_eq!(response.status, 200);
    assert_eq!(response.body, DELIVERED.as_bytes());

    drain(&handler).await;
    assert_eq!(
        notify(messenger.as_ref(), CHANNEL, br#"{"text":"db down"}"#).await,
        NotifyOutcome::SendFailed
    );
}

#[tokio::test]
async fn response_does_not_wait_for_delivery() {
    let messenger = Arc::new(RecordingMessenger::slow(Duration::from_millis(200)));
    let handler = handler_with(messenger.clone());

    let response = handler.handle(request(&webhook_path(), br#"{"text":"slow"}"#));
    assert_eq!(response.status, 200);
    assert!(messenger.sent().is_empty());
    assert_eq!(handler.in_flight(), 1);

    drain(&handler).await;
    assert_eq!(messenger.sent().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_webhooks_relay_their_own_text() {
    let messenger = Arc::new(RecordingMessenger::slow(Duration::from_millis(20)));
    let handler = Arc::new(handler_with(messenger.clone()));

    let first = {
        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            handler.handle(request(&webhook_path(), br#"{"text":"db down"}"#))
        })
    };
    let second = {
        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            handler.handle(request(&webhook_path(), br#"{"text":"web up"}"#))
        })
    };

    let (first, second) = tokio::join!(first, second);
    assert_eq!(first.unwrap().status, 200);
    assert_eq!(second.unwrap().status, 200);

    drain(&handler).await;
    let mut messages: Vec<String> = messenger
        .sent()
        .into_iter()
        .map(|(channel, message)| {
            assert_eq!(channel, CHANNEL);
            message
        })
        .collect();
    messages.sort();
    assert_eq!(messages, vec!["Monitoring: db down", "Monitoring: web up"]);
}
