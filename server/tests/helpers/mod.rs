//! Reusable test helpers for webhook relay integration tests.
//!
//! Provides [`RecordingMessenger`], an in-memory [`ChannelMessenger`] that
//! records every send, [`LogBuffer`] for asserting on log output, and
//! shortcuts for building handlers and requests.
#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use goplum_relay::config::Config;
use goplum_relay::rpc::{ChannelMessenger, RpcError};
use goplum_relay::webhooks::WebhookHandler;
use relay_proto::HttpRequest;

/// Secret used by [`Config::default_for_test`].
pub const SECRET: &str = "s3cr3t";

/// Channel used by [`Config::default_for_test`].
pub const CHANNEL: &str = "#monitoring";

/// Records channel messages instead of sending them.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
    delay: Option<Duration>,
}

impl RecordingMessenger {
    /// A messenger whose every send is rejected by the "bot host".
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// A messenger that takes `delay` to deliver each message.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Every `(channel, message)` pair sent so far.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelMessenger for RecordingMessenger {
    async fn send_channel_message(&self, channel: &str, message: &str) -> Result<(), RpcError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(RpcError::Rejected("no such channel".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((channel.to_owned(), message.to_owned()));
        Ok(())
    }
}

/// Build a handler for the test configuration around `messenger`.
pub fn handler_with(messenger: Arc<RecordingMessenger>) -> WebhookHandler {
    WebhookHandler::new(&Config::default_for_test().webhook, messenger)
}

/// The path accepted by handlers built with [`handler_with`].
pub fn webhook_path() -> String {
    format!("/goplum/{SECRET}")
}

pub fn request(path: &str, body: &[u8]) -> HttpRequest {
    HttpRequest {
        path: path.to_owned(),
        body: body.to_vec(),
        method: "POST".into(),
        ..Default::default()
    }
}

/// Wait for every notification spawned by `handler` to finish.
pub async fn drain(handler: &WebhookHandler) {
    assert!(
        handler.shutdown(Duration::from_secs(5)).await,
        "notifications did not finish in time"
    );
}

/// Captures JSON log lines written while its subscriber is the default.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    /// Route events on the current thread into this buffer until the guard
    /// is dropped.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::TRACE)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Captured lines logged at `level` (e.g. `"ERROR"`).
    pub fn lines_at(&self, level: &str) -> Vec<String> {
        let marker = format!(r#""level":"{level}""#);
        self.contents()
            .lines()
            .filter(|line| line.contains(&marker))
            .map(str::to_owned)
            .collect()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
