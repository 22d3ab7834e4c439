//! Webhook Request Handler
//!
//! Answers each request immediately and relays accepted payloads to the chat
//! channel from a background task.

use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;
use relay_proto::{HttpRequest, HttpResponse};
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

use super::types::{GoPlumHook, NotifyOutcome};
use crate::config::WebhookConfig;
use crate::rpc::ChannelMessenger;

/// Body returned for accepted webhooks.
pub const DELIVERED: &str = "Delivered";

/// Body returned for any other path.
pub const NOT_FOUND: &str = "Not found.";

const MESSAGE_PREFIX: &str = "Monitoring: ";

/// Validates webhook paths and dispatches chat notifications.
///
/// Notifications run as fire-and-forget tasks in an unbounded
/// [`TaskTracker`]. There is no backpressure: a burst of webhooks spawns one
/// task per request.
pub struct WebhookHandler {
    expected_path: String,
    channel: Arc<str>,
    messenger: Arc<dyn ChannelMessenger>,
    tasks: TaskTracker,
}

impl WebhookHandler {
    pub fn new(config: &WebhookConfig, messenger: Arc<dyn ChannelMessenger>) -> Self {
        Self {
            expected_path: config.expected_path(),
            channel: Arc::from(config.channel.as_str()),
            messenger,
            tasks: TaskTracker::new(),
        }
    }

    /// Answer one webhook request.
    ///
    /// Must be called from within a Tokio runtime: accepted requests spawn
    /// their notification before this returns.
    pub fn handle(&self, request: HttpRequest) -> HttpResponse {
        if !paths_match(&request.path, &self.expected_path) {
            debug!(
                path_len = request.path.len(),
                "Rejected webhook for unknown path"
            );
            return HttpResponse::new(i32::from(StatusCode::NOT_FOUND.as_u16()), NOT_FOUND);
        }

        let event_id = Uuid::now_v7();
        info!(event_id = %event_id, size = request.body.len(), "Received webhook");

        let messenger = Arc::clone(&self.messenger);
        let channel = Arc::clone(&self.channel);
        self.tasks.spawn(
            async move {
                notify(messenger.as_ref(), &channel, &request.body).await;
            }
            .instrument(info_span!("notify", event_id = %event_id)),
        );

        HttpResponse::new(i32::from(StatusCode::OK.as_u16()), DELIVERED)
    }

    /// Notifications that have been spawned and not yet finished.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Stop accepting notification tasks and wait up to `grace` for the
    /// in-flight ones. Returns `false` if some were still running.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.tasks.close();
        tokio::time::timeout(grace, self.tasks.wait()).await.is_ok()
    }
}

/// Decode `body` and, if it carries summary text, send it to `channel`.
///
/// Every failure is logged here and reported only through the returned
/// outcome; nothing is retried.
pub async fn notify(
    messenger: &dyn ChannelMessenger,
    channel: &str,
    body: &[u8],
) -> NotifyOutcome {
    let hook = match GoPlumHook::from_slice(body) {
        Ok(hook) => hook,
        Err(e) => {
            error!(error = %e, "Unable to decode webhook payload");
            return NotifyOutcome::DecodeFailed;
        }
    };

    let Some(message) = format_message(&hook) else {
        debug!(check = %hook.name, "Webhook has no summary text, nothing to relay");
        return NotifyOutcome::EmptyText;
    };

    match messenger.send_channel_message(channel, &message).await {
        Ok(()) => {
            debug!(channel, check = %hook.name, "Relayed monitoring event");
            NotifyOutcome::Sent
        }
        Err(e) => {
            error!(channel, error = %e, "Failed to send channel message");
            NotifyOutcome::SendFailed
        }
    }
}

/// The chat line for a hook, or `None` when there is no summary text.
pub fn format_message(hook: &GoPlumHook) -> Option<String> {
    if hook.text.is_empty() {
        None
    } else {
        Some(format!("{MESSAGE_PREFIX}{}", hook.text))
    }
}

/// Exact path comparison that does not short-circuit on the secret.
fn paths_match(path: &str, expected: &str) -> bool {
    path.len() == expected.len()
        && path
            .as_bytes()
            .iter()
            .zip(expected.as_bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

impl std::fmt::Debug for WebhookHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookHandler")
            .field("channel", &self.channel)
            .field("in_flight", &self.tasks.len())
            .finish_non_exhaustive()
    }
}
