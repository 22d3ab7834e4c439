//! Relay Runner
//!
//! Keeps the webhook route registered with the bot host. By default a failed
//! request stream is fatal; a bounded number of re-registrations can be
//! enabled with `--rpc-reconnect-attempts`.

use std::time::Duration;

use tracing::{info, warn};

use crate::rpc::{RpcError, WebhookRegistrar};
use crate::webhooks::WebhookHandler;

/// Upper bound for the delay between re-registrations.
const MAX_BACKOFF_SECS: u64 = 30;

/// Serve `route` until the bot host closes the stream or it fails for good.
///
/// `reconnect_attempts` bounds consecutive failures: a registration that
/// served at least one request resets the count.
pub async fn run<R>(
    registrar: &R,
    handler: &WebhookHandler,
    route: &str,
    reconnect_attempts: u32,
) -> Result<(), RpcError>
where
    R: WebhookRegistrar + ?Sized,
{
    let mut failures: u32 = 0;

    loop {
        let mut served: u64 = 0;
        let result = registrar
            .register_webhook(route, &mut |request| {
                served += 1;
                handler.handle(request)
            })
            .await;

        let e = match result {
            Ok(()) => {
                info!(route, served, "Webhook stream ended");
                return Ok(());
            }
            Err(e) => e,
        };

        if served > 0 {
            failures = 0;
        }
        if failures >= reconnect_attempts {
            return Err(e);
        }

        failures += 1;
        let delay = backoff_delay(failures);
        warn!(
            route,
            attempt = failures,
            max_attempts = reconnect_attempts,
            backoff_secs = delay.as_secs(),
            error = %e,
            "Webhook stream failed, re-registering"
        );
        tokio::time::sleep(delay).await;
    }
}

/// Exponential backoff: 2, 4, 8, 16 seconds, then capped.
fn backoff_delay(attempt: u32) -> Duration {
    let secs = 1u64 << attempt.min(6);
    Duration::from_secs(secs.min(MAX_BACKOFF_SECS))
}
