//! Goplum Webhook Relay
//!
//! Accepts Goplum status webhooks on a secret path and relays their summary
//! line to a chat channel without making the caller wait for delivery.

pub mod handler;
pub mod types;

pub use handler::{notify, WebhookHandler};
pub use types::{GoPlumHook, LastResult, NotifyOutcome};

/// Route name registered with the bot host; webhooks arrive at
/// `/<ROUTE_NAME>/<secret>`.
pub const ROUTE_NAME: &str = "goplum";
