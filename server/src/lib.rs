//! Goplum Relay
//!
//! Bridges Goplum monitoring webhooks to an IRC channel through the bot
//! host's gRPC plugin API. Webhooks are acknowledged immediately and relayed
//! in the background; delivery is best-effort.

pub mod config;
pub mod observability;
pub mod relay;
pub mod rpc;
pub mod webhooks;
