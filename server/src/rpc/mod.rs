//! Bot Host RPC Adapter
//!
//! Secured, token-authenticated gRPC client for the IRC bot host: sends
//! channel messages and serves webhook requests streamed from the host.

pub mod auth;
pub mod client;
pub mod error;
pub mod stream;
pub mod tls;

use async_trait::async_trait;
use relay_proto::{HttpRequest, HttpResponse};

pub use client::RpcClient;
pub use error::RpcError;
pub use stream::serve_requests;

/// Anything that can post a message to a chat channel.
///
/// Implemented by [`RpcClient`]; the webhook handler depends only on this
/// trait so it can be driven without a bot host.
#[async_trait]
pub trait ChannelMessenger: Send + Sync {
    async fn send_channel_message(&self, channel: &str, message: &str) -> Result<(), RpcError>;
}

/// Anything that can register a webhook route and serve its requests.
///
/// Implemented by [`RpcClient`]; the relay loop depends only on this trait.
#[async_trait]
pub trait WebhookRegistrar: Send + Sync {
    /// Serve requests for `route` until the stream ends or fails.
    async fn register_webhook(
        &self,
        route: &str,
        handler: &mut (dyn FnMut(HttpRequest) -> HttpResponse + Send),
    ) -> Result<(), RpcError>;
}
