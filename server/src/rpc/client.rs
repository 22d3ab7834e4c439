//! gRPC client for the IRC bot host.

use relay_proto::{
    metadata, ChannelMessage, Empty, HttpPluginClient, HttpRequest, HttpResponse, IrcPluginClient,
};
use secrecy::ExposeSecret;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::service::interceptor::InterceptedService;
use tonic::transport::Channel;
use tonic::Request;
use tracing::{debug, info};

use super::auth::BearerAuth;
use super::{serve_requests, tls, ChannelMessenger, RpcError, WebhookRegistrar};
use crate::config::RpcConfig;

/// Responses waiting to be written back to the bot host.
const RESPONSE_BUFFER: usize = 16;

type AuthChannel = InterceptedService<Channel, BearerAuth>;

/// Authenticated client for both bot host services.
///
/// Cloning is cheap and clones share one underlying connection, so a single
/// client can serve the request stream and any number of concurrent sends.
#[derive(Clone)]
pub struct RpcClient {
    irc: IrcPluginClient<AuthChannel>,
    http: HttpPluginClient<AuthChannel>,
}

impl RpcClient {
    /// Connect to the bot host and verify the token with a ping.
    #[tracing::instrument(skip(config), fields(host = %config.host, port = config.port))]
    pub async fn connect(config: &RpcConfig) -> Result<Self, RpcError> {
        let channel = tls::dial(config).await?;
        let auth = BearerAuth::new(config.token.expose_secret())?;

        let client = Self {
            irc: IrcPluginClient::new(InterceptedService::new(channel.clone(), auth.clone())),
            http: HttpPluginClient::new(InterceptedService::new(channel, auth)),
        };
        client.ping().await?;

        info!("Connected to bot host");
        Ok(client)
    }

    pub async fn ping(&self) -> Result<(), RpcError> {
        self.irc.clone().ping(Empty {}).await?;
        Ok(())
    }

    /// Post `message` to `channel`.
    pub async fn send_channel_message(
        &self,
        channel: &str,
        message: &str,
    ) -> Result<(), RpcError> {
        let reply = self
            .irc
            .clone()
            .send_channel_message(ChannelMessage::new(channel, message))
            .await?
            .into_inner();

        if reply.message.is_empty() {
            Ok(())
        } else {
            Err(RpcError::Rejected(reply.message))
        }
    }

    /// Serve webhook requests for `route` until the stream ends.
    ///
    /// Each request is answered by `handler` on the same stream, in arrival
    /// order. Returns `Ok(())` when the bot host closes the stream cleanly.
    pub async fn register_webhook<F>(&self, route: &str, handler: F) -> Result<(), RpcError>
    where
        F: FnMut(HttpRequest) -> HttpResponse,
    {
        let (tx, rx) = mpsc::channel::<HttpResponse>(RESPONSE_BUFFER);
        let mut request = Request::new(ReceiverStream::new(rx));
        metadata::insert_path(request.metadata_mut(), route)?;

        let inbound = self.http.clone().get_request(request).await?.into_inner();
        info!(route, "Registered webhook route");

        let result = serve_requests(inbound, tx, handler).await;
        debug!(route, ok = result.is_ok(), "Webhook registration ended");
        result
    }
}

#[async_trait::async_trait]
impl ChannelMessenger for RpcClient {
    async fn send_channel_message(&self, channel: &str, message: &str) -> Result<(), RpcError> {
        Self::send_channel_message(self, channel, message).await
    }
}

#[async_trait::async_trait]
impl WebhookRegistrar for RpcClient {
    async fn register_webhook(
        &self,
        route: &str,
        handler: &mut (dyn FnMut(HttpRequest) -> HttpResponse + Send),
    ) -> Result<(), RpcError> {
        Self::register_webhook(self, route, handler).await
    }
}
