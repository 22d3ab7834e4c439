//! Client for the `rpc.IRCPlugin` service.

use tonic::codegen::{http, Body, Bytes, GrpcMethod, StdError};

use crate::messages::{ChannelMessage, Empty, Error};

const SERVICE: &str = "rpc.IRCPlugin";

/// gRPC client for sending messages through the bot host.
#[derive(Debug, Clone)]
pub struct IrcPluginClient<T> {
    inner: tonic::client::Grpc<T>,
}

impl<T> IrcPluginClient<T>
where
    T: tonic::client::GrpcService<tonic::body::BoxBody>,
    T::Error: Into<StdError>,
    T::ResponseBody: Body<Data = Bytes> + Send + 'static,
    <T::ResponseBody as Body>::Error: Into<StdError> + Send,
{
    pub fn new(inner: T) -> Self {
        Self {
            inner: tonic::client::Grpc::new(inner),
        }
    }

    /// Liveness and credential check.
    pub async fn ping(
        &mut self,
        request: impl tonic::IntoRequest<Empty>,
    ) -> Result<tonic::Response<Empty>, tonic::Status> {
        self.inner.ready().await.map_err(|e| {
            tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
        })?;
        let codec = tonic::codec::ProstCodec::default();
        let path = http::uri::PathAndQuery::from_static("/rpc.IRCPlugin/Ping");
        let mut req = request.into_request();
        req.extensions_mut()
            .insert(GrpcMethod::new(SERVICE, "Ping"));
        self.inner.unary(req, path, codec).await
    }

    /// Post a message to an IRC channel.
    pub async fn send_channel_message(
        &mut self,
        request: impl tonic::IntoRequest<ChannelMessage>,
    ) -> Result<tonic::Response<Error>, tonic::Status> {
        self.inner.ready().await.map_err(|e| {
            tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
        })?;
        let codec = tonic::codec::ProstCodec::default();
        let path = http::uri::PathAndQuery::from_static("/rpc.IRCPlugin/SendChannelMessage");
        let mut req = request.into_request();
        req.extensions_mut()
            .insert(GrpcMethod::new(SERVICE, "SendChannelMessage"));
        self.inner.unary(req, path, codec).await
    }
}
