//! Client for the `rpc.HTTPPlugin` service.

use tonic::codegen::{http, Body, Bytes, GrpcMethod, StdError};

use crate::messages::{HttpRequest, HttpResponse};

const SERVICE: &str = "rpc.HTTPPlugin";

/// gRPC client for receiving webhook requests from the bot host.
#[derive(Debug, Clone)]
pub struct HttpPluginClient<T> {
    inner: tonic::client::Grpc<T>,
}

impl<T> HttpPluginClient<T>
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

    /// Open the bidirectional request stream.
    ///
    /// Requests for the route named in the `path` metadata arrive on the
    /// returned stream; each must be answered by one [`HttpResponse`] on the
    /// outbound stream, in order.
    pub async fn get_request(
        &mut self,
        request: impl tonic::IntoStreamingRequest<Message = HttpResponse>,
    ) -> Result<tonic::Response<tonic::codec::Streaming<HttpRequest>>, tonic::Status> {
        self.inner.ready().await.map_err(|e| {
            tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
        })?;
        let codec = tonic::codec::ProstCodec::default();
        let path = http::uri::PathAndQuery::from_static("/rpc.HTTPPlugin/GetRequest");
        let mut req = request.into_streaming_request();
        req.extensions_mut()
            .insert(GrpcMethod::new(SERVICE, "GetRequest"));
        self.inner.streaming(req, path, codec).await
    }
}
