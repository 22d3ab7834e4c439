//! Bearer-token interceptor attached to every outgoing call.

use relay_proto::metadata;
use tonic::metadata::AsciiMetadataValue;
use tonic::service::Interceptor;
use tonic::{Request, Status};

use super::RpcError;

/// Adds `authorization: bearer <token>` to each request.
#[derive(Clone)]
pub struct BearerAuth {
    value: AsciiMetadataValue,
}

impl BearerAuth {
    pub fn new(token: &str) -> Result<Self, RpcError> {
        let mut value = metadata::bearer_value(token)?;
        value.set_sensitive(true);
        Ok(Self { value })
    }
}

impl Interceptor for BearerAuth {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        request
            .metadata_mut()
            .insert(metadata::AUTHORIZATION, self.value.clone());
        Ok(request)
    }
}
