//! Request metadata understood by the bot host.
//!
//! Every call carries `authorization: <scheme> <token>`. The `GetRequest`
//! stream also carries `path: <route>` to select which webhook prefix the
//! plugin serves.

use tonic::metadata::errors::InvalidMetadataValue;
use tonic::metadata::{AsciiMetadataValue, MetadataMap};

/// Metadata key holding the credential.
pub const AUTHORIZATION: &str = "authorization";

/// Metadata key holding the webhook route name.
pub const PATH: &str = "path";

/// Auth scheme expected by the bot host.
pub const BEARER: &str = "bearer";

/// Build the `authorization` value for a bearer token.
pub fn bearer_value(token: &str) -> Result<AsciiMetadataValue, InvalidMetadataValue> {
    format!("{BEARER} {token}").parse()
}

/// Attach the route name to an outgoing request's metadata.
pub fn insert_path(metadata: &mut MetadataMap, route: &str) -> Result<(), InvalidMetadataValue> {
    metadata.insert(PATH, route.parse()?);
    Ok(())
}
