//! RPC Adapter Error Types

use std::path::PathBuf;

use tonic::metadata::errors::InvalidMetadataValue;

/// Errors raised while talking to the bot host.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("Invalid bot host address: {0}")]
    InvalidEndpoint(String),

    #[error("Unable to read CA certificate {path}: {source}")]
    CaCertificate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No certificates found in {0}")]
    NoCertificates(PathBuf),

    #[error("TLS configuration error: {0}")]
    Tls(#[from] rustls::Error),

    #[error("Invalid metadata value: {0}")]
    InvalidMetadata(#[from] InvalidMetadataValue),

    #[error("Connection to bot host failed: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("RPC call failed: {0}")]
    Status(Box<tonic::Status>),

    #[error("Bot host rejected message: {0}")]
    Rejected(String),

    #[error("Response stream closed before the request was answered")]
    ResponseStreamClosed,
}

impl From<tonic::Status> for RpcError {
    fn from(status: tonic::Status) -> Self {
        Self::Status(Box::new(status))
    }
}
