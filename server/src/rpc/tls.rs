//! TLS transport to the bot host.
//!
//! The bot host usually presents a self-signed certificate, so verification
//! is only performed when a CA bundle is configured. The channel always
//! negotiates `h2` over TLS.

use std::path::Path;
use std::sync::Arc;

use hyper_util::rt::TokioIo;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tonic::transport::{Channel, Endpoint, Uri};
use tracing::warn;

use super::RpcError;
use crate::config::RpcConfig;

/// Open a TLS-secured gRPC channel to `config.host:config.port`.
pub async fn dial(config: &RpcConfig) -> Result<Channel, RpcError> {
    let connector = TlsConnector::from(client_config(config.ca_cert.as_deref())?);
    let server_name = ServerName::try_from(config.host.clone())
        .map_err(|_| RpcError::InvalidEndpoint(config.host.clone()))?;
    let address = format!("{}:{}", config.host, config.port);

    // TLS is layered by the connector below, so the endpoint URI stays plain.
    let endpoint = Endpoint::from_shared(format!("http://{address}"))
        .map_err(|_| RpcError::InvalidEndpoint(address.clone()))?
        .connect_timeout(config.connect_timeout);

    let channel = endpoint
        .connect_with_connector(tower::service_fn(move |_: Uri| {
            let connector = connector.clone();
            let server_name = server_name.clone();
            let address = address.clone();
            async move {
                let tcp = TcpStream::connect(address).await?;
                let stream = connector.connect(server_name, tcp).await?;
                Ok::<_, std::io::Error>(TokioIo::new(stream))
            }
        }))
        .await?;

    Ok(channel)
}

/// Build the rustls client configuration.
fn client_config(ca_cert: Option<&Path>) -> Result<Arc<ClientConfig>, RpcError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let builder = ClientConfig::builder_with_provider(Arc::clone(&provider))
        .with_safe_default_protocol_versions()?;

    let mut config = match ca_cert {
        Some(path) => builder
            .with_root_certificates(load_roots(path)?)
            .with_no_client_auth(),
        None => {
            warn!("No RPC CA certificate configured, bot host certificate will not be verified");
            builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert { provider }))
                .with_no_client_auth()
        }
    };
    config.alpn_protocols = vec![b"h2".to_vec()];

    Ok(Arc::new(config))
}

/// Load every certificate from a PEM bundle.
fn load_roots(path: &Path) -> Result<RootCertStore, RpcError> {
    let ca_error = |source: std::io::Error| RpcError::CaCertificate {
        path: path.to_path_buf(),
        source,
    };

    let pem = std::fs::read(path).map_err(ca_error)?;
    let mut roots = RootCertStore::empty();
    for cert in rustls_pemfile::certs(&mut pem.as_slice()) {
        roots.add(cert.map_err(ca_error)?)?;
    }

    if roots.is_empty() {
        return Err(RpcError::NoCertificates(path.to_path_buf()));
    }
    Ok(roots)
}

/// Accepts any server certificate but still checks handshake signatures.
#[derive(Debug)]
struct AcceptAnyServerCert {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
