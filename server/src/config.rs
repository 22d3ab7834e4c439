//! Relay Configuration
//!
//! Loads configuration from command-line flags, each of which falls back to an
//! environment variable. `main` reads a `.env` file before parsing.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use secrecy::{ExposeSecret, Secret};

use crate::webhooks::ROUTE_NAME;

/// Timeout for establishing the connection to the bot host.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Command-line arguments.
#[derive(Parser)]
#[command(
    name = "goplum-relay",
    version,
    about = "Relays Goplum monitoring webhooks into an IRC channel"
)]
pub struct Args {
    /// gRPC server to connect to
    #[arg(long, env = "RPC_HOST", default_value = "localhost")]
    pub rpc_host: String,

    /// gRPC server port
    #[arg(long, env = "RPC_PORT", default_value_t = 8001)]
    pub rpc_port: u16,

    /// gRPC authentication token
    #[arg(long, env = "RPC_TOKEN", hide_env_values = true)]
    pub rpc_token: String,

    /// PEM file with the CA that signed the bot host's certificate.
    /// Without it the server certificate is not verified.
    #[arg(long, env = "RPC_CA_CERT")]
    pub rpc_ca_cert: Option<PathBuf>,

    /// How many times to re-register after the request stream fails
    #[arg(long, env = "RPC_RECONNECT_ATTEMPTS", default_value_t = 0)]
    pub rpc_reconnect_attempts: u32,

    /// Channel to send messages to
    #[arg(long, env = "CHANNEL")]
    pub channel: String,

    /// Secret for masking the webhook URL
    #[arg(long, env = "SECRET", hide_env_values = true)]
    pub secret: String,

    /// Show debugging info
    #[arg(long, env = "DEBUG", default_value_t = false)]
    pub debug: bool,

    /// OTLP collector endpoint; enables span and log export
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Fraction of traces to sample when exporting
    #[arg(long, env = "OTEL_TRACE_SAMPLE_RATIO", default_value_t = 1.0)]
    pub trace_sample_ratio: f64,
}

/// Connection settings for the bot host.
#[derive(Clone)]
pub struct RpcConfig {
    pub host: String,
    pub port: u16,
    pub token: Secret<String>,
    pub ca_cert: Option<PathBuf>,
    pub reconnect_attempts: u32,
    pub connect_timeout: Duration,
}

impl fmt::Debug for RpcConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("token", &"[REDACTED]")
            .field("ca_cert", &self.ca_cert)
            .field("reconnect_attempts", &self.reconnect_attempts)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Which requests to accept and where to relay them.
#[derive(Clone)]
pub struct WebhookConfig {
    pub route: String,
    pub channel: String,
    pub secret: Secret<String>,
}

impl WebhookConfig {
    /// The only request path that is accepted: `/<route>/<secret>`.
    pub fn expected_path(&self) -> String {
        format!("/{}/{}", self.route, self.secret.expose_secret())
    }
}

impl fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("route", &self.route)
            .field("channel", &self.channel)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Logging and OpenTelemetry export settings.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Export spans and logs over OTLP
    pub enabled: bool,
    pub otlp_endpoint: String,
    pub service_name: String,
    pub trace_sample_ratio: f64,
    /// Default filter directive when `RUST_LOG` is unset
    pub log_level: String,
}

/// Complete relay configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub rpc: RpcConfig,
    pub webhook: WebhookConfig,
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Parse flags and environment variables.
    pub fn load() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Validate parsed arguments and split them into per-component settings.
    pub fn from_args(args: Args) -> Result<Self> {
        if args.rpc_token.trim().is_empty() {
            bail!("RPC_TOKEN must not be empty");
        }
        if args.channel.trim().is_empty() {
            bail!("CHANNEL must not be empty");
        }
        if args.secret.trim().is_empty() {
            bail!("SECRET must not be empty");
        }
        if args.secret.contains('/') {
            bail!("SECRET must not contain '/'");
        }
        if !(0.0..=1.0).contains(&args.trace_sample_ratio) {
            bail!("OTEL_TRACE_SAMPLE_RATIO must be between 0.0 and 1.0");
        }

        let log_level = if args.debug {
            "goplum_relay=debug,relay_proto=debug,info"
        } else {
            "goplum_relay=info,warn"
        };

        Ok(Self {
            rpc: RpcConfig {
                host: args.rpc_host,
                port: args.rpc_port,
                token: Secret::new(args.rpc_token),
                ca_cert: args.rpc_ca_cert,
                reconnect_attempts: args.rpc_reconnect_attempts,
                connect_timeout: CONNECT_TIMEOUT,
            },
            webhook: WebhookConfig {
                route: ROUTE_NAME.into(),
                channel: args.channel,
                secret: Secret::new(args.secret),
            },
            observability: ObservabilityConfig {
                enabled: args.otlp_endpoint.is_some(),
                otlp_endpoint: args.otlp_endpoint.unwrap_or_default(),
                service_name: "goplum-relay".into(),
                trace_sample_ratio: args.trace_sample_ratio,
                log_level: log_level.into(),
            },
        })
    }

    /// Create a default configuration for testing.
    ///
    /// Points at a bot host on `localhost:8001` that is never dialled by
    /// the in-process tests.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            rpc: RpcConfig {
                host: "localhost".into(),
                port: 8001,
                token: Secret::new("test-token".into()),
                ca_cert: None,
                reconnect_attempts: 0,
                connect_timeout: CONNECT_TIMEOUT,
            },
            webhook: WebhookConfig {
                route: ROUTE_NAME.into(),
                channel: "#monitoring".into(),
                secret: Secret::new("s3cr3t".into()),
            },
            observability: ObservabilityConfig {
                enabled: false,
                otlp_endpoint: String::new(),
                service_name: "goplum-relay".into(),
                trace_sample_ratio: 1.0,
                log_level: "goplum_relay=debug".into(),
            },
        }
    }
}
