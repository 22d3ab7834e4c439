//! OpenTelemetry tracer provider and tracing-subscriber initialization.
//!
//! Installs a layered `tracing_subscriber` registry with a JSON stdout layer.
//! When an OTLP endpoint is configured, spans and log events are also
//! exported to the collector.

use anyhow::{Context, Result};
use opentelemetry::KeyValue;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig as _;
use opentelemetry_sdk::error::OTelSdkResult;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::{
    BatchSpanProcessor, Sampler, SdkTracerProvider, SpanData, SpanExporter,
};
use opentelemetry_sdk::Resource;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{EnvFilter, Registry};

use crate::config::ObservabilityConfig;

/// RAII guard that shuts down the `OTel` providers when dropped.
///
/// Bind the returned guard to a variable that lives until the end of `main`;
/// dropping it early flushes and stops export while the relay is still
/// running.
pub struct OtelGuard {
    inner: Option<OtelGuardInner>,
}

struct OtelGuardInner {
    tracer_provider: SdkTracerProvider,
    logger_provider: SdkLoggerProvider,
}

impl Drop for OtelGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            if let Err(e) = inner.tracer_provider.shutdown() {
                tracing::warn!(error = %e, "OTel tracer provider shutdown error");
            }
            if let Err(e) = inner.logger_provider.shutdown() {
                tracing::warn!(error = %e, "OTel logger provider shutdown error");
            }
        }
    }
}

/// Strips sensitive attributes from spans before they leave the process.
#[derive(Debug)]
struct RedactingSpanExporter<E> {
    inner: E,
}

impl<E> RedactingSpanExporter<E> {
    const fn new(inner: E) -> Self {
        Self { inner }
    }
}

impl<E> SpanExporter for RedactingSpanExporter<E>
where
    E: SpanExporter,
{
    async fn export(&self, mut batch: Vec<SpanData>) -> OTelSdkResult {
        for span in &mut batch {
            span.attributes
                .retain(|kv| !is_forbidden_attribute_key(kv.key.as_str()));

            for event in &mut span.events.events {
                event
                    .attributes
                    .retain(|kv| !is_forbidden_attribute_key(kv.key.as_str()));
            }
        }

        self.inner.export(batch).await
    }

    fn shutdown(&mut self) -> OTelSdkResult {
        self.inner.shutdown()
    }

    fn force_flush(&mut self) -> OTelSdkResult {
        self.inner.force_flush()
    }

    fn set_resource(&mut self, resource: &Resource) {
        self.inner.set_resource(resource);
    }
}

/// Attribute keys that may carry credentials or webhook content.
///
/// `path` is included because accepted webhook paths embed the secret.
fn is_forbidden_attribute_key(key: &str) -> bool {
    const FORBIDDEN_PATTERNS: [&str; 7] = [
        "token",
        "secret",
        "authorization",
        "credential",
        "password",
        "body",
        "path",
    ];

    let lowered = key.to_ascii_lowercase();
    FORBIDDEN_PATTERNS
        .iter()
        .any(|pattern| lowered.contains(pattern))
}

fn build_resource(config: &ObservabilityConfig) -> Resource {
    let deployment_env =
        std::env::var("DEPLOYMENT_ENVIRONMENT").unwrap_or_else(|_| "local".to_owned());

    Resource::builder()
        .with_service_name(config.service_name.clone())
        .with_attributes([
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            KeyValue::new("deployment.environment", deployment_env),
        ])
        .build()
}

/// Initialise logging and, if enabled, the `OTel` tracer/logger providers.
///
/// `RUST_LOG` takes precedence over `config.log_level`. The returned
/// [`OtelGuard`] must stay bound for the lifetime of the process.
pub fn init(config: &ObservabilityConfig) -> Result<OtelGuard> {
    if !config.enabled {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

        Registry::default()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .context("Failed to install tracing subscriber")?;

        return Ok(OtelGuard { inner: None });
    }

    let resource = build_resource(config);

    // ── Tracer provider ──────────────────────────────────────────────────────

    let sampler = Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(
        config.trace_sample_ratio,
    )));

    let span_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.otlp_endpoint)
        .build()
        .context("Failed to build OTLP span exporter")?;

    let batch_processor =
        BatchSpanProcessor::builder(RedactingSpanExporter::new(span_exporter)).build();

    let tracer_provider = SdkTracerProvider::builder()
        .with_resource(resource.clone())
        .with_sampler(sampler)
        .with_span_processor(batch_processor)
        .build();

    // ── Logger provider (log bridge) ─────────────────────────────────────────

    let log_exporter = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(&config.otlp_endpoint)
        .build()
        .context("Failed to build OTLP log exporter")?;

    let logger_provider = SdkLoggerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(log_exporter)
        .build();

    // ── tracing-subscriber registry ──────────────────────────────────────────

    // The exporters' own transport must not feed back into the pipeline.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},hyper=off,tonic=off,h2=off", config.log_level))
    });

    let otel_trace_layer = tracing_opentelemetry::layer().with_tracer(
        opentelemetry::trace::TracerProvider::tracer(&tracer_provider, "goplum-relay"),
    );
    let otel_log_layer = OpenTelemetryTracingBridge::new(&logger_provider);

    Registry::default()
        .with(filter)
        .with(otel_trace_layer)
        .with(otel_log_layer)
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(OtelGuard {
        inner: Some(OtelGuardInner {
            tracer_provider,
            logger_provider,
        }),
    })
}
