//! Observability: structured logging with optional OpenTelemetry export.
//!
//! ```rust,no_run
//! # use goplum_relay::{config::Config, observability};
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! // In main(), before any logging:
//! let _otel_guard = observability::init(&config.observability)?;
//! // `_otel_guard` must stay alive until the end of `main`.
//! # Ok(())
//! # }
//! ```

pub mod tracing;

pub use self::tracing::{init, OtelGuard};
