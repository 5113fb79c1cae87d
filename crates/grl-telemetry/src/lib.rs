//! Tracing setup for grl binaries.
//!
//! Installs a global subscriber with an `EnvFilter` (`RUST_LOG`), a text or
//! JSON formatter, a bridge for `log` records and, when an OTLP endpoint is
//! configured, an OpenTelemetry span exporter.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use thiserror::Error;
use tracing::subscriber::set_global_default;
use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};
use typed_builder::TypedBuilder;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to install log bridge: {0}")]
    LogBridge(String),
    #[error("failed to build otlp exporter: {0}")]
    Exporter(String),
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Output format of the console log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable, one line per event.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct TelemetrySettings {
    /// Reported as `service.name` to the OTLP collector.
    #[builder(setter(into))]
    pub service_name: String,
    #[builder(default)]
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is not set.
    #[builder(default = String::from("info"), setter(into))]
    pub default_filter: String,
    /// gRPC endpoint of an OTLP collector, e.g. `http://localhost:4317`.
    #[builder(default, setter(into))]
    pub otlp_endpoint: Option<String>,
}

/// Keeps the span exporter alive; flushes pending spans when dropped.
#[must_use = "dropping the guard shuts the span exporter down"]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(err) = provider.shutdown() {
                eprintln!("failed to shut down span exporter: {err}");
            }
        }
    }
}

/// Installs the global subscriber. Call once, early in `main`.
pub fn init(settings: &TelemetrySettings) -> Result<TelemetryGuard, TelemetryError> {
    LogTracer::init().map_err(|e| TelemetryError::LogBridge(e.to_string()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.default_filter));

    let fmt_layer = match settings.format {
        LogFormat::Text => tracing_subscriber::fmt::layer().boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
    };

    let provider = settings
        .otlp_endpoint
        .as_deref()
        .map(|endpoint| tracer_provider(&settings.service_name, endpoint))
        .transpose()?;

    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(settings.service_name.clone()))
    });

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer);
    set_global_default(subscriber)?;

    Ok(TelemetryGuard { provider })
}

fn tracer_provider(
    service_name: &str,
    endpoint: &str,
) -> Result<SdkTracerProvider, TelemetryError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    let resource = Resource::builder()
        .with_service_name(service_name.to_owned())
        .build();

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build())
}
