//! Logging and OpenTelemetry setup.
//!
//! Always installs a `tracing-subscriber` fmt layer filtered by `RUST_LOG`
//! (falling back to the configured level). When an OTLP endpoint is given,
//! traces, metrics and logs are exported there as well.

pub mod metrics;
pub mod migration;

use crate::error::{Error, Result};
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;

/// Configuration for telemetry initialization.
pub struct TelemetryConfig {
    /// Optional OTLP endpoint (e.g. "http://localhost:4317").
    pub endpoint: Option<String>,
    /// The service name reported in telemetry signals.
    pub service_name: String,
    /// Filter directive used when `RUST_LOG` is unset.
    pub default_level: String,
}

/// Guard that flushes and shuts down OTel providers on drop.
///
/// Hold it for the lifetime of the process.
#[derive(Default)]
pub struct TelemetryGuard {
    providers: Option<OtlpProviders>,
}

struct OtlpProviders {
    tracer: SdkTracerProvider,
    meter: SdkMeterProvider,
    logger: SdkLoggerProvider,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(p) = self.providers.take() {
            let _ = p.logger.shutdown();
            let _ = p.meter.shutdown();
            let _ = p.tracer.shutdown();
        }
    }
}

impl OtlpProviders {
    fn build(endpoint: &str, service_name: String) -> Result<Self> {
        use opentelemetry_otlp::WithExportConfig as _;

        let resource = opentelemetry_sdk::Resource::builder()
            .with_service_name(service_name)
            .build();

        let spans = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint)
            .build()
            .map_err(|e| exporter_error("span", e))?;
        let tracer = SdkTracerProvider::builder()
            .with_batch_exporter(spans)
            .with_resource(resource.clone())
            .build();

        let metrics = opentelemetry_otlp::MetricExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint)
            .build()
            .map_err(|e| exporter_error("metric", e))?;
        let meter = SdkMeterProvider::builder()
            .with_periodic_exporter(metrics)
            .with_resource(resource.clone())
            .build();
        opentelemetry::global::set_meter_provider(meter.clone());

        let logs = opentelemetry_otlp::LogExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint)
            .build()
            .map_err(|e| exporter_error("log", e))?;
        let logger = SdkLoggerProvider::builder()
            .with_batch_exporter(logs)
            .with_resource(resource)
            .build();

        Ok(Self {
            tracer,
            meter,
            logger,
        })
    }
}

fn exporter_error(signal: &str, e: impl std::fmt::Display) -> Error {
    Error::Other(format!("failed to create OTLP {signal} exporter: {e}"))
}

/// Initialize logging, plus OTLP export when an endpoint is configured.
///
/// # Errors
///
/// Returns an error if an OTLP exporter fails to build or a global
/// subscriber was already installed.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard> {
    use opentelemetry::trace::TracerProvider as _;
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(endpoint) = config.endpoint else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| Error::Other(format!("failed to init tracing subscriber: {e}")))?;
        return Ok(TelemetryGuard::default());
    };

    let providers = OtlpProviders::build(&endpoint, config.service_name)?;
    let trace_layer =
        tracing_opentelemetry::layer().with_tracer(providers.tracer.tracer("resubscribe"));
    let log_layer =
        opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge::new(&providers.logger);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .with(trace_layer)
        .with(log_layer)
        .try_init()
        .map_err(|e| Error::Other(format!("failed to init tracing subscriber: {e}")))?;

    Ok(TelemetryGuard {
        providers: Some(providers),
    })
}
