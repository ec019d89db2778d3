// Logging and trace export setup

use crate::core::config::{LoggingConfig, TelemetryConfig};
use anyhow::{Context, Result};
use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace::SdkTracerProvider, Resource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Keeps the span exporter alive; call [`TracingGuard::shutdown`] before exit
/// so buffered spans are flushed.
#[must_use]
pub struct TracingGuard {
    provider: Option<SdkTracerProvider>,
}

impl TracingGuard {
    pub fn shutdown(self) {
        if let Some(provider) = self.provider {
            if let Err(e) = provider.shutdown() {
                eprintln!("Failed to shut down tracer provider: {}", e);
            }
        }
    }
}

fn build_provider(config: &TelemetryConfig) -> Result<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(config.endpoint.clone())
        .build()
        .context("Failed to build OTLP span exporter")?;

    let resource = Resource::builder_empty()
        .with_attributes(vec![KeyValue::new(
            "service.name",
            config.service_name.clone(),
        )])
        .build();

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build())
}

/// Install the global subscriber.
///
/// Must run inside a tokio runtime when telemetry is enabled, since the OTLP
/// exporter opens its channel on it.
pub fn init_tracing(logging: &LoggingConfig, telemetry: &TelemetryConfig) -> Result<TracingGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let provider = if telemetry.enabled {
        global::set_text_map_propagator(TraceContextPropagator::new());
        let provider = build_provider(telemetry)?;
        global::set_tracer_provider(provider.clone());
        Some(provider)
    } else {
        None
    };

    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::OpenTelemetryLayer::new(
            provider.tracer(telemetry.service_name.clone()),
        )
    });

    let use_console = logging.console || logging.format == "console";

    if use_console {
        // Pretty console output for development/debug
        tracing_subscriber::registry()
            .with(otel_layer)
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(true)
                    .with_line_number(true)
                    .with_thread_ids(true),
            )
            .try_init()
            .context("Failed to install tracing subscriber")?;
    } else {
        tracing_subscriber::registry()
            .with(otel_layer)
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
            .context("Failed to install tracing subscriber")?;
    }

    if provider.is_some() {
        tracing::info!(
            endpoint = %telemetry.endpoint,
            service = %telemetry.service_name,
            "OpenTelemetry export enabled"
        );
    }

    Ok(TracingGuard { provider })
}
