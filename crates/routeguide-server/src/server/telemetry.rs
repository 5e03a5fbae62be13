//! # Logging and Telemetry
//!
//! Console logging through `tracing-subscriber` is always on. OpenTelemetry
//! export is opt-in through cargo features.
//!
//! ## Feature matrix
//!
//! - `otel-trace`: exports spans through `tracing-opentelemetry`.
//! - `otel-metrics`: records the counters and histograms below.
//! - `stdout`: prints exported spans/metrics with `opentelemetry-stdout`.
//! - `otlp`: ships spans/metrics to an OTLP collector over gRPC
//!   (`--otlp-endpoint` / `OTEL_EXPORTER_OTLP_ENDPOINT`).
//!
//! Exporters require at least one of `otel-trace` or `otel-metrics`.
//!
//! ## Console output
//!
//! Filtering comes from `RUST_LOG` (default `info`). The format is either
//! `pretty` or `json` (see [`LogFormat`]). Events outside a span are only
//! printed, never exported.
//!
//! ## Metrics
//!
//! | name | kind | attributes |
//! |---|---|---|
//! | `requests` | counter | `rpc.method` |
//! | `errors` | counter | `rpc.method` |
//! | `streams_inflight` | up/down counter | |
//! | `stream_duration` | histogram (ms) | `rpc.method` |
//! | `features_streamed` | counter | |
//! | `route_points` | counter | |
//! | `notes_relayed` | counter | |
//!
//! The recording functions compile to no-ops without `otel-metrics`.
//!
//! ```bash
//! cargo run --features otel-trace,otel-metrics,stdout
//! cargo run --features otel-trace,otlp -- --otlp-endpoint http://localhost:4317
//! ```

#[cfg(all(
    feature = "otlp",
    not(any(feature = "otel-trace", feature = "otel-metrics"))
))]
compile_error!(
    "The 'otlp' feature requires at least one of 'otel-trace' or 'otel-metrics' to be enabled."
);

#[cfg(all(
    feature = "stdout",
    not(any(feature = "otel-trace", feature = "otel-metrics"))
))]
compile_error!(
    "The 'stdout' feature requires at least one of 'otel-trace' or 'otel-metrics' to be enabled."
);

use crate::server::config::{LogFormat, ServerConfig};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(all(feature = "otlp", any(feature = "otel-metrics", feature = "otel-trace")))]
use opentelemetry_otlp::{Protocol, WithExportConfig};

#[cfg(feature = "otel-metrics")]
use opentelemetry::metrics::{Counter, Histogram, Meter, UpDownCounter};
#[cfg(feature = "otel-metrics")]
use opentelemetry_sdk::metrics as sdkmetrics;
#[cfg(feature = "otel-metrics")]
use std::sync::OnceLock;

#[cfg(any(feature = "otel-metrics", feature = "otel-trace"))]
use opentelemetry::{InstrumentationScope, KeyValue};
#[cfg(any(feature = "otel-metrics", feature = "otel-trace"))]
use opentelemetry_sdk::Resource;
#[cfg(any(feature = "otel-metrics", feature = "otel-trace"))]
use opentelemetry_semantic_conventions as semvcns;

#[cfg(feature = "otel-trace")]
use opentelemetry::trace::TracerProvider;
#[cfg(feature = "otel-trace")]
use opentelemetry_sdk::propagation::TraceContextPropagator;
#[cfg(feature = "otel-trace")]
use opentelemetry_sdk::trace as sdktrace;

pub const GET_FEATURE: &str = "GetFeature";
pub const LIST_FEATURES: &str = "ListFeatures";
pub const RECORD_ROUTE: &str = "RecordRoute";
pub const ROUTE_CHAT: &str = "RouteChat";

/// Exporter handles that must be flushed on shutdown.
pub struct TelemetryProviders {
    #[cfg(feature = "otel-trace")]
    pub tracer_provider: sdktrace::SdkTracerProvider,
    #[cfg(feature = "otel-metrics")]
    pub meter_provider: sdkmetrics::SdkMeterProvider,
}

impl TelemetryProviders {
    /// Flushes and shuts down every provider. Failures are reported on
    /// stderr since the subscriber may already be unusable.
    pub fn shutdown(self) {
        #[cfg(feature = "otel-trace")]
        {
            if let Err(err) = self.tracer_provider.force_flush() {
                eprintln!("Error flushing traces: {:#?}", err);
            }
            if let Err(err) = self.tracer_provider.shutdown() {
                eprintln!("Error shutting down tracer: {:#?}", err);
            }
        }

        #[cfg(feature = "otel-metrics")]
        {
            if let Err(err) = self.meter_provider.force_flush() {
                eprintln!("Error flushing metrics: {:#?}", err);
            }
            if let Err(err) = self.meter_provider.shutdown() {
                eprintln!("Error shutting down meter: {:#?}", err);
            }
        }
    }
}

/// Installs the global subscriber and, when enabled, the OpenTelemetry
/// providers.
///
/// # Errors
///
/// Fails if an exporter cannot be built (e.g. `otlp` without an endpoint).
pub fn init_telemetry(config: &ServerConfig) -> anyhow::Result<TelemetryProviders> {
    #[cfg(feature = "otel-trace")]
    opentelemetry::global::set_text_map_propagator(TraceContextPropagator::new());

    #[cfg(feature = "otel-trace")]
    let tracer_provider = init_tracer(config)?;

    #[cfg(feature = "otel-metrics")]
    let meter_provider = init_metrics(config)?;

    #[cfg(any(feature = "otel-metrics", feature = "otel-trace"))]
    let scope = InstrumentationScope::builder("routeguide")
        .with_version(env!("CARGO_PKG_VERSION"))
        .with_schema_url(semvcns::SCHEMA_URL)
        .build();

    let (pretty, json) = match config.log_format {
        LogFormat::Pretty => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_target(false)
                    .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                    .with_file(true)
                    .pretty(),
            ),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .with_thread_ids(true)
                    .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc_3339())
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            ),
        ),
    };

    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(pretty)
        .with(json);

    #[cfg(feature = "otel-trace")]
    let registry = {
        opentelemetry::global::set_tracer_provider(tracer_provider.clone());
        registry.with(
            tracing_opentelemetry::layer()
                .with_tracer(tracer_provider.tracer_with_scope(scope.clone()))
                .with_error_records_to_exceptions(true),
        )
    };

    #[cfg(feature = "otel-metrics")]
    let registry = {
        opentelemetry::global::set_meter_provider(meter_provider.clone());
        let meter = opentelemetry::global::meter_with_scope(scope);
        init_metric_handles(meter);

        registry.with(tracing_opentelemetry::MetricsLayer::new(
            meter_provider.clone(),
        ))
    };

    registry.init();

    Ok(TelemetryProviders {
        #[cfg(feature = "otel-trace")]
        tracer_provider,
        #[cfg(feature = "otel-metrics")]
        meter_provider,
    })
}

#[cfg(all(feature = "otlp", any(feature = "otel-metrics", feature = "otel-trace")))]
fn otlp_endpoint(config: &ServerConfig) -> anyhow::Result<String> {
    config.otlp_endpoint.clone().ok_or_else(|| {
        anyhow::anyhow!("the `otlp` feature requires --otlp-endpoint / OTEL_EXPORTER_OTLP_ENDPOINT")
    })
}

#[cfg(any(feature = "otel-metrics", feature = "otel-trace"))]
fn resource() -> Resource {
    Resource::builder()
        .with_service_name("routeguide")
        .with_schema_url(
            [KeyValue::new(
                semvcns::resource::SERVICE_VERSION,
                env!("CARGO_PKG_VERSION"),
            )],
            semvcns::SCHEMA_URL,
        )
        .build()
}

#[cfg(feature = "otel-metrics")]
fn init_metrics(_config: &ServerConfig) -> anyhow::Result<sdkmetrics::SdkMeterProvider> {
    let builder = sdkmetrics::SdkMeterProvider::builder().with_resource(resource());

    #[cfg(feature = "stdout")]
    let builder = {
        let reader =
            sdkmetrics::PeriodicReader::builder(opentelemetry_stdout::MetricExporter::default())
                .with_interval(std::time::Duration::from_secs(5))
                .build();
        builder.with_reader(reader)
    };

    #[cfg(feature = "otlp")]
    let builder = {
        use anyhow::Context;

        let exporter = opentelemetry_otlp::MetricExporter::builder()
            .with_tonic()
            .with_endpoint(otlp_endpoint(_config)?)
            .with_protocol(Protocol::Grpc)
            .with_timeout(std::time::Duration::from_secs(10))
            .build()
            .context("failed to build metrics exporter")?;
        builder.with_periodic_exporter(exporter)
    };

    Ok(builder.build())
}

#[cfg(feature = "otel-trace")]
fn init_tracer(_config: &ServerConfig) -> anyhow::Result<sdktrace::SdkTracerProvider> {
    let builder = sdktrace::SdkTracerProvider::builder().with_resource(resource());

    #[cfg(feature = "stdout")]
    let builder = builder.with_span_processor(batch_processor(
        opentelemetry_stdout::SpanExporter::default(),
    ));

    #[cfg(feature = "otlp")]
    let builder = {
        use anyhow::Context;

        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(otlp_endpoint(_config)?)
            .with_protocol(Protocol::Grpc)
            .with_timeout(std::time::Duration::from_secs(10))
            .build()
            .context("failed to build tracer exporter")?;
        builder.with_span_processor(batch_processor(exporter))
    };

    Ok(builder.build())
}

#[cfg(all(feature = "otel-trace", any(feature = "stdout", feature = "otlp")))]
fn batch_processor<E>(exporter: E) -> sdktrace::BatchSpanProcessor
where
    E: sdktrace::SpanExporter + Send + 'static,
{
    sdktrace::BatchSpanProcessor::builder(exporter)
        .with_batch_config(
            sdktrace::BatchConfigBuilder::default()
                .with_scheduled_delay(std::time::Duration::from_secs(5))
                .with_max_queue_size(2048)
                .build(),
        )
        .build()
}

#[cfg(feature = "otel-metrics")]
static REQUESTS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "otel-metrics")]
static STREAMS_INFLIGHT: OnceLock<UpDownCounter<i64>> = OnceLock::new();
#[cfg(feature = "otel-metrics")]
static STREAM_ERRORS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "otel-metrics")]
static STREAM_DURATION_MS: OnceLock<Histogram<f64>> = OnceLock::new();
#[cfg(feature = "otel-metrics")]
static FEATURES_STREAMED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "otel-metrics")]
static ROUTE_POINTS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "otel-metrics")]
static NOTES_RELAYED: OnceLock<Counter<u64>> = OnceLock::new();

#[cfg(feature = "otel-metrics")]
fn init_metric_handles(meter: Meter) {
    let _ = REQUESTS.set(
        meter
            .u64_counter("requests")
            .with_description("Total gRPC calls by method")
            .build(),
    );
    let _ = STREAMS_INFLIGHT.set(
        meter
            .i64_up_down_counter("streams_inflight")
            .with_description("Concurrent streaming calls")
            .build(),
    );
    let _ = STREAM_ERRORS.set(
        meter
            .u64_counter("errors")
            .with_description("Calls that ended in an error or were cancelled")
            .build(),
    );
    let _ = STREAM_DURATION_MS.set(
        meter
            .f64_histogram("stream_duration")
            .with_unit("ms")
            .with_description("End-to-end streaming call duration")
            .build(),
    );
    let _ = FEATURES_STREAMED.set(
        meter
            .u64_counter("features_streamed")
            .with_description("Features sent by ListFeatures")
            .build(),
    );
    let _ = ROUTE_POINTS.set(
        meter
            .u64_counter("route_points")
            .with_description("Points received by RecordRoute")
            .build(),
    );
    let _ = NOTES_RELAYED.set(
        meter
            .u64_counter("notes_relayed")
            .with_description("Notes sent back by RouteChat")
            .build(),
    );
}

#[cfg(feature = "otel-metrics")]
fn method_attr(method: &'static str) -> [KeyValue; 1] {
    [KeyValue::new("rpc.method", method)]
}

#[cfg(feature = "otel-metrics")]
pub fn increment_requests(method: &'static str) {
    if let Some(counter) = REQUESTS.get() {
        counter.add(1, &method_attr(method));
    }
}

#[cfg(not(feature = "otel-metrics"))]
pub fn increment_requests(_method: &'static str) {}

#[cfg(feature = "otel-metrics")]
pub fn increment_stream_errors(method: &'static str) {
    if let Some(counter) = STREAM_ERRORS.get() {
        counter.add(1, &method_attr(method));
    }
}

#[cfg(not(feature = "otel-metrics"))]
pub fn increment_stream_errors(_method: &'static str) {}

#[cfg(feature = "otel-metrics")]
pub fn record_stream_duration(method: &'static str, duration_ms: f64) {
    if let Some(histogram) = STREAM_DURATION_MS.get() {
        histogram.record(duration_ms, &method_attr(method));
    }
}

#[cfg(not(feature = "otel-metrics"))]
pub fn record_stream_duration(_method: &'static str, _duration_ms: f64) {}

#[cfg(feature = "otel-metrics")]
pub fn increment_streams_inflight() {
    if let Some(counter) = STREAMS_INFLIGHT.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "otel-metrics"))]
pub fn increment_streams_inflight() {}

#[cfg(feature = "otel-metrics")]
pub fn decrement_streams_inflight() {
    if let Some(counter) = STREAMS_INFLIGHT.get() {
        counter.add(-1, &[]);
    }
}

#[cfg(not(feature = "otel-metrics"))]
pub fn decrement_streams_inflight() {}

#[cfg(feature = "otel-metrics")]
pub fn increment_features_streamed(count: u64) {
    if let Some(counter) = FEATURES_STREAMED.get() {
        counter.add(count, &[]);
    }
}

#[cfg(not(feature = "otel-metrics"))]
pub fn increment_features_streamed(_count: u64) {}

#[cfg(feature = "otel-metrics")]
pub fn increment_route_points(count: u64) {
    if let Some(counter) = ROUTE_POINTS.get() {
        counter.add(count, &[]);
    }
}

#[cfg(not(feature = "otel-metrics"))]
pub fn increment_route_points(_count: u64) {}

#[cfg(feature = "otel-metrics")]
pub fn increment_notes_relayed(count: u64) {
    if let Some(counter) = NOTES_RELAYED.get() {
        counter.add(count, &[]);
    }
}

#[cfg(not(feature = "otel-metrics"))]
pub fn increment_notes_relayed(_count: u64) {}
