// Telemetry module for structured logging, metrics, and tracing

use crate::config::LogFormat;
use anyhow::Result;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    trace::{RandomIdGenerator, Sampler, TracerProvider},
    Resource,
};
use std::net::SocketAddr;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize structured logging
///
/// Logs are written to stderr so that stdout only carries the consumer
/// output lines. `RUST_LOG` takes precedence over `log_level`.
/// When `tracing_endpoint` is set, spans are also exported over OTLP.
pub fn init_logging(
    service_name: &'static str,
    log_level: &str,
    format: LogFormat,
    tracing_endpoint: Option<&str>,
) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {}", e))?;

    let fmt_layer = match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_writer(std::io::stderr)
            .with_filter(env_filter)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(env_filter)
            .boxed(),
    };

    let registry = tracing_subscriber::registry().with(fmt_layer);

    if let Some(endpoint) = tracing_endpoint {
        let tracer = init_tracer(service_name, endpoint)?;
        let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer);
        registry
            .with(telemetry_layer)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;
    } else {
        registry
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;
    }

    tracing::info!(
        service = service_name,
        log_level = log_level,
        tracing_endpoint = tracing_endpoint,
        "Logging initialized"
    );

    Ok(())
}

/// Initialize OpenTelemetry tracer with OTLP exporter
fn init_tracer(
    service_name: &'static str,
    endpoint: &str,
) -> Result<opentelemetry_sdk::trace::Tracer> {
    use opentelemetry_sdk::runtime::Tokio;

    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint)
        .build_span_exporter()
        .map_err(|e| anyhow::anyhow!("Failed to build span exporter: {}", e))?;

    let tracer_provider = TracerProvider::builder()
        .with_batch_exporter(exporter, Tokio)
        .with_config(
            opentelemetry_sdk::trace::Config::default()
                .with_sampler(Sampler::AlwaysOn)
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(Resource::new(vec![
                    KeyValue::new("service.name", service_name),
                    KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
                ])),
        )
        .build();

    global::set_tracer_provider(tracer_provider.clone());

    Ok(tracer_provider.tracer(service_name))
}

/// Flush remaining spans on shutdown
pub fn shutdown_tracer() {
    global::shutdown_tracer_provider();
}

/// Initialize Prometheus metrics exporter
///
/// Registers:
/// - poll_cycles_total: listing calls made by the bucket poller
/// - objects_discovered_total: keys notified for the first time
/// - seen_keys: current size of the seen-set
/// - messages_received_total: messages rendered by the topic tail
/// - message_bytes_total: payload bytes received by the topic tail
pub fn init_metrics(metrics_port: u16) -> Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", metrics_port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid metrics port: {}", e))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {}", e))?;

    describe_counter!("poll_cycles_total", "Total number of bucket listings");
    describe_counter!(
        "objects_discovered_total",
        "Total number of newly observed object keys"
    );
    describe_gauge!("seen_keys", "Number of object keys observed so far");
    describe_counter!(
        "messages_received_total",
        "Total number of messages received from the topic"
    );
    describe_counter!(
        "message_bytes_total",
        "Total payload bytes received from the topic"
    );

    tracing::info!(
        metrics_port = metrics_port,
        metrics_endpoint = format!("http://0.0.0.0:{}/metrics", metrics_port),
        "Prometheus metrics exporter initialized"
    );

    Ok(())
}

/// Record one completed poll cycle
#[inline]
pub fn record_poll_cycle(bucket: &str, discovered: usize, seen: usize) {
    counter!("poll_cycles_total", "bucket" => bucket.to_string()).increment(1);
    counter!("objects_discovered_total", "bucket" => bucket.to_string())
        .increment(discovered as u64);
    gauge!("seen_keys", "bucket" => bucket.to_string()).set(seen as f64);
}

/// Record one received message
#[inline]
pub fn record_message(subject: &str, size: usize) {
    counter!("messages_received_total", "subject" => subject.to_string()).increment(1);
    counter!("message_bytes_total", "subject" => subject.to_string()).increment(size as u64);
}
