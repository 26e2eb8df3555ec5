// Topic tail binary: prints a preview of every message published on a subject

use anyhow::Result;
use common::config::Settings;
use common::output::StdoutSink;
use common::queue::{NatsClient, TopicTail};
use common::telemetry;
use tokio::signal;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let settings = Settings::load()
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    settings
        .validate_tail()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    let observability = &settings.observability;
    telemetry::init_logging(
        "topic-tail",
        &observability.log_level,
        observability.log_format,
        observability.tracing_endpoint.as_deref(),
    )?;
    if let Some(port) = observability.metrics_port {
        telemetry::init_metrics(port)?;
    }

    info!(
        nats_url = %settings.nats.url,
        stream_name = %settings.nats.stream_name,
        subject = %settings.nats.subject,
        "Starting topic tail"
    );

    if settings.tail.startup_delay_seconds > 0 {
        info!(
            startup_delay_seconds = settings.tail.startup_delay_seconds,
            "Waiting before subscribing"
        );
        tokio::time::sleep(settings.tail.startup_delay()).await;
    }

    let nats_client = NatsClient::new(settings.nats.clone()).await.map_err(|e| {
        error!(error = %e, "Failed to initialize NATS client");
        anyhow::anyhow!("NATS initialization error: {}", e)
    })?;

    let messages = nats_client.messages().await.map_err(|e| {
        error!(error = %e, "Failed to subscribe");
        anyhow::anyhow!("NATS subscription error: {}", e)
    })?;

    let mut tail = TopicTail::new(settings.tail.preview_bytes);
    let mut sink = StdoutSink;

    let outcome = tokio::select! {
        result = tail.run(messages, &mut sink) => result.map(|_| ()).map_err(|e| {
            error!(error = %e, "Topic tail failed");
            anyhow::anyhow!("Topic tail error: {}", e)
        }),
        signal = signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
            }
            Ok(())
        }
    };

    telemetry::shutdown_tracer();
    outcome
}
