// Bucket poller binary: prints every newly observed key under a bucket prefix

use anyhow::Result;
use common::config::Settings;
use common::output::StdoutSink;
use common::poller::ChangePoller;
use common::storage::S3Client;
use common::telemetry;
use tokio::signal;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let settings = Settings::load()
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    settings
        .validate_poller()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    let observability = &settings.observability;
    telemetry::init_logging(
        "bucket-poller",
        &observability.log_level,
        observability.log_format,
        observability.tracing_endpoint.as_deref(),
    )?;
    if let Some(port) = observability.metrics_port {
        telemetry::init_metrics(port)?;
    }

    info!(
        endpoint = %settings.storage.endpoint,
        bucket = %settings.storage.bucket,
        prefix = %settings.storage.prefix,
        poll_interval_seconds = settings.poller.poll_interval_seconds,
        "Starting bucket poller"
    );

    let client = S3Client::new(&settings.storage).map_err(|e| {
        error!(error = %e, "Failed to initialize S3 client");
        anyhow::anyhow!("S3 initialization error: {}", e)
    })?;

    if settings.poller.startup_delay_seconds > 0 {
        info!(
            startup_delay_seconds = settings.poller.startup_delay_seconds,
            "Waiting before first listing"
        );
        tokio::time::sleep(settings.poller.startup_delay()).await;
    }

    let poller = ChangePoller::new(client, settings.poller.poll_interval());
    let mut sink = StdoutSink;

    let outcome = tokio::select! {
        result = poller.run(&mut sink) => result.map_err(|e| {
            error!(error = %e, "Bucket poller failed");
            anyhow::anyhow!("Bucket poller error: {}", e)
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
