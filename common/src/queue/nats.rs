// NATS JetStream client for the topic tail

use crate::config::NatsConfig;
use crate::errors::QueueError;
use async_nats::jetstream::{
    consumer::{pull, AckPolicy, DeliverPolicy, PullConsumer},
    stream::{Config as StreamConfig, Stream},
    Context as JetStreamContext, Message,
};
use futures::{Stream as FuturesStream, StreamExt};
use std::time::Duration;
use tracing::{info, instrument};

/// NATS JetStream client
pub struct NatsClient {
    client: async_nats::Client,
    jetstream: JetStreamContext,
    config: NatsConfig,
}

impl NatsClient {
    /// Create a new NATS client and connect to the server
    #[instrument(skip(config), fields(url = %config.url))]
    pub async fn new(config: NatsConfig) -> Result<Self, QueueError> {
        info!("Connecting to NATS server");

        let client = async_nats::connect(&config.url)
            .await
            .map_err(|e| QueueError::Connection(format!("Failed to connect to NATS: {}", e)))?;

        info!("Connected to NATS server");

        let jetstream = async_nats::jetstream::new(client.clone());

        Ok(Self {
            client,
            jetstream,
            config,
        })
    }

    /// Build the stream definition covering the configured subject
    fn stream_config(config: &NatsConfig) -> StreamConfig {
        StreamConfig {
            name: config.stream_name.clone(),
            subjects: vec![config.subject.clone()],
            max_age: Duration::from_secs(config.max_age_seconds),
            ..Default::default()
        }
    }

    /// Build the durable pull consumer definition for the tail
    fn consumer_config(config: &NatsConfig) -> pull::Config {
        let deliver_policy = if config.deliver_all {
            DeliverPolicy::All
        } else {
            DeliverPolicy::New
        };

        pull::Config {
            durable_name: Some(config.consumer_name.clone()),
            filter_subject: config.subject.clone(),
            ack_policy: AckPolicy::Explicit,
            deliver_policy,
            ..Default::default()
        }
    }

    /// Create the stream if the producer has not done so yet
    #[instrument(skip(self), fields(stream_name = %self.config.stream_name))]
    pub async fn ensure_stream(&self) -> Result<Stream, QueueError> {
        let stream = self
            .jetstream
            .get_or_create_stream(Self::stream_config(&self.config))
            .await
            .map_err(|e| QueueError::StreamCreation(format!("Failed to create stream: {}", e)))?;

        info!(subject = %self.config.subject, "Stream ready");
        Ok(stream)
    }

    /// Create or reuse the durable consumer for the tail
    #[instrument(skip(self), fields(consumer_name = %self.config.consumer_name))]
    pub async fn tail_consumer(&self) -> Result<PullConsumer, QueueError> {
        let stream = self.ensure_stream().await?;

        let consumer = stream
            .get_or_create_consumer(
                &self.config.consumer_name,
                Self::consumer_config(&self.config),
            )
            .await
            .map_err(|e| {
                QueueError::ConsumerCreation(format!("Failed to create consumer: {}", e))
            })?;

        info!(deliver_all = self.config.deliver_all, "Consumer ready");
        Ok(consumer)
    }

    /// Unbounded stream of messages on the configured subject
    pub async fn messages(
        &self,
    ) -> Result<impl FuturesStream<Item = Result<Message, QueueError>>, QueueError> {
        let consumer = self.tail_consumer().await?;

        let messages = consumer.messages().await.map_err(|e| {
            QueueError::ReceiveFailed(format!("Failed to create message stream: {}", e))
        })?;

        Ok(messages.map(|result| result.map_err(|e| QueueError::ReceiveFailed(e.to_string()))))
    }

    pub fn client(&self) -> &async_nats::Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    #[test]
    fn test_stream_config_covers_subject() {
        let config = Settings::default().nats;
        let stream = NatsClient::stream_config(&config);
        assert_eq!(stream.name, "LANDING");
        assert_eq!(stream.subjects, vec!["landing.>".to_string()]);
        assert_eq!(stream.max_age, Duration::from_secs(86400));
    }

    #[test]
    fn test_consumer_config_only_new_messages_by_default() {
        let config = Settings::default().nats;
        let consumer = NatsClient::consumer_config(&config);
        assert_eq!(consumer.durable_name.as_deref(), Some("topic-tail"));
        assert_eq!(consumer.filter_subject, "landing.>");
        assert!(matches!(consumer.deliver_policy, DeliverPolicy::New));
    }

    #[test]
    fn test_consumer_config_replays_when_requested() {
        let mut config = Settings::default().nats;
        config.deliver_all = true;
        let consumer = NatsClient::consumer_config(&config);
        assert!(matches!(consumer.deliver_policy, DeliverPolicy::All));
    }
}
