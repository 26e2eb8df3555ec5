// Pass-through consumer printing a preview of every received message

use crate::errors::QueueError;
use crate::output::{preview, LineSink};
use crate::telemetry;
use async_nats::jetstream::Message;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use tracing::{debug, info, warn};

/// One message received from the bus
#[async_trait]
pub trait Delivery: Send + Sync {
    fn subject(&self) -> &str;

    fn payload(&self) -> &[u8];

    /// Tell the bus the message was handled
    async fn ack(&self) -> Result<(), QueueError>;
}

#[async_trait]
impl Delivery for Message {
    fn subject(&self) -> &str {
        self.subject.as_str()
    }

    fn payload(&self) -> &[u8] {
        &self.payload
    }

    async fn ack(&self) -> Result<(), QueueError> {
        Message::ack(self)
            .await
            .map_err(|e| QueueError::AckFailed(format!("Failed to acknowledge message: {}", e)))
    }
}

/// Renders each delivery, one at a time, in arrival order
#[derive(Debug)]
pub struct TopicTail {
    preview_bytes: usize,
    received: u64,
}

impl TopicTail {
    pub fn new(preview_bytes: usize) -> Self {
        Self {
            preview_bytes,
            received: 0,
        }
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn render(&self, payload: &[u8]) -> String {
        format!(
            "Consumer received message: {}",
            preview(payload, self.preview_bytes)
        )
    }

    /// Render one delivery to the sink, then acknowledge it
    pub async fn handle<D, S>(&mut self, delivery: &D, sink: &mut S) -> Result<(), QueueError>
    where
        D: Delivery,
        S: LineSink,
    {
        let payload = delivery.payload();
        debug!(subject = %delivery.subject(), size = payload.len(), "Message received");

        sink.write_line(&self.render(payload))?;
        delivery.ack().await?;

        self.received += 1;
        telemetry::record_message(delivery.subject(), payload.len());
        Ok(())
    }

    /// Consume until the sequence ends or yields an error
    pub async fn run<M, D, S>(&mut self, messages: M, sink: &mut S) -> Result<u64, QueueError>
    where
        M: Stream<Item = Result<D, QueueError>>,
        D: Delivery,
        S: LineSink,
    {
        info!(preview_bytes = self.preview_bytes, "Waiting for messages");

        futures::pin_mut!(messages);
        while let Some(delivery) = messages.next().await {
            self.handle(&delivery?, sink).await?;
        }

        warn!(received = self.received, "Message stream ended");
        Ok(self.received)
    }
}
