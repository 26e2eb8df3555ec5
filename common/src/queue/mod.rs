// Queue module for NATS JetStream integration

pub mod nats;
pub mod tail;

pub use nats::NatsClient;
pub use tail::{Delivery, TopicTail};
