// ABOUTME: Contract log subscription capability.
// ABOUTME: Delivers decoded logs in batches, as the transport receives them.

use super::ChainError;
use super::shared_types::{DecodedLog, LogFilter};
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// A stream of log batches. Batches may repeat entries or arrive out of order.
pub type LogBatchStream = Pin<Box<dyn Stream<Item = Vec<DecodedLog>> + Send>>;

/// Log subscription operations.
#[async_trait]
pub trait LogSubscriber: Send + Sync {
    /// Subscribe to an event on a contract. Dropping the stream unsubscribes.
    async fn subscribe_logs(&self, filter: &LogFilter) -> Result<LogBatchStream, ChainError>;
}
