//! Event publisher port (driven port).
//!
//! Fire-and-forget publication of portfolio-updated notifications to the
//! event stream. Publish failures never unwind a committed mutation.

use async_trait::async_trait;

use crate::domain::portfolio::PortfolioUpdatedEvent;

/// Event publishing error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EventPublishError {
    /// Connection error.
    #[error("Event publish connection error: {message}")]
    Connection {
        /// Transport-level detail.
        message: String,
    },

    /// Serialization error.
    #[error("Event serialization error: {message}")]
    Serialization {
        /// Encoding detail.
        message: String,
    },

    /// Publishing failed.
    #[error("Event publish failed: {message}")]
    PublishFailed {
        /// Broker-level detail.
        message: String,
    },
}

/// Port for publishing portfolio-updated events.
#[async_trait]
pub trait EventPublisherPort: Send + Sync {
    /// Publish one event to the portfolio-updates stream.
    ///
    /// # Errors
    ///
    /// Returns `EventPublishError` when the broker rejects the publish.
    async fn publish(&self, event: PortfolioUpdatedEvent) -> Result<(), EventPublishError>;
}

/// No-op event publisher for testing.
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisherPort for NoOpEventPublisher {
    async fn publish(&self, _event: PortfolioUpdatedEvent) -> Result<(), EventPublishError> {
        Ok(())
    }
}
