//! Logging event publisher.
//!
//! Development stand-in for the message-broker adapter: records each
//! portfolio-updated event to the log instead of a stream.

use async_trait::async_trait;

use crate::application::ports::{EventPublishError, EventPublisherPort};
use crate::domain::portfolio::PortfolioUpdatedEvent;

/// Publishes portfolio-updated events to the log.
#[derive(Debug, Clone)]
pub struct LoggingEventPublisher {
    topic: String,
}

impl LoggingEventPublisher {
    /// Create a publisher for the named topic.
    #[must_use]
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
        }
    }
}

#[async_trait]
impl EventPublisherPort for LoggingEventPublisher {
    async fn publish(&self, event: PortfolioUpdatedEvent) -> Result<(), EventPublishError> {
        let payload =
            serde_json::to_string(&event).map_err(|e| EventPublishError::Serialization {
                message: e.to_string(),
            })?;

        tracing::info!(
            topic = %self.topic,
            portfolio_id = %event.portfolio_id,
            action = %event.action_type,
            payload = %payload,
            "Publishing portfolio update event"
        );
        Ok(())
    }
}
