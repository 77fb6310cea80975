//! Driven ports: interfaces the application requires from external
//! collaborators.

mod cache_port;
mod event_publisher_port;
mod user_status_port;

pub use cache_port::{CacheError, CachePort};
pub use event_publisher_port::{EventPublishError, EventPublisherPort, NoOpEventPublisher};
pub use user_status_port::{UserStatusError, UserStatusPort};
