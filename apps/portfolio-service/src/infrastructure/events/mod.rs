//! Event-stream adapters.

mod logging;

pub use logging::LoggingEventPublisher;
