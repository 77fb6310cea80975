//! Infrastructure layer - adapters for external collaborators.

/// Cache adapters.
pub mod cache;

/// Event-stream adapters.
pub mod events;

/// Axum HTTP adapter.
pub mod http;

/// Persistence adapters.
pub mod persistence;

/// User-service client adapter.
pub mod user_service;
