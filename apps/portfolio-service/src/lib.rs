// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Portfolio Service - Rust Core Library
//!
//! Resilient transaction engine for the AssetFlow portfolio system.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic (aggregate, value objects, events)
//!   - `portfolio`: Portfolio aggregate, ledger primitives, errors,
//!     repository port
//!   - `shared`: identifiers, quantity value object
//!
//! - **Resilience**: Layered fault tolerance for outbound calls
//!   - retry with jittered exponential backoff
//!   - circuit breaker with sliding-window failure rate
//!   - bulkhead, rate limiter, per-attempt time limit
//!   - `ResilientCall` composing the above, with deterministic fallbacks
//!
//! - **Application**: DTOs, validators, ports and services
//!   - `ports`: `UserStatusPort`, `CachePort`, `EventPublisherPort`
//!   - `services`: `PortfolioTransactionEngine`, `UserActivityGate`,
//!     `ResilientCache`, `TradeCreatedListener`
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `http`: Axum REST controller
//!   - `persistence`: in-memory portfolio repository
//!   - `user_service`: reqwest user-status client
//!   - `cache` / `events`: in-memory cache, logging publisher

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Resilience layer - fault-tolerance policies and the composed pipeline.
pub mod resilience;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

/// Service configuration.
pub mod config;

/// Tracing setup.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

// Domain re-exports
pub use domain::portfolio::{
    ActionType, Asset, AssetType, LedgerError, Portfolio, PortfolioError, PortfolioRepository,
    PortfolioUpdatedEvent, ProcessingStatus, RepositoryError, TradeCreatedEvent, UpsertOutcome,
};
pub use domain::shared::{PortfolioId, Quantity, UserId};

// Resilience re-exports
pub use resilience::{
    CallError, CircuitBreaker, CircuitBreakerConfig, CircuitState, ResilienceError,
    ResiliencePolicy, ResilienceRegistry, ResilientCall, RetryPolicy,
};

// Application re-exports
pub use application::dto::{DepositDto, PortfolioDto, TradeDto, UserDto, WithdrawDto};
pub use application::ports::{
    CacheError, CachePort, EventPublishError, EventPublisherPort, NoOpEventPublisher,
    UserStatusError, UserStatusPort,
};
pub use application::services::{
    Acknowledgment, PortfolioTransactionEngine, ResilientCache, TradeCreatedListener,
    UserActivityGate,
};

// Infrastructure re-exports
pub use infrastructure::cache::InMemoryCache;
pub use infrastructure::events::LoggingEventPublisher;
pub use infrastructure::http::{AppState, create_router};
pub use infrastructure::persistence::InMemoryPortfolioRepository;
pub use infrastructure::user_service::{HttpUserStatusClient, UserServiceConfig};
