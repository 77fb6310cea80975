//! Layered fault-tolerance for outbound dependency calls.
//!
//! Retry, circuit breaking, bulkheading, rate limiting and per-attempt
//! time limits, composed explicitly by [`ResilientCall`] and shared per
//! dependency through [`ResilienceRegistry`].

mod bulkhead;
mod circuit_breaker;
mod pipeline;
mod rate_limiter;
mod retry;

pub use bulkhead::{Bulkhead, BulkheadPermit};
pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerMetrics, CircuitState,
};
pub use pipeline::{
    CallError, ResilienceError, ResiliencePolicy, ResilienceRegistry, ResilientCall,
};
pub use rate_limiter::{RateLimitConfig, RateLimiter};
pub use retry::{ExponentialBackoff, RetryPolicy};
