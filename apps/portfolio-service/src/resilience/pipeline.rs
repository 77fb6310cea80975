//! Composed resilience pipeline for outbound dependency calls.
//!
//! One `ResilientCall` instance is shared by every request targeting the
//! same dependency; its breaker, bulkhead and rate-limiter state is the
//! only cross-request shared mutable state in this service.
//!
//! # Composition order
//!
//! 1. Circuit breaker admission: an open circuit fails in O(1) before a
//!    bulkhead slot is consumed.
//! 2. Rate limiter (where configured).
//! 3. Bulkhead permit: saturation fails immediately, no queuing.
//! 4. Retry loop; every attempt runs under its own `tokio::time::timeout`
//!    so a hung call cannot block the breaker's failure accounting.
//!
//! Timeouts and transient errors count as breaker failures and are
//! retried with backoff. Permanent errors are returned immediately and
//! recorded as breaker successes: a rejected call still proves the
//! dependency is up.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::bulkhead::Bulkhead;
use super::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
use super::rate_limiter::{RateLimitConfig, RateLimiter};
use super::retry::{ExponentialBackoff, RetryPolicy};

/// Failure of the wrapped operation, classified for retry decisions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    /// Network-class failure; retrying can help.
    #[error("transient failure: {message}")]
    Transient {
        /// Transport-level detail.
        message: String,
    },

    /// The dependency answered and rejected the call; retrying cannot help.
    #[error("permanent failure: {message}")]
    Permanent {
        /// Rejection detail.
        message: String,
    },
}

/// Terminal failure of a resilience-wrapped call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResilienceError {
    /// The circuit breaker is open; the operation was not invoked.
    #[error("circuit breaker for [{name}] is open")]
    CircuitOpen {
        /// Dependency name.
        name: String,
    },

    /// The bulkhead is saturated; the operation was not invoked.
    #[error("bulkhead for [{name}] is full")]
    BulkheadFull {
        /// Dependency name.
        name: String,
    },

    /// The rate limit was exceeded; the operation was not invoked.
    #[error("rate limit for [{name}] exceeded")]
    RateLimited {
        /// Dependency name.
        name: String,
    },

    /// The last attempt exceeded the call timeout.
    #[error("call to [{name}] timed out after {timeout:?}")]
    Timeout {
        /// Dependency name.
        name: String,
        /// Configured per-attempt timeout.
        timeout: Duration,
    },

    /// The operation itself failed and the retry budget is spent (or the
    /// failure was permanent).
    #[error("call to [{name}] failed: {error}")]
    Call {
        /// Dependency name.
        name: String,
        /// Underlying failure.
        error: CallError,
    },
}

impl ResilienceError {
    /// Whether the failure class is transient (safe to mask with a
    /// deterministic fallback).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        !matches!(
            self,
            Self::Call {
                error: CallError::Permanent { .. },
                ..
            }
        )
    }
}

/// Named policy set for one dependency.
#[derive(Debug, Clone)]
pub struct ResiliencePolicy {
    /// Dependency name, used in errors and logs.
    pub name: String,
    /// Retry budget and backoff.
    pub retry: RetryPolicy,
    /// Per-attempt time limit.
    pub call_timeout: Duration,
    /// Circuit breaker tuning.
    pub breaker: CircuitBreakerConfig,
    /// Concurrent in-flight call cap.
    pub bulkhead_permits: usize,
    /// Throughput cap; `None` disables rate limiting for this dependency.
    pub rate_limit: Option<RateLimitConfig>,
}

impl ResiliencePolicy {
    /// Policy for the external user-status service (the only rate-limited
    /// path).
    #[must_use]
    pub fn user_status() -> Self {
        Self {
            name: "user-status".to_string(),
            retry: RetryPolicy::default(),
            call_timeout: Duration::from_secs(2),
            breaker: CircuitBreakerConfig::default(),
            bulkhead_permits: 25,
            rate_limit: Some(RateLimitConfig::default()),
        }
    }

    /// Policy for the cache. Short timeout, no rate limit; the cache is
    /// best-effort and must fail fast.
    #[must_use]
    pub fn cache() -> Self {
        Self {
            name: "cache".to_string(),
            retry: RetryPolicy {
                max_attempts: 1,
                ..Default::default()
            },
            call_timeout: Duration::from_millis(500),
            breaker: CircuitBreakerConfig::default(),
            bulkhead_permits: 50,
            rate_limit: None,
        }
    }

    /// Policy for the portfolio store read/delete pass-throughs.
    #[must_use]
    pub fn persistence() -> Self {
        Self {
            name: "portfolio-store".to_string(),
            retry: RetryPolicy::default(),
            call_timeout: Duration::from_secs(3),
            breaker: CircuitBreakerConfig::default(),
            bulkhead_permits: 25,
            rate_limit: None,
        }
    }
}

/// Resilience-wrapped call for one named dependency.
#[derive(Debug)]
pub struct ResilientCall {
    name: String,
    retry: RetryPolicy,
    call_timeout: Duration,
    breaker: CircuitBreaker,
    bulkhead: Bulkhead,
    rate_limiter: Option<RateLimiter>,
}

impl ResilientCall {
    /// Build the pipeline from a named policy set.
    #[must_use]
    pub fn new(policy: ResiliencePolicy) -> Self {
        Self {
            breaker: CircuitBreaker::new(policy.name.clone(), policy.breaker),
            bulkhead: Bulkhead::new(policy.name.clone(), policy.bulkhead_permits),
            rate_limiter: policy
                .rate_limit
                .map(|config| RateLimiter::new(policy.name.clone(), config)),
            name: policy.name,
            retry: policy.retry,
            call_timeout: policy.call_timeout,
        }
    }

    /// Dependency name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Circuit breaker, exposed for health reporting and tests.
    #[must_use]
    pub const fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Run `op` through the composed pipeline.
    ///
    /// # Errors
    ///
    /// Returns a `ResilienceError` when admission fails (open circuit,
    /// saturated bulkhead, exhausted rate limit) or when the operation
    /// keeps failing after the retry budget is spent.
    pub async fn run<T, F, Fut>(&self, op: F) -> Result<T, ResilienceError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, CallError>>,
    {
        if !self.breaker.is_call_permitted() {
            return Err(ResilienceError::CircuitOpen {
                name: self.name.clone(),
            });
        }

        if let Some(limiter) = &self.rate_limiter
            && !limiter.try_acquire()
        {
            return Err(ResilienceError::RateLimited {
                name: self.name.clone(),
            });
        }

        let Some(_permit) = self.bulkhead.try_acquire() else {
            return Err(ResilienceError::BulkheadFull {
                name: self.name.clone(),
            });
        };

        let mut backoff = ExponentialBackoff::new(&self.retry);

        loop {
            match tokio::time::timeout(self.call_timeout, op()).await {
                Ok(Ok(value)) => {
                    self.breaker.record_success();
                    return Ok(value);
                }
                Ok(Err(error @ CallError::Permanent { .. })) => {
                    self.breaker.record_success();
                    return Err(ResilienceError::Call {
                        name: self.name.clone(),
                        error,
                    });
                }
                Ok(Err(error @ CallError::Transient { .. })) => {
                    self.breaker.record_failure();
                    if let Some(delay) = self.next_delay(&mut backoff, &error) {
                        tokio::time::sleep(delay).await;
                    } else {
                        return Err(ResilienceError::Call {
                            name: self.name.clone(),
                            error,
                        });
                    }
                }
                Err(_elapsed) => {
                    self.breaker.record_failure();
                    let error = CallError::Transient {
                        message: format!("timed out after {:?}", self.call_timeout),
                    };
                    if let Some(delay) = self.next_delay(&mut backoff, &error) {
                        tokio::time::sleep(delay).await;
                    } else {
                        return Err(ResilienceError::Timeout {
                            name: self.name.clone(),
                            timeout: self.call_timeout,
                        });
                    }
                }
            }

            // The breaker may have opened on this instance (or another
            // task) between attempts.
            if !self.breaker.is_call_permitted() {
                return Err(ResilienceError::CircuitOpen {
                    name: self.name.clone(),
                });
            }
        }
    }

    /// Run `op` through the pipeline, handing the terminal failure to a
    /// caller-supplied fallback that may substitute a value or re-raise.
    ///
    /// # Errors
    ///
    /// Returns whatever the fallback returns when it chooses to re-raise.
    pub async fn run_with_fallback<T, F, Fut, FB>(
        &self,
        op: F,
        fallback: FB,
    ) -> Result<T, ResilienceError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, CallError>>,
        FB: FnOnce(ResilienceError) -> Result<T, ResilienceError>,
    {
        match self.run(op).await {
            Ok(value) => Ok(value),
            Err(error) => fallback(error),
        }
    }

    fn next_delay(&self, backoff: &mut ExponentialBackoff, error: &CallError) -> Option<Duration> {
        let delay = backoff.next_backoff()?;
        tracing::warn!(
            name = %self.name,
            error = %error,
            delay_ms = delay.as_millis(),
            attempt = backoff.attempts(),
            "Transient failure, retrying"
        );
        Some(delay)
    }
}

/// Explicitly constructed registry of shared pipelines, one per external
/// resource, passed into the engine and accessors at construction time.
#[derive(Debug)]
pub struct ResilienceRegistry {
    /// Pipeline for the user-status service.
    pub user_status: Arc<ResilientCall>,
    /// Pipeline for the cache.
    pub cache: Arc<ResilientCall>,
    /// Pipeline for the portfolio store read/delete pass-throughs.
    pub persistence: Arc<ResilientCall>,
}

impl ResilienceRegistry {
    /// Registry with the per-dependency default policies.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            user_status: Arc::new(ResilientCall::new(ResiliencePolicy::user_status())),
            cache: Arc::new(ResilientCall::new(ResiliencePolicy::cache())),
            persistence: Arc::new(ResilientCall::new(ResiliencePolicy::persistence())),
        }
    }
}

impl Default for ResilienceRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
