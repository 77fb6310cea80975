//! Fixed-window rate limiter for outbound dependency calls.
//!
//! Used on the user-status path only; the cache path is not rate limited.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Throughput budget for one dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Calls permitted per window.
    pub permits_per_window: u32,
    /// Window length.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            permits_per_window: 50,
            window: Duration::from_secs(1),
        }
    }
}

#[derive(Debug)]
struct WindowState {
    window_start: Instant,
    used: u32,
}

/// Rejects calls exceeding a configured throughput.
#[derive(Debug)]
pub struct RateLimiter {
    name: String,
    config: RateLimitConfig,
    state: Mutex<WindowState>,
}

impl RateLimiter {
    /// Create a new rate limiter.
    #[must_use]
    pub fn new(name: impl Into<String>, config: RateLimitConfig) -> Self {
        Self {
            name: name.into(),
            config,
            state: Mutex::new(WindowState {
                window_start: Instant::now(),
                used: 0,
            }),
        }
    }

    /// Dependency name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Take one permit from the current window.
    ///
    /// Returns false when the window's budget is spent.
    #[must_use]
    pub fn try_acquire(&self) -> bool {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if state.window_start.elapsed() >= self.config.window {
            state.window_start = Instant::now();
            state.used = 0;
        }

        if state.used >= self.config.permits_per_window {
            return false;
        }

        state.used += 1;
        true
    }
}
