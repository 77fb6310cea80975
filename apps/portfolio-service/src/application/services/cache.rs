//! Resilient cache accessor.
//!
//! Wraps the cache port in the shared resilience pipeline. The cache is
//! best-effort and never authoritative: a failing read collapses to a
//! fixed sentinel value and a failing write is dropped; neither ever
//! raises to the caller.

use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::CachePort;
use crate::resilience::{CallError, ResilientCall};

/// Sentinel returned for a read whose underlying call ultimately failed.
pub const NO_VALUE: &str = "no_value";

/// Best-effort cache access with a fixed per-deployment TTL.
#[derive(Debug)]
pub struct ResilientCache<C: CachePort> {
    cache: Arc<C>,
    call: Arc<ResilientCall>,
    ttl: Duration,
}

impl<C: CachePort> ResilientCache<C> {
    /// Create a new accessor around `cache` using the shared pipeline.
    #[must_use]
    pub const fn new(cache: Arc<C>, call: Arc<ResilientCall>, ttl: Duration) -> Self {
        Self { cache, call, ttl }
    }

    /// Read a value.
    ///
    /// `None` is a miss; a failing underlying call yields
    /// `Some(NO_VALUE)` and never raises.
    pub async fn get(&self, key: &str) -> Option<String> {
        let result = self
            .call
            .run(|| {
                let cache = Arc::clone(&self.cache);
                let key = key.to_string();
                async move {
                    cache.get(&key).await.map_err(|e| CallError::Transient {
                        message: e.to_string(),
                    })
                }
            })
            .await;

        match result {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(
                    key = %key,
                    error = %error,
                    "Error occurred when fetching key from cache, using fallback value"
                );
                Some(NO_VALUE.to_string())
            }
        }
    }

    /// Write a value with the fixed TTL.
    ///
    /// Pure best-effort: a failure is logged and dropped, never affecting
    /// the request outcome.
    pub async fn set(&self, key: &str, value: &str) {
        let result = self
            .call
            .run(|| {
                let cache = Arc::clone(&self.cache);
                let key = key.to_string();
                let value = value.to_string();
                let ttl = self.ttl;
                async move {
                    cache
                        .set(&key, &value, ttl)
                        .await
                        .map_err(|e| CallError::Transient {
                            message: e.to_string(),
                        })
                }
            })
            .await;

        if let Err(error) = result {
            tracing::warn!(
                key = %key,
                value = %value,
                error = %error,
                "Error occurred when saving key in cache"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::CacheError;
    use crate::resilience::{ResiliencePolicy, RetryPolicy};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::RwLock;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FakeCache {
        entries: RwLock<HashMap<String, String>>,
        failing: AtomicBool,
    }

    impl FakeCache {
        fn new() -> Self {
            Self {
                entries: RwLock::new(HashMap::new()),
                failing: AtomicBool::new(false),
            }
        }

        fn fail(&self) {
            self.failing.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl CachePort for FakeCache {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(CacheError::Unavailable {
                    message: "connection refused".to_string(),
                });
            }
            Ok(self.entries.read().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str, _ttl: Duration) -> Result<(), CacheError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(CacheError::Unavailable {
                    message: "connection refused".to_string(),
                });
            }
            self.entries
                .write()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    fn accessor(cache: Arc<FakeCache>) -> ResilientCache<FakeCache> {
        let mut policy = ResiliencePolicy::cache();
        policy.retry = RetryPolicy::no_retry();
        ResilientCache::new(
            cache,
            Arc::new(ResilientCall::new(policy)),
            Duration::from_secs(120),
        )
    }

    #[tokio::test]
    async fn get_returns_cached_value() {
        let fake = Arc::new(FakeCache::new());
        let cache = accessor(Arc::clone(&fake));

        cache.set("user:1:active", "1").await;
        assert_eq!(cache.get("user:1:active").await.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn get_miss_is_none() {
        let cache = accessor(Arc::new(FakeCache::new()));
        assert!(cache.get("absent").await.is_none());
    }

    #[tokio::test]
    async fn failing_get_returns_sentinel_and_never_raises() {
        let fake = Arc::new(FakeCache::new());
        fake.fail();
        let cache = accessor(fake);

        assert_eq!(cache.get("any").await.as_deref(), Some(NO_VALUE));
    }

    #[tokio::test]
    async fn failing_set_is_swallowed() {
        let fake = Arc::new(FakeCache::new());
        fake.fail();
        let cache = accessor(fake);

        // Must not panic or propagate
        cache.set("any", "value").await;
    }
}
