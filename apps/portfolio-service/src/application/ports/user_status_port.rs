//! User-status port (driven port).
//!
//! Contract required from the external user service: fetch a user record
//! by id. Transport failures are classified so the resilience pipeline
//! knows what may be retried.

use async_trait::async_trait;

use crate::application::dto::UserDto;
use crate::domain::shared::UserId;

/// Failure of a user-status lookup.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UserStatusError {
    /// The service could not be reached or timed out; retryable.
    #[error("User service unreachable: {message}")]
    Unreachable {
        /// Transport-level detail.
        message: String,
    },

    /// The service answered and rejected the call (auth, bad endpoint,
    /// malformed body); not retryable.
    #[error("User service rejected the call: {message}")]
    Rejected {
        /// Rejection detail.
        message: String,
    },
}

impl UserStatusError {
    /// Whether retrying the lookup can help.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}

/// Port for the external user-status service.
#[async_trait]
pub trait UserStatusPort: Send + Sync {
    /// Fetch the user record for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns a classified `UserStatusError` on any transport failure.
    async fn fetch_user(&self, user_id: UserId) -> Result<UserDto, UserStatusError>;
}
