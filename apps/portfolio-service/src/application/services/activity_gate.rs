//! User activity gate.
//!
//! Fetches user status through the shared resilience pipeline. A
//! transient terminal failure is replaced by the deterministic
//! unknown-user record (inactive), so an unreachable user service fails
//! closed instead of cascading. A permanent failure (authentication or
//! endpoint misconfiguration) is re-raised, never masked.

use std::sync::Arc;

use crate::application::dto::UserDto;
use crate::application::ports::UserStatusPort;
use crate::domain::portfolio::PortfolioError;
use crate::domain::shared::UserId;
use crate::resilience::{CallError, ResilientCall};

/// Gate deciding whether a user may mutate portfolios.
#[derive(Debug)]
pub struct UserActivityGate<U: UserStatusPort> {
    client: Arc<U>,
    call: Arc<ResilientCall>,
}

impl<U: UserStatusPort> UserActivityGate<U> {
    /// Create a gate around the user-status client using the shared
    /// pipeline.
    #[must_use]
    pub const fn new(client: Arc<U>, call: Arc<ResilientCall>) -> Self {
        Self { client, call }
    }

    /// Fetch the user record, substituting the unknown-user fallback on
    /// transient terminal failure.
    ///
    /// # Errors
    ///
    /// Returns `ExternalUnavailable` only for permanent failures (fatal
    /// misconfiguration); transient failures never propagate.
    pub async fn fetch_status(&self, user_id: UserId) -> Result<UserDto, PortfolioError> {
        self.call
            .run_with_fallback(
                || {
                    let client = Arc::clone(&self.client);
                    async move {
                        client.fetch_user(user_id).await.map_err(|e| {
                            if e.is_transient() {
                                CallError::Transient {
                                    message: e.to_string(),
                                }
                            } else {
                                CallError::Permanent {
                                    message: e.to_string(),
                                }
                            }
                        })
                    }
                },
                |error| {
                    if error.is_transient() {
                        tracing::warn!(
                            user_id = %user_id,
                            error = %error,
                            "Fallback executed, returning default user data"
                        );
                        Ok(UserDto::unknown(user_id))
                    } else {
                        Err(error)
                    }
                },
            )
            .await
            .map_err(|error| PortfolioError::ExternalUnavailable {
                message: error.to_string(),
            })
    }

    /// Whether the user may mutate portfolios.
    ///
    /// An unresolvable status is inactive (fail-closed); a resolvable
    /// status with an absent activity flag is a validation failure of its
    /// own.
    ///
    /// # Errors
    ///
    /// Returns `UserDataInvalid` for a malformed record and
    /// `ExternalUnavailable` for a permanent lookup failure.
    pub async fn is_active(&self, user_id: UserId) -> Result<bool, PortfolioError> {
        let user = self.fetch_status(user_id).await?;
        user.is_active.map_or_else(
            || {
                tracing::warn!(
                    user_id = %user_id,
                    "User record resolved without an activity flag"
                );
                Err(PortfolioError::UserDataInvalid { user_id })
            },
            Ok,
        )
    }
}
