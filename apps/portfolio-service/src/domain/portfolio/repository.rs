//! Portfolio repository trait.
//!
//! Persistence abstraction over the document store; implemented by
//! adapters in the infrastructure layer. Each call is assumed atomic per
//! document; the store is the sole arbiter of document-level atomicity.

use async_trait::async_trait;

use super::aggregate::Portfolio;
use super::value_objects::AssetType;
use crate::domain::shared::{PortfolioId, UserId};

/// Failure of a repository call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RepositoryError {
    /// The store could not be reached or timed out; retryable.
    #[error("Portfolio store unavailable: {message}")]
    Unavailable {
        /// Transport-level detail.
        message: String,
    },

    /// The store answered but the document could not be read or written;
    /// not retryable.
    #[error("Portfolio store rejected the operation: {message}")]
    Storage {
        /// Store-level detail.
        message: String,
    },
}

impl RepositoryError {
    /// Whether retrying the call can help.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Repository trait for portfolio persistence.
#[async_trait]
pub trait PortfolioRepository: Send + Sync {
    /// Save a portfolio (insert or update).
    ///
    /// # Errors
    ///
    /// Returns error if persistence fails.
    async fn save(&self, portfolio: &Portfolio) -> Result<Portfolio, RepositoryError>;

    /// Find a portfolio by its id.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_id(&self, id: &PortfolioId) -> Result<Option<Portfolio>, RepositoryError>;

    /// Find a portfolio by id, scoped to its owning user.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_id_and_user(
        &self,
        id: &PortfolioId,
        user_id: UserId,
    ) -> Result<Option<Portfolio>, RepositoryError>;

    /// Find all portfolios owned by a user.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_all_by_user(&self, user_id: UserId) -> Result<Vec<Portfolio>, RepositoryError>;

    /// Find the portfolio for a (user, type, exchange) triple.
    ///
    /// At most one exists per triple.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_user_type_exchange(
        &self,
        user_id: UserId,
        portfolio_type: AssetType,
        exchange: &str,
    ) -> Result<Option<Portfolio>, RepositoryError>;

    /// Delete a portfolio by id. Deleting an absent id is not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the deletion fails.
    async fn delete_by_id(&self, id: &PortfolioId) -> Result<(), RepositoryError>;
}
