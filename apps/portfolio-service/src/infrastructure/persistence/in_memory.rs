//! In-memory portfolio repository for testing and development.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::portfolio::{AssetType, Portfolio, PortfolioRepository, RepositoryError};
use crate::domain::shared::{PortfolioId, UserId};

/// In-memory implementation of `PortfolioRepository`.
///
/// Suitable for testing and development. Not for production use.
#[derive(Debug, Default)]
pub struct InMemoryPortfolioRepository {
    portfolios: RwLock<HashMap<String, Portfolio>>,
}

impl InMemoryPortfolioRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            portfolios: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored portfolios.
    #[must_use]
    pub fn len(&self) -> usize {
        self.portfolios
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Whether the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PortfolioRepository for InMemoryPortfolioRepository {
    async fn save(&self, portfolio: &Portfolio) -> Result<Portfolio, RepositoryError> {
        let mut portfolios = self
            .portfolios
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        portfolios.insert(portfolio.id().as_str().to_string(), portfolio.clone());
        Ok(portfolio.clone())
    }

    async fn find_by_id(&self, id: &PortfolioId) -> Result<Option<Portfolio>, RepositoryError> {
        let portfolios = self
            .portfolios
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(portfolios.get(id.as_str()).cloned())
    }

    async fn find_by_id_and_user(
        &self,
        id: &PortfolioId,
        user_id: UserId,
    ) -> Result<Option<Portfolio>, RepositoryError> {
        let portfolios = self
            .portfolios
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(portfolios
            .get(id.as_str())
            .filter(|portfolio| portfolio.user_id() == user_id)
            .cloned())
    }

    async fn find_all_by_user(&self, user_id: UserId) -> Result<Vec<Portfolio>, RepositoryError> {
        let portfolios = self
            .portfolios
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(portfolios
            .values()
            .filter(|portfolio| portfolio.user_id() == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_user_type_exchange(
        &self,
        user_id: UserId,
        portfolio_type: AssetType,
        exchange: &str,
    ) -> Result<Option<Portfolio>, RepositoryError> {
        let portfolios = self
            .portfolios
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(portfolios
            .values()
            .find(|portfolio| {
                portfolio.user_id() == user_id
                    && portfolio.portfolio_type() == portfolio_type
                    && portfolio.exchange() == exchange
            })
            .cloned())
    }

    async fn delete_by_id(&self, id: &PortfolioId) -> Result<(), RepositoryError> {
        let mut portfolios = self
            .portfolios
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        portfolios.remove(id.as_str());
        Ok(())
    }
}
