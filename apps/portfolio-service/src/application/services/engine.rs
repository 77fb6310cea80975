//! Portfolio transaction engine.
//!
//! Orchestrates validation, ledger mutation, persistence and event
//! emission for deposits, withdrawals and trades, plus portfolio
//! creation and the read/delete pass-throughs.
//!
//! Every request is a self-contained transition: validation and lookups
//! complete before any in-memory mutation, the mutated aggregate is
//! persisted exactly once, and event emission happens strictly after a
//! successful save; a publish failure never unwinds the save.

use std::sync::Arc;
use std::time::Duration;

use crate::application::dto::{DepositDto, PortfolioDto, TradeDto, WithdrawDto};
use crate::application::ports::{CachePort, EventPublisherPort, UserStatusPort};
use crate::application::validation::{DELIMITER, validate_portfolio_dto, validate_trade_dto};
use crate::domain::portfolio::{
    LedgerError, Portfolio, PortfolioError, PortfolioRepository, PortfolioUpdatedEvent,
    ProcessingStatus, RepositoryError, UpsertOutcome,
};
use crate::domain::shared::{PortfolioId, Quantity, UserId};
use crate::resilience::{CallError, ResilienceRegistry, ResilientCall};

use super::activity_gate::UserActivityGate;
use super::cache::ResilientCache;

/// Transaction engine over the four driven ports.
///
/// Invoked concurrently by many request handlers; holds no per-request
/// state. The resilience pipelines inside the gate, cache accessor and
/// store wrapper are the only shared mutable state.
pub struct PortfolioTransactionEngine<R, U, C, E>
where
    R: PortfolioRepository,
    U: UserStatusPort,
    C: CachePort,
    E: EventPublisherPort,
{
    repository: Arc<R>,
    gate: UserActivityGate<U>,
    cache: ResilientCache<C>,
    publisher: Arc<E>,
    store_call: Arc<ResilientCall>,
}

impl<R, U, C, E> PortfolioTransactionEngine<R, U, C, E>
where
    R: PortfolioRepository,
    U: UserStatusPort,
    C: CachePort,
    E: EventPublisherPort,
{
    /// Wire the engine to its collaborators.
    ///
    /// The registry is owned by the caller and injected here; there is no
    /// ambient global lookup.
    #[must_use]
    pub fn new(
        repository: Arc<R>,
        user_service: Arc<U>,
        cache: Arc<C>,
        publisher: Arc<E>,
        registry: &ResilienceRegistry,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            repository,
            gate: UserActivityGate::new(user_service, Arc::clone(&registry.user_status)),
            cache: ResilientCache::new(cache, Arc::clone(&registry.cache), cache_ttl),
            publisher,
            store_call: Arc::clone(&registry.persistence),
        }
    }

    /// Create a portfolio with an empty asset set.
    ///
    /// # Errors
    ///
    /// `Validation` joining every violated rule, `UserNotActive`,
    /// `PortfolioAlreadyExists` for a duplicate (user, type, exchange)
    /// triple, or `ExternalUnavailable` when the store fails.
    pub async fn create_portfolio(&self, dto: PortfolioDto) -> Result<(), PortfolioError> {
        let request = validate_portfolio_dto(&dto).map_err(|violations| {
            let joined = violations.join(DELIMITER);
            tracing::error!(errors = %joined, "PortfolioDto contains validation errors");
            PortfolioError::Validation {
                message: format!("PortfolioDto contains validation errors: [{joined}]"),
            }
        })?;

        self.require_active_user(request.user_id).await?;

        let existing = self
            .repository
            .find_by_user_type_exchange(
                request.user_id,
                request.portfolio_type,
                &request.exchange_name,
            )
            .await
            .map_err(store_error)?;

        if existing.is_some() {
            tracing::error!(
                user_id = %request.user_id,
                portfolio_type = %request.portfolio_type,
                exchange = %request.exchange_name,
                "Portfolio already present"
            );
            return Err(PortfolioError::PortfolioAlreadyExists {
                user_id: request.user_id,
                portfolio_type: request.portfolio_type,
                exchange: request.exchange_name,
            });
        }

        tracing::info!(
            portfolio_type = %request.portfolio_type,
            user_id = %request.user_id,
            "Saving new portfolio"
        );
        let portfolio = Portfolio::new(
            request.id.unwrap_or_else(PortfolioId::generate),
            request.user_id,
            request.portfolio_type,
            request.exchange_name,
        );
        self.repository
            .save(&portfolio)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    /// Record a deposit into a portfolio.
    ///
    /// # Errors
    ///
    /// `Validation` for a negative quantity, `UserNotActive`,
    /// `PortfolioNotFound`, or `ExternalUnavailable` when the store fails.
    pub async fn deposit(&self, dto: DepositDto) -> Result<ProcessingStatus, PortfolioError> {
        if dto.quantity < rust_decimal::Decimal::ZERO {
            return Err(PortfolioError::Validation {
                message: "DepositDto contains validation errors: [Quantity cannot be negative]"
                    .to_string(),
            });
        }

        let user_id = UserId::new(dto.user_id);
        self.require_active_user(user_id).await?;

        let portfolio_id = PortfolioId::new(dto.portfolio_id.clone());
        let mut portfolio = self
            .resolve_portfolio(&portfolio_id, user_id)
            .await?;

        let quantity = Quantity::new(dto.quantity);
        portfolio
            .upsert_asset(&dto.asset_name, quantity, dto.asset_type)
            .map_err(|_| PortfolioError::Validation {
                message: "DepositDto contains validation errors: [Quantity cannot be negative]"
                    .to_string(),
            })?;

        tracing::info!(user_id = %user_id, "Saving deposit");
        self.repository
            .save(&portfolio)
            .await
            .map_err(store_error)?;

        self.emit(PortfolioUpdatedEvent::deposit(
            portfolio_id,
            user_id,
            dto.asset_name,
            quantity,
        ))
        .await;

        Ok(ProcessingStatus::Success)
    }

    /// Record a withdrawal from a portfolio.
    ///
    /// # Errors
    ///
    /// `UserNotActive`, `PortfolioNotFound`, `AssetNotFound`,
    /// `InsufficientQuantity` (balance unchanged), or
    /// `ExternalUnavailable` when the store fails.
    pub async fn withdraw(&self, dto: WithdrawDto) -> Result<ProcessingStatus, PortfolioError> {
        let user_id = UserId::new(dto.user_id);
        self.require_active_user(user_id).await?;

        let portfolio_id = PortfolioId::new(dto.portfolio_id.clone());
        let mut portfolio = self
            .resolve_portfolio(&portfolio_id, user_id)
            .await?;

        let quantity = Quantity::new(dto.quantity_to_withdraw);
        self.debit_asset(&mut portfolio, &dto.asset_name, quantity, user_id)?;

        tracing::info!(user_id = %user_id, "Saving withdrawal");
        self.repository
            .save(&portfolio)
            .await
            .map_err(store_error)?;

        self.emit(PortfolioUpdatedEvent::withdraw(
            portfolio_id,
            user_id,
            dto.asset_name,
            quantity,
        ))
        .await;

        Ok(ProcessingStatus::Success)
    }

    /// Execute a trade: debit the pay asset and credit the buy asset
    /// within one portfolio.
    ///
    /// A trade whose buy asset is newly created is saved and reported
    /// successful without a portfolio-updated event; only trades against
    /// an existing buy asset emit one.
    ///
    /// # Errors
    ///
    /// `Validation` joining every violated rule, `UserNotActive`,
    /// `PortfolioNotFound` for the (user, type, exchange) triple,
    /// `AssetNotFound`, `InsufficientQuantity`, or `ExternalUnavailable`
    /// when the store fails.
    pub async fn process_trade(&self, dto: TradeDto) -> Result<ProcessingStatus, PortfolioError> {
        let request = validate_trade_dto(&dto).map_err(|violations| {
            let joined = violations.join(DELIMITER);
            tracing::error!(errors = %joined, "TradeDto contains validation errors");
            PortfolioError::Validation {
                message: format!("TradeDto contains validation errors: [{joined}]"),
            }
        })?;

        self.require_active_user(request.user_id).await?;

        let mut portfolio = self
            .repository
            .find_by_user_type_exchange(
                request.user_id,
                request.asset_type,
                &request.exchange_name,
            )
            .await
            .map_err(store_error)?
            .ok_or_else(|| {
                tracing::error!(
                    portfolio_type = %request.asset_type,
                    exchange = %request.exchange_name,
                    user_id = %request.user_id,
                    "Portfolio not present"
                );
                PortfolioError::PortfolioNotFoundForMarket {
                    portfolio_type: request.asset_type,
                    exchange: request.exchange_name.clone(),
                    user_id: request.user_id,
                }
            })?;

        self.debit_asset(
            &mut portfolio,
            &request.asset_to_pay,
            request.amount_to_pay,
            request.user_id,
        )?;

        let outcome = portfolio
            .upsert_asset(
                &request.asset_to_buy,
                request.amount_bought,
                request.asset_type,
            )
            .map_err(|_| PortfolioError::Validation {
                message: "TradeDto contains validation errors: [AmountBought cannot be null or less or equal to 0]"
                    .to_string(),
            })?;

        tracing::info!(
            portfolio_type = %request.asset_type,
            user_id = %request.user_id,
            "Saving new trade"
        );
        let portfolio_id = portfolio.id().clone();
        self.repository
            .save(&portfolio)
            .await
            .map_err(store_error)?;

        // A trade that introduces a brand-new asset completes without a
        // portfolio-updated event.
        if outcome == UpsertOutcome::Created {
            return Ok(ProcessingStatus::Success);
        }

        self.emit(PortfolioUpdatedEvent::trade(
            portfolio_id,
            request.user_id,
            request.asset_to_buy,
            request.amount_bought,
            request.asset_to_pay,
            request.amount_to_pay,
        ))
        .await;

        Ok(ProcessingStatus::Success)
    }

    /// Fetch a portfolio by id through the resilience-wrapped read path.
    ///
    /// # Errors
    ///
    /// `ExternalUnavailable` when the wrapped read ultimately fails;
    /// there is no safe default portfolio state to fall back to.
    pub async fn fetch_by_id(
        &self,
        portfolio_id: &PortfolioId,
    ) -> Result<Option<PortfolioDto>, PortfolioError> {
        tracing::info!(portfolio_id = %portfolio_id, "Fetching portfolio");

        let found = self
            .store_call
            .run(|| {
                let repository = Arc::clone(&self.repository);
                let id = portfolio_id.clone();
                async move { repository.find_by_id(&id).await.map_err(repository_call_error) }
            })
            .await
            .map_err(|error| PortfolioError::ExternalUnavailable {
                message: error.to_string(),
            })?;

        Ok(found.map(|portfolio| PortfolioDto::from_portfolio(&portfolio)))
    }

    /// Fetch all portfolios for a user through the wrapped read path.
    ///
    /// # Errors
    ///
    /// `ExternalUnavailable` when the wrapped read ultimately fails.
    pub async fn fetch_all_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PortfolioDto>, PortfolioError> {
        tracing::info!(user_id = %user_id, "Fetching all portfolios for user");

        let portfolios = self
            .store_call
            .run(|| {
                let repository = Arc::clone(&self.repository);
                async move {
                    repository
                        .find_all_by_user(user_id)
                        .await
                        .map_err(repository_call_error)
                }
            })
            .await
            .map_err(|error| PortfolioError::ExternalUnavailable {
                message: error.to_string(),
            })?;

        Ok(portfolios
            .iter()
            .map(PortfolioDto::from_portfolio)
            .collect())
    }

    /// Delete a portfolio by id through the wrapped delete path.
    ///
    /// # Errors
    ///
    /// `ExternalUnavailable` when the wrapped delete ultimately fails.
    pub async fn delete_by_id(&self, portfolio_id: &PortfolioId) -> Result<(), PortfolioError> {
        tracing::info!(portfolio_id = %portfolio_id, "Deleting portfolio");

        self.store_call
            .run(|| {
                let repository = Arc::clone(&self.repository);
                let id = portfolio_id.clone();
                async move {
                    repository
                        .delete_by_id(&id)
                        .await
                        .map_err(repository_call_error)
                }
            })
            .await
            .map_err(|error| PortfolioError::ExternalUnavailable {
                message: error.to_string(),
            })
    }

    /// Check the activity flag, consulting the cache first.
    ///
    /// The cached flag is opportunistic only: a miss, a sentinel, or any
    /// unexpected value falls through to the live lookup.
    async fn require_active_user(&self, user_id: UserId) -> Result<(), PortfolioError> {
        let key = format!("user:{user_id}:active");

        let active = match self.cache.get(&key).await.as_deref() {
            Some("1") => true,
            Some("0") => false,
            // Miss or sentinel: fall through to the live lookup
            _ => {
                let active = self.gate.is_active(user_id).await?;
                self.cache.set(&key, if active { "1" } else { "0" }).await;
                active
            }
        };

        if active {
            Ok(())
        } else {
            tracing::error!(user_id = %user_id, "User is not active");
            Err(PortfolioError::UserNotActive { user_id })
        }
    }

    /// Resolve a portfolio by (id, user) for a mutation.
    async fn resolve_portfolio(
        &self,
        portfolio_id: &PortfolioId,
        user_id: UserId,
    ) -> Result<Portfolio, PortfolioError> {
        self.repository
            .find_by_id_and_user(portfolio_id, user_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| {
                tracing::error!(
                    portfolio_id = %portfolio_id,
                    user_id = %user_id,
                    "Portfolio not present"
                );
                PortfolioError::PortfolioNotFound {
                    portfolio_id: portfolio_id.as_str().to_string(),
                    user_id,
                }
            })
    }

    /// Debit an asset, mapping ledger failures to domain errors carrying
    /// the stored asset name.
    fn debit_asset(
        &self,
        portfolio: &mut Portfolio,
        asset_name: &str,
        amount: Quantity,
        user_id: UserId,
    ) -> Result<(), PortfolioError> {
        let portfolio_id = portfolio.id().as_str().to_string();
        let stored_name = portfolio
            .find_asset(asset_name)
            .map(|asset| asset.name.clone())
            .ok_or_else(|| {
                tracing::error!(
                    asset = %asset_name,
                    portfolio_id = %portfolio_id,
                    "Asset not present in portfolio"
                );
                PortfolioError::AssetNotFound {
                    asset_name: asset_name.to_string(),
                    portfolio_id: portfolio_id.clone(),
                }
            })?;

        portfolio
            .decrease_asset(asset_name, amount)
            .map_err(|error| match error {
                LedgerError::Insufficient | LedgerError::NegativeAmount => {
                    tracing::error!(
                        asset = %stored_name,
                        user_id = %user_id,
                        "Not enough quantity present in the portfolio"
                    );
                    PortfolioError::InsufficientQuantity {
                        asset_name: stored_name.clone(),
                        user_id,
                    }
                }
                LedgerError::AssetNotFound => PortfolioError::AssetNotFound {
                    asset_name: asset_name.to_string(),
                    portfolio_id: portfolio_id.clone(),
                },
            })
    }

    /// Publish a mutation event; failures are logged and swallowed
    /// because the mutation is already durably committed.
    async fn emit(&self, event: PortfolioUpdatedEvent) {
        if let Err(error) = self.publisher.publish(event).await {
            tracing::error!(error = %error, "Failed to publish portfolio update event");
        }
    }
}

/// Store failure on a mutation path: surfaced, never masked.
fn store_error(error: RepositoryError) -> PortfolioError {
    PortfolioError::ExternalUnavailable {
        message: error.to_string(),
    }
}

/// Classify a repository failure for the resilience pipeline.
fn repository_call_error(error: RepositoryError) -> CallError {
    if error.is_transient() {
        CallError::Transient {
            message: error.to_string(),
        }
    } else {
        CallError::Permanent {
            message: error.to_string(),
        }
    }
}
