//! HTTP controller (driver adapter).
//!
//! Axum-based REST API mapping 1:1 onto engine operations.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::application::dto::{DepositDto, PortfolioDto, TradeDto, WithdrawDto};
use crate::application::ports::{CachePort, EventPublisherPort, UserStatusPort};
use crate::application::services::PortfolioTransactionEngine;
use crate::domain::portfolio::{PortfolioRepository, ProcessingStatus};
use crate::domain::shared::{PortfolioId, UserId};

use super::response::{ApiError, HealthResponse};

/// Application state shared across handlers.
pub struct AppState<R, U, C, E>
where
    R: PortfolioRepository,
    U: UserStatusPort,
    C: CachePort,
    E: EventPublisherPort,
{
    /// The transaction engine.
    pub engine: Arc<PortfolioTransactionEngine<R, U, C, E>>,
    /// Application version.
    pub version: String,
}

impl<R, U, C, E> Clone for AppState<R, U, C, E>
where
    R: PortfolioRepository,
    U: UserStatusPort,
    C: CachePort,
    E: EventPublisherPort,
{
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            version: self.version.clone(),
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<R, U, C, E>(state: AppState<R, U, C, E>) -> Router
where
    R: PortfolioRepository + 'static,
    U: UserStatusPort + 'static,
    C: CachePort + 'static,
    E: EventPublisherPort + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/assetflow/portfolios", post(create_portfolio))
        .route(
            "/v1/assetflow/portfolios/{portfolio_id}",
            get(get_portfolio_by_id).delete(delete_portfolio_by_id),
        )
        .route(
            "/v1/assetflow/portfolios/all/{user_id}",
            get(get_all_portfolios_for_user),
        )
        .route("/v1/assetflow/portfolios/deposit", post(process_deposit))
        .route("/v1/assetflow/portfolios/withdraw", post(process_withdraw))
        .route("/v1/assetflow/portfolios/trade", post(process_trade))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check<R, U, C, E>(State(state): State<AppState<R, U, C, E>>) -> Json<HealthResponse>
where
    R: PortfolioRepository,
    U: UserStatusPort,
    C: CachePort,
    E: EventPublisherPort,
{
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
    })
}

/// Create a portfolio.
async fn create_portfolio<R, U, C, E>(
    State(state): State<AppState<R, U, C, E>>,
    Json(dto): Json<PortfolioDto>,
) -> Result<(), ApiError>
where
    R: PortfolioRepository,
    U: UserStatusPort,
    C: CachePort,
    E: EventPublisherPort,
{
    state.engine.create_portfolio(dto).await?;
    Ok(())
}

/// Fetch a portfolio by id; the body is `null` when absent.
async fn get_portfolio_by_id<R, U, C, E>(
    State(state): State<AppState<R, U, C, E>>,
    Path(portfolio_id): Path<String>,
) -> Result<Json<Option<PortfolioDto>>, ApiError>
where
    R: PortfolioRepository,
    U: UserStatusPort,
    C: CachePort,
    E: EventPublisherPort,
{
    let found = state
        .engine
        .fetch_by_id(&PortfolioId::new(portfolio_id))
        .await?;
    Ok(Json(found))
}

/// List all portfolios for a user.
async fn get_all_portfolios_for_user<R, U, C, E>(
    State(state): State<AppState<R, U, C, E>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<PortfolioDto>>, ApiError>
where
    R: PortfolioRepository,
    U: UserStatusPort,
    C: CachePort,
    E: EventPublisherPort,
{
    let portfolios = state
        .engine
        .fetch_all_for_user(UserId::new(user_id))
        .await?;
    Ok(Json(portfolios))
}

/// Delete a portfolio by id.
async fn delete_portfolio_by_id<R, U, C, E>(
    State(state): State<AppState<R, U, C, E>>,
    Path(portfolio_id): Path<String>,
) -> Result<(), ApiError>
where
    R: PortfolioRepository,
    U: UserStatusPort,
    C: CachePort,
    E: EventPublisherPort,
{
    state
        .engine
        .delete_by_id(&PortfolioId::new(portfolio_id))
        .await?;
    Ok(())
}

/// Record a deposit.
async fn process_deposit<R, U, C, E>(
    State(state): State<AppState<R, U, C, E>>,
    Json(dto): Json<DepositDto>,
) -> Result<Json<ProcessingStatus>, ApiError>
where
    R: PortfolioRepository,
    U: UserStatusPort,
    C: CachePort,
    E: EventPublisherPort,
{
    let status = state.engine.deposit(dto).await?;
    Ok(Json(status))
}

/// Record a withdrawal.
async fn process_withdraw<R, U, C, E>(
    State(state): State<AppState<R, U, C, E>>,
    Json(dto): Json<WithdrawDto>,
) -> Result<Json<ProcessingStatus>, ApiError>
where
    R: PortfolioRepository,
    U: UserStatusPort,
    C: CachePort,
    E: EventPublisherPort,
{
    let status = state.engine.withdraw(dto).await?;
    Ok(Json(status))
}

/// Execute a trade.
async fn process_trade<R, U, C, E>(
    State(state): State<AppState<R, U, C, E>>,
    Json(dto): Json<TradeDto>,
) -> Result<Json<ProcessingStatus>, ApiError>
where
    R: PortfolioRepository,
    U: UserStatusPort,
    C: CachePort,
    E: EventPublisherPort,
{
    let status = state.engine.process_trade(dto).await?;
    Ok(Json(status))
}
