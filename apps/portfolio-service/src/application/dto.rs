//! Data transfer objects for the API and event-stream boundaries.
//!
//! Portfolio-creation and trade requests carry optional fields so that
//! every missing or malformed field can be reported at once by the
//! validators; deposit and withdraw requests are rejected by serde at the
//! boundary when fields are absent.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::portfolio::{Asset, AssetType, Portfolio, TradeCreatedEvent};
use crate::domain::shared::UserId;

/// Request/response body for a portfolio.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDto {
    /// Document id; absent on creation, assigned by the store.
    #[serde(default)]
    pub id: Option<String>,
    /// Owning user.
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Asset class of the portfolio.
    #[serde(default)]
    pub portfolio_type: Option<AssetType>,
    /// Exchange/venue label.
    #[serde(default)]
    pub exchange_name: Option<String>,
    /// Asset balances; empty on creation.
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl PortfolioDto {
    /// Build a response DTO from the aggregate.
    #[must_use]
    pub fn from_portfolio(portfolio: &Portfolio) -> Self {
        Self {
            id: Some(portfolio.id().as_str().to_string()),
            user_id: Some(portfolio.user_id().value()),
            portfolio_type: Some(portfolio.portfolio_type()),
            exchange_name: Some(portfolio.exchange().to_string()),
            assets: portfolio.assets().to_vec(),
        }
    }
}

/// Deposit request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositDto {
    /// Target portfolio.
    pub portfolio_id: String,
    /// Owning user.
    pub user_id: i64,
    /// Asset to credit.
    pub asset_name: String,
    /// Amount to credit; must be non-negative.
    pub quantity: Decimal,
    /// Asset class of the credited asset.
    pub asset_type: AssetType,
}

/// Withdrawal request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawDto {
    /// Target portfolio.
    pub portfolio_id: String,
    /// Owning user.
    pub user_id: i64,
    /// Asset to debit.
    pub asset_name: String,
    /// Amount to debit.
    pub quantity_to_withdraw: Decimal,
    /// Asset class of the debited asset.
    pub asset_type: AssetType,
}

/// Trade request; addresses the portfolio by (user, type, exchange).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeDto {
    /// Trading user.
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Asset paid away.
    #[serde(default)]
    pub asset_to_pay: Option<String>,
    /// Amount paid away; must be strictly positive.
    #[serde(default)]
    pub amount_to_pay: Option<Decimal>,
    /// Asset bought.
    #[serde(default)]
    pub asset_to_buy: Option<String>,
    /// Amount bought; must be strictly positive.
    #[serde(default)]
    pub amount_bought: Option<Decimal>,
    /// Asset class addressing the portfolio.
    #[serde(default)]
    pub asset_type: Option<AssetType>,
    /// Exchange addressing the portfolio.
    #[serde(default)]
    pub exchange_name: Option<String>,
}

impl From<TradeCreatedEvent> for TradeDto {
    fn from(event: TradeCreatedEvent) -> Self {
        Self {
            user_id: Some(event.user_id),
            asset_to_pay: Some(event.asset_to_pay),
            amount_to_pay: Some(event.amount_to_pay),
            asset_to_buy: Some(event.asset_to_buy),
            amount_bought: Some(event.amount_bought),
            asset_type: Some(event.asset_type),
            exchange_name: Some(event.exchange_name),
        }
    }
}

/// User record fetched from the external user service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    /// User id.
    #[serde(default)]
    pub user_id: i64,
    /// Login name.
    #[serde(default)]
    pub username: Option<String>,
    /// First name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Date of birth.
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    /// Activity flag; `None` means the record is malformed, which is a
    /// validation failure distinct from a transport failure.
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl UserDto {
    /// Deterministic fallback record for an unresolvable user.
    ///
    /// Inactive, never active: an unknown status must fail closed.
    #[must_use]
    pub fn unknown(user_id: UserId) -> Self {
        Self {
            user_id: user_id.value(),
            username: Some("Unknown".to_string()),
            first_name: Some("Unknown".to_string()),
            last_name: Some("Unknown".to_string()),
            email: Some("Unknown".to_string()),
            birthday: None,
            is_active: Some(false),
        }
    }
}
