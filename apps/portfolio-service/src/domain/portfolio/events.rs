//! Domain events published after ledger mutations and consumed from the
//! trade stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value_objects::{ActionType, AssetType};
use crate::domain::shared::{PortfolioId, Quantity, UserId};

/// Notification that a portfolio's asset set changed.
///
/// Constructed once per successful mutation, handed to the event publisher
/// and never referenced again. The `have` side is what the portfolio
/// gained, the `owes` side what it gave up; deposit and withdraw fill the
/// empty side with the action label and a zero value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioUpdatedEvent {
    /// Mutated portfolio.
    pub portfolio_id: PortfolioId,
    /// Owning user.
    pub user_id: UserId,
    /// Name on the gained side.
    pub have_name: String,
    /// Quantity on the gained side.
    pub have_value: Quantity,
    /// Name on the given-up side.
    pub owes_name: String,
    /// Quantity on the given-up side.
    pub owes_value: Quantity,
    /// When the mutation was committed.
    pub timestamp: DateTime<Utc>,
    /// Which operation produced the event.
    pub action_type: ActionType,
}

impl PortfolioUpdatedEvent {
    /// Event for a deposit of `quantity` units of `asset_name`.
    #[must_use]
    pub fn deposit(
        portfolio_id: PortfolioId,
        user_id: UserId,
        asset_name: String,
        quantity: Quantity,
    ) -> Self {
        Self {
            portfolio_id,
            user_id,
            have_name: asset_name,
            have_value: quantity,
            owes_name: ActionType::Deposit.label().to_string(),
            owes_value: Quantity::ZERO,
            timestamp: Utc::now(),
            action_type: ActionType::Deposit,
        }
    }

    /// Event for a withdrawal of `quantity` units of `asset_name`.
    #[must_use]
    pub fn withdraw(
        portfolio_id: PortfolioId,
        user_id: UserId,
        asset_name: String,
        quantity: Quantity,
    ) -> Self {
        Self {
            portfolio_id,
            user_id,
            have_name: ActionType::Withdraw.label().to_string(),
            have_value: Quantity::ZERO,
            owes_name: asset_name,
            owes_value: quantity,
            timestamp: Utc::now(),
            action_type: ActionType::Withdraw,
        }
    }

    /// Event for a trade that bought `bought` units against `paid` units.
    #[must_use]
    pub fn trade(
        portfolio_id: PortfolioId,
        user_id: UserId,
        bought_name: String,
        bought_value: Quantity,
        paid_name: String,
        paid_value: Quantity,
    ) -> Self {
        Self {
            portfolio_id,
            user_id,
            have_name: bought_name,
            have_value: bought_value,
            owes_name: paid_name,
            owes_value: paid_value,
            timestamp: Utc::now(),
            action_type: ActionType::Trade,
        }
    }
}

/// Trade request delivered over the event stream.
///
/// Redelivered at-least-once by the broker; acknowledged only after the
/// engine successfully completes the trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeCreatedEvent {
    /// Trading user.
    pub user_id: i64,
    /// Asset paid away.
    pub asset_to_pay: String,
    /// Amount paid away.
    pub amount_to_pay: rust_decimal::Decimal,
    /// Asset bought.
    pub asset_to_buy: String,
    /// Amount bought.
    pub amount_bought: rust_decimal::Decimal,
    /// Asset class addressing the portfolio.
    pub asset_type: AssetType,
    /// Exchange addressing the portfolio.
    pub exchange_name: String,
}
