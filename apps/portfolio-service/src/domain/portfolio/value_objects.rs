//! Value objects for the portfolio aggregate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Asset class a portfolio (or a single asset) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    /// Cryptocurrencies.
    Crypto,
    /// Listed equities.
    Stock,
    /// Exchange-traded funds.
    Etf,
    /// Fixed income.
    Bond,
    /// Fiat currencies.
    Fiat,
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Crypto => write!(f, "CRYPTO"),
            Self::Stock => write!(f, "STOCK"),
            Self::Etf => write!(f, "ETF"),
            Self::Bond => write!(f, "BOND"),
            Self::Fiat => write!(f, "FIAT"),
        }
    }
}

/// Kind of ledger mutation carried by a portfolio-updated event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    /// Asset deposited into a portfolio.
    Deposit,
    /// Asset withdrawn from a portfolio.
    Withdraw,
    /// One asset swapped for another.
    Trade,
}

impl ActionType {
    /// Upper-case wire label, also used as the placeholder asset name on
    /// the empty side of deposit/withdraw events.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Withdraw => "WITHDRAW",
            Self::Trade => "TRADE",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Outcome reported to callers of a successful mutation operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingStatus {
    /// The mutation was validated, applied and persisted.
    Success,
}
