//! Portfolio aggregate: a user's asset balances for one (type, exchange)
//! pair, with the ledger primitives shared by deposit, withdraw and both
//! legs of a trade.
//!
//! # Invariants
//!
//! - No asset quantity is negative after a committed mutation.
//! - An asset name appears at most once per portfolio; names are matched
//!   case-insensitively, so "BTC" and "btc" address the same balance.

use serde::{Deserialize, Serialize};

use super::value_objects::AssetType;
use crate::domain::shared::{PortfolioId, Quantity, QuantityError, UserId};

/// A named balance held within a portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Asset name as first deposited (original casing preserved).
    pub name: String,
    /// Current balance.
    pub quantity: Quantity,
    /// Asset class tag.
    pub asset_type: AssetType,
}

impl Asset {
    /// Create a new asset entry.
    #[must_use]
    pub const fn new(name: String, quantity: Quantity, asset_type: AssetType) -> Self {
        Self {
            name,
            quantity,
            asset_type,
        }
    }
}

/// Failure of a ledger primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// No asset with the given name exists in the portfolio.
    AssetNotFound,
    /// The asset's balance is smaller than the requested decrease.
    Insufficient,
    /// The amount passed to a mutation was negative.
    NegativeAmount,
}

/// Whether an upsert appended a new asset or increased an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new asset entry was appended with the initial amount.
    Created,
    /// An existing asset's balance was increased.
    Increased,
}

/// A user's collection of asset balances for one (type, exchange) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    id: PortfolioId,
    user_id: UserId,
    portfolio_type: AssetType,
    exchange: String,
    assets: Vec<Asset>,
}

impl Portfolio {
    /// Create a portfolio with an empty asset set.
    #[must_use]
    pub const fn new(
        id: PortfolioId,
        user_id: UserId,
        portfolio_type: AssetType,
        exchange: String,
    ) -> Self {
        Self {
            id,
            user_id,
            portfolio_type,
            exchange,
            assets: Vec::new(),
        }
    }

    /// Portfolio id.
    #[must_use]
    pub const fn id(&self) -> &PortfolioId {
        &self.id
    }

    /// Owning user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Asset class this portfolio holds.
    #[must_use]
    pub const fn portfolio_type(&self) -> AssetType {
        self.portfolio_type
    }

    /// Exchange/venue label.
    #[must_use]
    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    /// All asset entries.
    #[must_use]
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Find an asset by name, case-insensitively.
    #[must_use]
    pub fn find_asset(&self, name: &str) -> Option<&Asset> {
        self.assets
            .iter()
            .find(|asset| asset.name.eq_ignore_ascii_case(name))
    }

    /// Add `amount` to the named asset, appending a new entry when absent.
    ///
    /// Used by deposit and by the buy leg of a trade.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NegativeAmount` if `amount` is negative; the
    /// asset set is left unchanged.
    pub fn upsert_asset(
        &mut self,
        name: &str,
        amount: Quantity,
        asset_type: AssetType,
    ) -> Result<UpsertOutcome, LedgerError> {
        if amount.is_negative() {
            return Err(LedgerError::NegativeAmount);
        }

        match self
            .assets
            .iter_mut()
            .find(|asset| asset.name.eq_ignore_ascii_case(name))
        {
            Some(asset) => {
                asset
                    .quantity
                    .checked_increase(amount)
                    .map_err(|_| LedgerError::NegativeAmount)?;
                Ok(UpsertOutcome::Increased)
            }
            None => {
                self.assets
                    .push(Asset::new(name.to_string(), amount, asset_type));
                Ok(UpsertOutcome::Created)
            }
        }
    }

    /// Subtract `amount` from the named asset.
    ///
    /// Used by withdraw and by the pay leg of a trade.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AssetNotFound` when the asset is absent and
    /// `LedgerError::Insufficient` when the balance is smaller than
    /// `amount`; the stored balance is unchanged on failure.
    pub fn decrease_asset(&mut self, name: &str, amount: Quantity) -> Result<(), LedgerError> {
        let asset = self
            .assets
            .iter_mut()
            .find(|asset| asset.name.eq_ignore_ascii_case(name))
            .ok_or(LedgerError::AssetNotFound)?;

        asset.quantity.checked_decrease(amount).map_err(|e| match e {
            QuantityError::Insufficient => LedgerError::Insufficient,
            QuantityError::NegativeAmount => LedgerError::NegativeAmount,
        })
    }
}
