//! Domain errors for portfolio operations.
//!
//! Validation and domain-rule failures are client errors and carry the
//! offending identifiers; `ExternalUnavailable` is the terminal failure of
//! a resilience-wrapped call with no safe fallback and maps to a server
//! error without leaking internals.

use crate::domain::shared::UserId;

use super::value_objects::AssetType;

/// Errors raised by the transaction engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortfolioError {
    /// Malformed or missing request fields; all violations joined, not
    /// just the first.
    #[error("{message}")]
    Validation {
        /// Joined violation messages.
        message: String,
    },

    /// The owning user is inactive (or unresolvable, which is treated
    /// identically).
    #[error("User with id: [{user_id}] is not active")]
    UserNotActive {
        /// Offending user.
        user_id: UserId,
    },

    /// The user record resolved but its activity flag was absent.
    #[error(
        "Error occurred when fetching user data for user with id: [{user_id}], \
         user record is missing the activity flag"
    )]
    UserDataInvalid {
        /// Offending user.
        user_id: UserId,
    },

    /// No portfolio with the given id exists for the user.
    #[error(
        "Error occurred when fetching portfolio with id: [{portfolio_id}] for user \
         with id: [{user_id}], portfolio not present"
    )]
    PortfolioNotFound {
        /// Requested portfolio id.
        portfolio_id: String,
        /// Requesting user.
        user_id: UserId,
    },

    /// No portfolio for the (user, type, exchange) triple exists.
    #[error(
        "Error occurred when fetching portfolio type: [{portfolio_type}] in exchange: \
         [{exchange}] for user with id: [{user_id}], portfolio not present"
    )]
    PortfolioNotFoundForMarket {
        /// Requested asset class.
        portfolio_type: AssetType,
        /// Requested exchange.
        exchange: String,
        /// Requesting user.
        user_id: UserId,
    },

    /// A portfolio for the (user, type, exchange) triple already exists.
    #[error(
        "Portfolio for user with id: [{user_id}] with portfolio type: \
         [{portfolio_type}] for exchange: [{exchange}] already present"
    )]
    PortfolioAlreadyExists {
        /// Owning user.
        user_id: UserId,
        /// Asset class of the duplicate.
        portfolio_type: AssetType,
        /// Exchange of the duplicate.
        exchange: String,
    },

    /// The named asset is absent from the portfolio.
    #[error(
        "Error occurred when fetching asset: [{asset_name}] from portfolio with id: \
         [{portfolio_id}], asset not present in portfolio"
    )]
    AssetNotFound {
        /// Requested asset name.
        asset_name: String,
        /// Portfolio that was searched.
        portfolio_id: String,
    },

    /// The asset's balance is smaller than the requested amount.
    #[error(
        "Error occurred when performing transaction on asset: [{asset_name}] for user \
         with id: [{user_id}], not enough quantity present in the portfolio"
    )]
    InsufficientQuantity {
        /// Asset whose balance was insufficient.
        asset_name: String,
        /// Owning user.
        user_id: UserId,
    },

    /// Terminal failure of an external dependency with no safe fallback.
    #[error("External dependency unavailable: {message}")]
    ExternalUnavailable {
        /// What failed, for logs; not exposed to clients.
        message: String,
    },
}

impl PortfolioError {
    /// Whether the error is the caller's fault (HTTP 400 class) rather
    /// than a server-side failure.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::ExternalUnavailable { .. })
    }
}
