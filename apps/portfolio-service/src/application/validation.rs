//! Request validators.
//!
//! Each validator inspects every rule and reports ALL violations, not just
//! the first; the engine joins them into one error message. On success the
//! validated, fully-typed request is returned so the engine never touches
//! optional fields again.

use crate::domain::portfolio::AssetType;
use crate::domain::shared::{PortfolioId, Quantity, UserId};

use super::dto::{PortfolioDto, TradeDto};

/// Separator used when joining violation messages.
pub const DELIMITER: &str = ", ";

/// A portfolio-creation request with every rule checked.
#[derive(Debug, Clone)]
pub struct ValidPortfolioRequest {
    /// Provided document id, if any.
    pub id: Option<PortfolioId>,
    /// Owning user.
    pub user_id: UserId,
    /// Asset class.
    pub portfolio_type: AssetType,
    /// Exchange/venue label.
    pub exchange_name: String,
}

/// Validate a portfolio-creation request.
///
/// # Errors
///
/// Returns every violated rule when any field is missing or malformed.
pub fn validate_portfolio_dto(dto: &PortfolioDto) -> Result<ValidPortfolioRequest, Vec<String>> {
    let mut violations = Vec::new();

    if dto.user_id.is_none() {
        violations.push("UserId cannot be null".to_string());
    }
    if dto.portfolio_type.is_none() {
        violations.push("PortfolioType cannot be null".to_string());
    }
    if dto.exchange_name.as_deref().is_none_or(str::is_empty) {
        violations.push("ExchangeName cannot be null or empty".to_string());
    }

    if !violations.is_empty() {
        return Err(violations);
    }

    Ok(ValidPortfolioRequest {
        id: dto.id.clone().map(PortfolioId::new),
        user_id: UserId::new(dto.user_id.unwrap_or_default()),
        portfolio_type: dto.portfolio_type.unwrap_or(AssetType::Crypto),
        exchange_name: dto.exchange_name.clone().unwrap_or_default(),
    })
}

/// A trade request with every rule checked.
#[derive(Debug, Clone)]
pub struct ValidTradeRequest {
    /// Trading user.
    pub user_id: UserId,
    /// Asset paid away.
    pub asset_to_pay: String,
    /// Amount paid away, strictly positive.
    pub amount_to_pay: Quantity,
    /// Asset bought.
    pub asset_to_buy: String,
    /// Amount bought, strictly positive.
    pub amount_bought: Quantity,
    /// Asset class addressing the portfolio.
    pub asset_type: AssetType,
    /// Exchange addressing the portfolio.
    pub exchange_name: String,
}

/// Validate a trade request: all seven fields present, both amounts
/// strictly positive.
///
/// # Errors
///
/// Returns every violated rule.
pub fn validate_trade_dto(dto: &TradeDto) -> Result<ValidTradeRequest, Vec<String>> {
    let mut violations = Vec::new();

    if dto.user_id.is_none() {
        violations.push("UserId cannot be null".to_string());
    }
    if dto.asset_to_pay.as_deref().is_none_or(str::is_empty) {
        violations.push("AssetToPay cannot be null or empty".to_string());
    }
    if dto
        .amount_to_pay
        .is_none_or(|amount| amount <= rust_decimal::Decimal::ZERO)
    {
        violations.push("AmountToPay cannot be null or less or equal to 0".to_string());
    }
    if dto.asset_to_buy.as_deref().is_none_or(str::is_empty) {
        violations.push("AssetToBuy cannot be null or empty".to_string());
    }
    if dto
        .amount_bought
        .is_none_or(|amount| amount <= rust_decimal::Decimal::ZERO)
    {
        violations.push("AmountBought cannot be null or less or equal to 0".to_string());
    }
    if dto.asset_type.is_none() {
        violations.push("AssetType cannot be null".to_string());
    }
    if dto.exchange_name.as_deref().is_none_or(str::is_empty) {
        violations.push("ExchangeName cannot be null or empty".to_string());
    }

    if !violations.is_empty() {
        return Err(violations);
    }

    Ok(ValidTradeRequest {
        user_id: UserId::new(dto.user_id.unwrap_or_default()),
        asset_to_pay: dto.asset_to_pay.clone().unwrap_or_default(),
        amount_to_pay: Quantity::new(dto.amount_to_pay.unwrap_or_default()),
        asset_to_buy: dto.asset_to_buy.clone().unwrap_or_default(),
        amount_bought: Quantity::new(dto.amount_bought.unwrap_or_default()),
        asset_type: dto.asset_type.unwrap_or(AssetType::Crypto),
        exchange_name: dto.exchange_name.clone().unwrap_or_default(),
    })
}
