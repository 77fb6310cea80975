//! Shared domain value objects.

mod identifiers;
mod quantity;

pub use identifiers::{PortfolioId, UserId};
pub use quantity::{Quantity, QuantityError};
