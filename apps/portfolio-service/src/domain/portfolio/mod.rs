//! Portfolio bounded context: aggregate, value objects, events, errors and
//! the persistence port.

mod aggregate;
mod errors;
mod events;
mod repository;
mod value_objects;

pub use aggregate::{Asset, LedgerError, Portfolio, UpsertOutcome};
pub use errors::PortfolioError;
pub use events::{PortfolioUpdatedEvent, TradeCreatedEvent};
pub use repository::{PortfolioRepository, RepositoryError};
pub use value_objects::{ActionType, AssetType, ProcessingStatus};
