//! Application services: the transaction engine and its resilient
//! collaborator wrappers.

mod activity_gate;
mod cache;
mod engine;
mod trade_listener;

pub use activity_gate::UserActivityGate;
pub use cache::{NO_VALUE, ResilientCache};
pub use engine::PortfolioTransactionEngine;
pub use trade_listener::{Acknowledgment, TradeCreatedListener};
