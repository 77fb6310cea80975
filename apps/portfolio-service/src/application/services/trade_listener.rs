//! Trade-created stream listener.
//!
//! Processes trade requests redelivered at-least-once by the broker. A
//! message is acknowledged only after the engine completes the trade;
//! a processing failure leaves the message unacknowledged so the broker
//! redelivers it.

use std::sync::Arc;

use crate::application::dto::TradeDto;
use crate::application::ports::{CachePort, EventPublisherPort, UserStatusPort};
use crate::domain::portfolio::{
    PortfolioError, PortfolioRepository, ProcessingStatus, TradeCreatedEvent,
};

use super::engine::PortfolioTransactionEngine;

/// Handle used to acknowledge a delivered message.
///
/// Implemented by the broker adapter; consumed exactly once.
pub trait Acknowledgment: Send {
    /// Mark the message as processed so it is not redelivered.
    fn acknowledge(self: Box<Self>);
}

/// Listener feeding redelivered trade-created events into the engine.
pub struct TradeCreatedListener<R, U, C, E>
where
    R: PortfolioRepository,
    U: UserStatusPort,
    C: CachePort,
    E: EventPublisherPort,
{
    engine: Arc<PortfolioTransactionEngine<R, U, C, E>>,
}

impl<R, U, C, E> TradeCreatedListener<R, U, C, E>
where
    R: PortfolioRepository,
    U: UserStatusPort,
    C: CachePort,
    E: EventPublisherPort,
{
    /// Create a listener over the shared engine.
    #[must_use]
    pub const fn new(engine: Arc<PortfolioTransactionEngine<R, U, C, E>>) -> Self {
        Self { engine }
    }

    /// Process one delivered event, acknowledging only on success.
    ///
    /// # Errors
    ///
    /// Propagates the engine error without acknowledging, causing
    /// broker-level redelivery.
    pub async fn on_trade_created(
        &self,
        event: TradeCreatedEvent,
        ack: Box<dyn Acknowledgment>,
    ) -> Result<ProcessingStatus, PortfolioError> {
        tracing::info!(user_id = event.user_id, "Received an event for processing");

        match self.engine.process_trade(TradeDto::from(event)).await {
            Ok(status) => {
                ack.acknowledge();
                Ok(status)
            }
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    "Processing an event failed, message will be redelivered"
                );
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::{PortfolioDto, UserDto};
    use crate::application::ports::{NoOpEventPublisher, UserStatusError, UserStatusPort};
    use crate::domain::portfolio::AssetType;
    use crate::domain::shared::UserId;
    use crate::infrastructure::cache::InMemoryCache;
    use crate::infrastructure::persistence::InMemoryPortfolioRepository;
    use crate::resilience::ResilienceRegistry;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    struct ActiveUserService;

    #[async_trait]
    impl UserStatusPort for ActiveUserService {
        async fn fetch_user(&self, user_id: UserId) -> Result<UserDto, UserStatusError> {
            Ok(UserDto {
                is_active: Some(true),
                ..UserDto::unknown(user_id)
            })
        }
    }

    struct AckProbe {
        acked: Arc<AtomicBool>,
    }

    impl Acknowledgment for AckProbe {
        fn acknowledge(self: Box<Self>) {
            self.acked.store(true, Ordering::SeqCst);
        }
    }

    type TestEngine = PortfolioTransactionEngine<
        InMemoryPortfolioRepository,
        ActiveUserService,
        InMemoryCache,
        NoOpEventPublisher,
    >;

    async fn engine_with_funded_portfolio() -> Arc<TestEngine> {
        let engine = Arc::new(PortfolioTransactionEngine::new(
            Arc::new(InMemoryPortfolioRepository::new()),
            Arc::new(ActiveUserService),
            Arc::new(InMemoryCache::new()),
            Arc::new(NoOpEventPublisher),
            &ResilienceRegistry::with_defaults(),
            Duration::from_secs(120),
        ));

        engine
            .create_portfolio(PortfolioDto {
                id: Some("pf-1".to_string()),
                user_id: Some(1),
                portfolio_type: Some(AssetType::Crypto),
                exchange_name: Some("kraken".to_string()),
                assets: Vec::new(),
            })
            .await
            .unwrap();
        engine
            .deposit(crate::application::dto::DepositDto {
                portfolio_id: "pf-1".to_string(),
                user_id: 1,
                asset_name: "USD".to_string(),
                quantity: dec!(100),
                asset_type: AssetType::Crypto,
            })
            .await
            .unwrap();

        engine
    }

    fn trade_event(amount_to_pay: rust_decimal::Decimal) -> TradeCreatedEvent {
        TradeCreatedEvent {
            user_id: 1,
            asset_to_pay: "USD".to_string(),
            amount_to_pay,
            asset_to_buy: "BTC".to_string(),
            amount_bought: dec!(0.01),
            asset_type: AssetType::Crypto,
            exchange_name: "kraken".to_string(),
        }
    }

    #[tokio::test]
    async fn successful_trade_is_acknowledged() {
        let engine = engine_with_funded_portfolio().await;
        let listener = TradeCreatedListener::new(engine);

        let acked = Arc::new(AtomicBool::new(false));
        let result = listener
            .on_trade_created(
                trade_event(dec!(5)),
                Box::new(AckProbe {
                    acked: Arc::clone(&acked),
                }),
            )
            .await;

        assert_eq!(result.unwrap(), ProcessingStatus::Success);
        assert!(acked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn failed_trade_is_not_acknowledged() {
        let engine = engine_with_funded_portfolio().await;
        let listener = TradeCreatedListener::new(engine);

        let acked = Arc::new(AtomicBool::new(false));
        let result = listener
            .on_trade_created(
                // More than the funded balance
                trade_event(dec!(500)),
                Box::new(AckProbe {
                    acked: Arc::clone(&acked),
                }),
            )
            .await;

        assert!(matches!(
            result,
            Err(PortfolioError::InsufficientQuantity { .. })
        ));
        // Unacknowledged: the broker will redeliver
        assert!(!acked.load(Ordering::SeqCst));
    }
}
