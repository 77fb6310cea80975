//! End-to-end flows through the engine and the HTTP router with
//! in-memory adapters.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use rust_decimal_macros::dec;
use tower::ServiceExt;

use portfolio_service::UserDto;
use portfolio_service::application::dto::{DepositDto, PortfolioDto, TradeDto, WithdrawDto};
use portfolio_service::application::ports::{NoOpEventPublisher, UserStatusError, UserStatusPort};
use portfolio_service::application::services::PortfolioTransactionEngine;
use portfolio_service::domain::portfolio::{
    AssetType, PortfolioError, PortfolioRepository, ProcessingStatus,
};
use portfolio_service::domain::shared::{PortfolioId, UserId};
use portfolio_service::infrastructure::cache::InMemoryCache;
use portfolio_service::infrastructure::http::{AppState, create_router};
use portfolio_service::infrastructure::persistence::InMemoryPortfolioRepository;
use portfolio_service::resilience::ResilienceRegistry;

/// User service whose availability can be toggled mid-test.
struct ToggleUserService {
    down: AtomicBool,
}

impl ToggleUserService {
    fn up() -> Self {
        Self {
            down: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl UserStatusPort for ToggleUserService {
    async fn fetch_user(&self, user_id: UserId) -> Result<UserDto, UserStatusError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(UserStatusError::Unreachable {
                message: "connection refused".to_string(),
            });
        }
        Ok(UserDto {
            is_active: Some(true),
            ..UserDto::unknown(user_id)
        })
    }
}

type Engine = PortfolioTransactionEngine<
    InMemoryPortfolioRepository,
    ToggleUserService,
    InMemoryCache,
    NoOpEventPublisher,
>;

struct Harness {
    repository: Arc<InMemoryPortfolioRepository>,
    users: Arc<ToggleUserService>,
    cache: Arc<InMemoryCache>,
    engine: Arc<Engine>,
}

fn harness() -> Harness {
    let repository = Arc::new(InMemoryPortfolioRepository::new());
    let users = Arc::new(ToggleUserService::up());
    let cache = Arc::new(InMemoryCache::new());
    let engine = Arc::new(PortfolioTransactionEngine::new(
        Arc::clone(&repository),
        Arc::clone(&users),
        Arc::clone(&cache),
        Arc::new(NoOpEventPublisher),
        &ResilienceRegistry::with_defaults(),
        Duration::from_secs(120),
    ));
    Harness {
        repository,
        users,
        cache,
        engine,
    }
}

fn portfolio_dto(id: &str, user: i64, exchange: &str) -> PortfolioDto {
    PortfolioDto {
        id: Some(id.to_string()),
        user_id: Some(user),
        portfolio_type: Some(AssetType::Crypto),
        exchange_name: Some(exchange.to_string()),
        assets: Vec::new(),
    }
}

fn deposit(id: &str, user: i64, asset: &str, quantity: rust_decimal::Decimal) -> DepositDto {
    DepositDto {
        portfolio_id: id.to_string(),
        user_id: user,
        asset_name: asset.to_string(),
        quantity,
        asset_type: AssetType::Crypto,
    }
}

fn withdraw(id: &str, user: i64, asset: &str, quantity: rust_decimal::Decimal) -> WithdrawDto {
    WithdrawDto {
        portfolio_id: id.to_string(),
        user_id: user,
        asset_name: asset.to_string(),
        quantity_to_withdraw: quantity,
        asset_type: AssetType::Crypto,
    }
}

async fn quantity_of(
    repository: &InMemoryPortfolioRepository,
    id: &str,
    asset: &str,
) -> Option<rust_decimal::Decimal> {
    repository
        .find_by_id(&PortfolioId::new(id))
        .await
        .unwrap()
        .and_then(|p| p.find_asset(asset).map(|a| a.quantity.amount()))
}

#[tokio::test]
async fn deposit_withdraw_scenario_is_decimal_exact() {
    let h = harness();
    h.engine
        .create_portfolio(portfolio_dto("pf-1", 1, "binance"))
        .await
        .unwrap();

    // Deposit 10 ETH into the empty portfolio
    h.engine.deposit(deposit("pf-1", 1, "ETH", dec!(10))).await.unwrap();
    assert_eq!(quantity_of(&h.repository, "pf-1", "ETH").await, Some(dec!(10)));

    // Withdraw 3 "eth" (case-insensitive) -> 7
    h.engine.withdraw(withdraw("pf-1", 1, "eth", dec!(3))).await.unwrap();
    assert_eq!(quantity_of(&h.repository, "pf-1", "ETH").await, Some(dec!(7)));

    // Withdraw 10 "eth" -> fails, balance still 7
    let err = h
        .engine
        .withdraw(withdraw("pf-1", 1, "eth", dec!(10)))
        .await
        .unwrap_err();
    assert!(matches!(err, PortfolioError::InsufficientQuantity { .. }));
    assert_eq!(quantity_of(&h.repository, "pf-1", "ETH").await, Some(dec!(7)));
}

#[tokio::test]
async fn trade_pays_and_creates_buy_asset() {
    let h = harness();
    h.engine
        .create_portfolio(portfolio_dto("pf-1", 1, "kraken"))
        .await
        .unwrap();
    h.engine.deposit(deposit("pf-1", 1, "USD", dec!(20))).await.unwrap();

    let status = h
        .engine
        .process_trade(TradeDto {
            user_id: Some(1),
            asset_to_pay: Some("USD".to_string()),
            amount_to_pay: Some(dec!(5)),
            asset_to_buy: Some("BTC".to_string()),
            amount_bought: Some(dec!(0.01)),
            asset_type: Some(AssetType::Crypto),
            exchange_name: Some("kraken".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(status, ProcessingStatus::Success);
    assert_eq!(quantity_of(&h.repository, "pf-1", "USD").await, Some(dec!(15)));
    assert_eq!(quantity_of(&h.repository, "pf-1", "BTC").await, Some(dec!(0.01)));
}

#[tokio::test]
async fn duplicate_portfolio_for_same_market_is_rejected() {
    let h = harness();
    h.engine
        .create_portfolio(portfolio_dto("pf-1", 1, "binance"))
        .await
        .unwrap();

    let err = h
        .engine
        .create_portfolio(portfolio_dto("pf-2", 1, "binance"))
        .await
        .unwrap_err();
    assert!(matches!(err, PortfolioError::PortfolioAlreadyExists { .. }));
}

#[tokio::test]
async fn user_service_outage_blocks_mutations_fail_closed() {
    let h = harness();
    h.engine
        .create_portfolio(portfolio_dto("pf-1", 1, "binance"))
        .await
        .unwrap();
    h.engine.deposit(deposit("pf-1", 1, "ETH", dec!(5))).await.unwrap();

    // Take the user service down for a user whose flag was never cached
    h.users.down.store(true, Ordering::SeqCst);

    let err = h
        .engine
        .deposit(deposit("pf-1", 2, "ETH", dec!(1)))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        PortfolioError::UserNotActive {
            user_id: UserId::new(2)
        }
    );
    // The failed mutation left the stored balance untouched
    assert_eq!(quantity_of(&h.repository, "pf-1", "ETH").await, Some(dec!(5)));
}

#[tokio::test]
async fn cache_outage_never_breaks_requests() {
    let h = harness();
    h.engine
        .create_portfolio(portfolio_dto("pf-1", 1, "binance"))
        .await
        .unwrap();

    // Cache down: activity lookups fall through to the live service
    h.cache.fail();

    let status = h
        .engine
        .deposit(deposit("pf-1", 1, "ETH", dec!(2)))
        .await
        .unwrap();
    assert_eq!(status, ProcessingStatus::Success);
}

#[tokio::test]
async fn full_http_round_trip() {
    let h = harness();
    let app = create_router(AppState {
        engine: Arc::clone(&h.engine),
        version: "test".to_string(),
    });

    // Create
    let create = serde_json::json!({
        "id": "pf-http",
        "userId": 4,
        "portfolioType": "CRYPTO",
        "exchangeName": "binance"
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/assetflow/portfolios")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&create).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Deposit
    let deposit_body = serde_json::json!({
        "portfolioId": "pf-http",
        "userId": 4,
        "assetName": "ETH",
        "quantity": "10",
        "assetType": "CRYPTO"
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/assetflow/portfolios/deposit")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&deposit_body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"\"SUCCESS\"");

    // Withdraw more than the balance -> 400 with a descriptive message
    let over_withdraw = serde_json::json!({
        "portfolioId": "pf-http",
        "userId": 4,
        "assetName": "eth",
        "quantityToWithdraw": "100",
        "assetType": "CRYPTO"
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/assetflow/portfolios/withdraw")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&over_withdraw).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let message = String::from_utf8(body.to_vec()).unwrap();
    assert!(message.contains("not enough quantity"));

    // Fetch
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/assetflow/portfolios/pf-http")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let dto: PortfolioDto = serde_json::from_slice(&body).unwrap();
    assert_eq!(dto.assets.len(), 1);
    assert_eq!(dto.assets[0].quantity.amount(), dec!(10));

    // Delete, then the fetch body is null
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/v1/assetflow/portfolios/pf-http")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/assetflow/portfolios/pf-http")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"null");
}
