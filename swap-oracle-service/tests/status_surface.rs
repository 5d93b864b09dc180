//! Integration tests for the read-only status HTTP surface, driven
//! directly against [`AppState`] rather than through [`swap_oracle_service::builder::start`]
//! so they never touch a real RPC endpoint.

use std::{path::PathBuf, sync::Arc, sync::atomic::AtomicU64};

use alloy::primitives::{Address, U256};
use axum_test::TestServer;
use swap_oracle_chain::client::OnChainTrade;
use swap_oracle_core::{
    SwapCoordinator, coordinator::ChainHandle, dispatcher::TradeDispatcher, metrics::Counters,
};
use swap_oracle_service::state::AppState;
use swap_oracle_test_utils::{
    FakeClock, MockChainClient,
    scenarios::{scenario_trade_id, time_request_event},
};
use swap_oracle_types::{ChainRole, TradeId, TradeState};

const ASSET_CONTRACT: Address = Address::repeat_byte(1);
const PAYMENT_CONTRACT: Address = Address::repeat_byte(2);

async fn test_server() -> (TestServer, Arc<SwapCoordinator<MockChainClient>>) {
    let client = Arc::new(MockChainClient::default());
    let asset_submitter = Arc::new(
        swap_oracle_chain::submitter::TransactionSubmitter::new(
            Arc::clone(&client),
            Address::ZERO,
            200_000,
            3,
        )
        .await
        .unwrap(),
    );
    let payment_submitter = Arc::new(
        swap_oracle_chain::submitter::TransactionSubmitter::new(
            Arc::clone(&client),
            Address::ZERO,
            200_000,
            3,
        )
        .await
        .unwrap(),
    );
    let asset = ChainHandle::new(ChainRole::Asset, ASSET_CONTRACT, asset_submitter);
    let payment = ChainHandle::new(ChainRole::Payment, PAYMENT_CONTRACT, payment_submitter);
    let coordinator = Arc::new(SwapCoordinator::new(
        asset,
        payment,
        Arc::new(FakeClock::new(1_000)),
        Arc::new(Counters::default()),
    ));

    let state = AppState {
        coordinator: Arc::clone(&coordinator),
        asset_last_processed_block: Arc::new(AtomicU64::new(10)),
        payment_last_processed_block: Arc::new(AtomicU64::new(12)),
        asset_client: Arc::clone(&client),
        payment_client: client,
        counters: Arc::new(Counters::default()),
        log_file: PathBuf::from("swap-oracle.log"),
        expose_logs: true,
        started_services: nodes_common::StartedServices::new(),
    };

    let router = swap_oracle_service::api::routes(state);
    (TestServer::new(router).unwrap(), coordinator)
}

#[tokio::test]
async fn health_reports_both_chains_reachable() {
    let (server, _coordinator) = test_server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["healthy"], true);
    assert_eq!(body["asset_chain"]["reachable"], true);
}

#[tokio::test]
async fn status_reports_last_processed_block_and_pairings() {
    let (server, coordinator) = test_server().await;
    let dispatcher = TradeDispatcher::new(Arc::clone(&coordinator));
    let trade_id = scenario_trade_id();

    dispatcher.dispatch(time_request_event(ChainRole::Asset, trade_id, 100, 1));
    dispatcher.dispatch(time_request_event(ChainRole::Payment, trade_id, 100, 2));
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let response = server.get("/status").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["asset_chain"]["last_processed_block"], 10);
    assert_eq!(body["cross_chain_mappings"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn trade_lookup_returns_not_found_for_unknown_id() {
    let (server, _coordinator) = test_server().await;
    let response = server.get("/trade/999").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn trade_lookup_rejects_malformed_id() {
    let (server, _coordinator) = test_server().await;
    let response = server.get("/trade/not-a-number").await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn logs_endpoint_absent_when_not_exposed() {
    let client = Arc::new(MockChainClient::default());
    let asset_submitter = Arc::new(
        swap_oracle_chain::submitter::TransactionSubmitter::new(
            Arc::clone(&client),
            Address::ZERO,
            200_000,
            3,
        )
        .await
        .unwrap(),
    );
    let payment_submitter = Arc::new(
        swap_oracle_chain::submitter::TransactionSubmitter::new(
            Arc::clone(&client),
            Address::ZERO,
            200_000,
            3,
        )
        .await
        .unwrap(),
    );
    let asset = ChainHandle::new(ChainRole::Asset, ASSET_CONTRACT, asset_submitter);
    let payment = ChainHandle::new(ChainRole::Payment, PAYMENT_CONTRACT, payment_submitter);
    let coordinator = Arc::new(SwapCoordinator::new(
        asset,
        payment,
        Arc::new(FakeClock::new(1_000)),
        Arc::new(Counters::default()),
    ));
    let state = AppState {
        coordinator,
        asset_last_processed_block: Arc::new(AtomicU64::new(10)),
        payment_last_processed_block: Arc::new(AtomicU64::new(12)),
        asset_client: Arc::clone(&client),
        payment_client: client,
        counters: Arc::new(Counters::default()),
        log_file: PathBuf::from("swap-oracle.log"),
        expose_logs: false,
        started_services: nodes_common::StartedServices::new(),
    };
    let server = TestServer::new(swap_oracle_service::api::routes(state)).unwrap();
    let response = server.get("/logs").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn trade_lookup_finds_paired_payment_record() {
    let (server, coordinator) = test_server().await;
    let dispatcher = TradeDispatcher::new(Arc::clone(&coordinator));
    let trade_id = scenario_trade_id();

    dispatcher.dispatch(time_request_event(ChainRole::Asset, trade_id, 100, 1));
    dispatcher.dispatch(time_request_event(ChainRole::Payment, trade_id, 100, 2));
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let response = server.get(&format!("/trade/{trade_id}")).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["payment"].is_object());
}

#[tokio::test]
async fn trade_lookup_reads_amount_and_parties_from_chain() {
    let client = Arc::new(MockChainClient::default());
    let asset_submitter = Arc::new(
        swap_oracle_chain::submitter::TransactionSubmitter::new(
            Arc::clone(&client),
            Address::ZERO,
            200_000,
            3,
        )
        .await
        .unwrap(),
    );
    let payment_submitter = Arc::new(
        swap_oracle_chain::submitter::TransactionSubmitter::new(
            Arc::clone(&client),
            Address::ZERO,
            200_000,
            3,
        )
        .await
        .unwrap(),
    );
    let asset = ChainHandle::new(ChainRole::Asset, ASSET_CONTRACT, asset_submitter);
    let payment = ChainHandle::new(ChainRole::Payment, PAYMENT_CONTRACT, payment_submitter);
    let coordinator = Arc::new(SwapCoordinator::new(
        asset,
        payment,
        Arc::new(FakeClock::new(1_000)),
        Arc::new(Counters::default()),
    ));

    let trade_id = TradeId::new(U256::from(7u64));
    let buyer = Address::repeat_byte(0xAA);
    let seller = Address::repeat_byte(0xBB);
    client.set_trade_record(
        ASSET_CONTRACT,
        trade_id,
        ChainRole::Asset,
        OnChainTrade {
            amount: U256::from(500u64),
            buyer,
            seller,
            state: TradeState::Confirmed,
            inception_time: 1_000,
            confirmation_time: 1_100,
            duration: 100,
            asset_trade_id: None,
        },
    );
    client.set_trade_record(
        PAYMENT_CONTRACT,
        trade_id,
        ChainRole::Payment,
        OnChainTrade {
            amount: U256::from(500u64),
            buyer,
            seller,
            state: TradeState::Completed,
            inception_time: 1_000,
            confirmation_time: 1_100,
            duration: 100,
            asset_trade_id: Some(trade_id),
        },
    );

    let state = AppState {
        coordinator,
        asset_last_processed_block: Arc::new(AtomicU64::new(10)),
        payment_last_processed_block: Arc::new(AtomicU64::new(12)),
        asset_client: Arc::clone(&client),
        payment_client: client,
        counters: Arc::new(Counters::default()),
        log_file: PathBuf::from("swap-oracle.log"),
        expose_logs: true,
        started_services: nodes_common::StartedServices::new(),
    };
    let server = TestServer::new(swap_oracle_service::api::routes(state)).unwrap();

    let response = server.get(&format!("/trade/{trade_id}")).await;
    response.assert_status_ok();
    let body: swap_oracle_types::api::v1::TradeView = response.json();
    assert_eq!(body.trade.amount, U256::from(500u64));
    assert_eq!(body.trade.buyer, buyer);
    assert_eq!(body.trade.seller, seller);
    assert_eq!(body.trade.state, TradeState::Confirmed);
    let payment = body.payment.expect("paired payment record");
    assert_eq!(payment.state, TradeState::Completed);
    assert_eq!(payment.asset_trade_id, Some(trade_id));
}
