//! `GET /trade/:id` and `GET /payment/:id` — look up one leg's record,
//! and its paired leg's record if one exists.

use alloy::primitives::U256;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use swap_oracle_chain::client::{ChainClient, OnChainTrade};
use swap_oracle_core::record::TradeRecord as CoreRecord;
use swap_oracle_types::{
    ChainRole, TradeId,
    api::v1::{PaymentView, TradeRecord, TradeView},
};

use crate::state::AppState;

/// Routes for the per-trade and per-payment lookup endpoints.
pub fn routes<C: ChainClient>(state: AppState<C>) -> Router {
    Router::new()
        .route("/trade/{id}", get(trade::<C>))
        .route("/payment/{id}", get(payment::<C>))
        .with_state(state)
}

fn parse_trade_id(raw: &str) -> Result<TradeId, StatusCode> {
    raw.parse::<U256>()
        .map(TradeId::new)
        .map_err(|_| StatusCode::BAD_REQUEST)
}

/// Builds the DTO for `trade_id` from its on-chain record. Falls back
/// to the oracle's local bookkeeping only for the lifecycle phase,
/// which the contract itself already reflects via `state` once the
/// record exists on-chain — the fallback only matters for the brief
/// window between dispatching a `TimeRequestSent` event and the
/// contract view becoming queryable.
fn to_view_record(trade_id: TradeId, on_chain: Option<OnChainTrade>, local: Option<&CoreRecord>) -> Option<TradeRecord> {
    match (on_chain, local) {
        (Some(on_chain), _) => Some(TradeRecord {
            id: trade_id,
            amount: on_chain.amount,
            buyer: on_chain.buyer,
            seller: on_chain.seller,
            state: on_chain.state,
            inception_time: on_chain.inception_time,
            confirmation_time: on_chain.confirmation_time,
            duration: on_chain.duration,
            asset_trade_id: on_chain.asset_trade_id,
        }),
        (None, Some(local)) => Some(TradeRecord {
            id: trade_id,
            amount: U256::ZERO,
            buyer: alloy::primitives::Address::ZERO,
            seller: alloy::primitives::Address::ZERO,
            state: if local.is_confirmation_phase {
                swap_oracle_types::TradeState::Confirmed
            } else {
                swap_oracle_types::TradeState::AwaitingConfirmation
            },
            inception_time: local.inception_time,
            confirmation_time: local.confirmation_time.unwrap_or(0),
            duration: local.duration,
            asset_trade_id: None,
        }),
        (None, None) => None,
    }
}

async fn lookup_trade<C: ChainClient>(
    state: &AppState<C>,
    trade_id: TradeId,
) -> Option<TradeRecord> {
    let local = state.coordinator.table(ChainRole::Asset).get(trade_id);
    let on_chain = state
        .asset_client
        .get_trade(state.coordinator.asset().contract_address, trade_id)
        .await
        .ok()
        .flatten();
    to_view_record(trade_id, on_chain, local.as_ref())
}

async fn lookup_payment<C: ChainClient>(
    state: &AppState<C>,
    trade_id: TradeId,
) -> Option<TradeRecord> {
    let local = state.coordinator.table(ChainRole::Payment).get(trade_id);
    let on_chain = state
        .payment_client
        .get_payment(state.coordinator.payment().contract_address, trade_id)
        .await
        .ok()
        .flatten();
    to_view_record(trade_id, on_chain, local.as_ref())
}

async fn trade<C: ChainClient>(
    State(state): State<AppState<C>>,
    Path(raw_id): Path<String>,
) -> Response {
    let trade_id = match parse_trade_id(&raw_id) {
        Ok(id) => id,
        Err(status) => return (status, "invalid trade id").into_response(),
    };
    match lookup_trade(&state, trade_id).await {
        Some(trade) => {
            let payment = lookup_payment(&state, trade_id).await;
            Json(TradeView { trade, payment }).into_response()
        }
        None => (StatusCode::NOT_FOUND, "unknown trade id").into_response(),
    }
}

async fn payment<C: ChainClient>(
    State(state): State<AppState<C>>,
    Path(raw_id): Path<String>,
) -> Response {
    let trade_id = match parse_trade_id(&raw_id) {
        Ok(id) => id,
        Err(status) => return (status, "invalid payment id").into_response(),
    };
    match lookup_payment(&state, trade_id).await {
        Some(payment) => {
            let trade = lookup_trade(&state, trade_id).await;
            Json(PaymentView { payment, trade }).into_response()
        }
        None => (StatusCode::NOT_FOUND, "unknown payment id").into_response(),
    }
}
