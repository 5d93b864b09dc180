//! `GET /status` — per-chain progress and the live cross-chain pairings.

use axum::{Json, Router, extract::State, routing::get};
use swap_oracle_chain::client::ChainClient;
use swap_oracle_types::ChainRole;
use swap_oracle_types::api::v1::{ChainStatus, CrossChainMapping, StatusResponse};

use crate::state::AppState;

/// Routes for the status endpoint.
pub fn routes<C: ChainClient>(state: AppState<C>) -> Router {
    Router::new()
        .route("/status", get(status::<C>))
        .with_state(state)
}

async fn status<C: ChainClient>(State(state): State<AppState<C>>) -> Json<StatusResponse> {
    let asset_chain = chain_status(&state, ChainRole::Asset).await;
    let payment_chain = chain_status(&state, ChainRole::Payment).await;
    let cross_chain_mappings = state
        .coordinator
        .pairs()
        .snapshot()
        .into_iter()
        .map(|pair| CrossChainMapping {
            asset_trade_id: pair.asset_trade_id,
            payment_trade_id: pair.payment_trade_id,
        })
        .collect();

    Json(StatusResponse {
        asset_chain,
        payment_chain,
        cross_chain_mappings,
        log_file: state.log_file.display().to_string(),
    })
}

async fn chain_status<C: ChainClient>(state: &AppState<C>, role: ChainRole) -> ChainStatus {
    let table = state.coordinator.table(role);
    let current_block = state.client(role).block_number().await.unwrap_or(0);
    ChainStatus {
        last_processed_block: state.last_processed_block(role),
        current_block,
        active_trade_ids: table.active_trade_ids(),
        pending_events_count: table.pending_events_count(),
    }
}
