//! `GET /stats` — lifetime counters and per-chain table statistics.

use axum::{Json, Router, extract::State, routing::get};
use swap_oracle_chain::client::ChainClient;
use swap_oracle_types::ChainRole;
use swap_oracle_types::api::v1::{ChainStats, StatsResponse};

use crate::state::AppState;

/// Routes for the stats endpoint.
pub fn routes<C: ChainClient>(state: AppState<C>) -> Router {
    Router::new()
        .route("/stats", get(stats::<C>))
        .with_state(state)
}

async fn stats<C: ChainClient>(State(state): State<AppState<C>>) -> Json<StatsResponse> {
    let asset_chain = chain_stats::<C>(&state, ChainRole::Asset);
    let payment_chain = chain_stats::<C>(&state, ChainRole::Payment);

    Json(StatsResponse {
        asset_chain,
        payment_chain,
        counters: state.counters.snapshot(),
        // A rough in-memory footprint estimate (record count × size), not a true RSS reading.
        memory_bytes: estimate_memory_bytes(&state),
    })
}

fn chain_stats<C: ChainClient>(state: &AppState<C>, role: ChainRole) -> ChainStats {
    let ids = state.coordinator.table(role).active_trade_ids();
    ChainStats {
        oldest_trade_id: ids.iter().min().copied(),
        newest_trade_id: ids.iter().max().copied(),
        record_count: ids.len() as u64,
    }
}

fn estimate_memory_bytes<C: ChainClient>(state: &AppState<C>) -> u64 {
    let record_size = std::mem::size_of::<swap_oracle_core::TradeRecord>() as u64;
    let asset_count = state.coordinator.table(ChainRole::Asset).len() as u64;
    let payment_count = state.coordinator.table(ChainRole::Payment).len() as u64;
    (asset_count + payment_count) * record_size
}
