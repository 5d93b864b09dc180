//! HTTP status surface: read-only JSON endpoints over the oracle's
//! in-memory state.

pub mod health;
pub mod logs;
pub mod stats;
pub mod status;
pub mod trades;

use axum::Router;
use swap_oracle_chain::client::ChainClient;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full status-surface router. `/logs` is only registered
/// when `state.expose_logs` is set, since it can leak operational
/// detail an operator may not want reachable over the status surface.
pub fn routes<C: ChainClient>(state: AppState<C>) -> Router {
    let expose_logs = state.expose_logs;
    let router = Router::new()
        .merge(health::routes(state.clone()))
        .merge(status::routes(state.clone()))
        .merge(stats::routes(state.clone()));
    let router = if expose_logs {
        router.merge(logs::routes(state.clone()))
    } else {
        router
    };
    router
        .merge(trades::routes(state))
        .layer(TraceLayer::new_for_http())
}
