//! `GET /health` — liveness, readiness, and per-chain reachability.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use swap_oracle_chain::client::ChainClient;
use swap_oracle_types::api::v1::{ChainHealth, HealthResponse};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::state::AppState;

/// Routes for the health endpoint. `Cache-Control: no-cache` is forced
/// so a reverse proxy never serves a stale readiness result.
pub fn routes<C: ChainClient>(state: AppState<C>) -> Router {
    Router::new()
        .route("/health", get(health::<C>))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        ))
        .with_state(state)
}

/// Reports `503 Service Unavailable` while any background task the
/// service spawned hasn't started yet, so an orchestrator doesn't
/// route traffic to the oracle before its event pumps are running.
async fn health<C: ChainClient>(State(state): State<AppState<C>>) -> Response {
    if !state.started_services.all_started() {
        return (StatusCode::SERVICE_UNAVAILABLE, "starting").into_response();
    }
    let asset_chain = probe(state.asset_client.as_ref()).await;
    let payment_chain = probe(state.payment_client.as_ref()).await;
    Json(HealthResponse {
        healthy: asset_chain.reachable && payment_chain.reachable,
        asset_chain,
        payment_chain,
    })
    .into_response()
}

async fn probe<C: ChainClient>(client: &C) -> ChainHealth {
    match client.block_number().await {
        Ok(_) => ChainHealth {
            reachable: true,
            last_error: None,
        },
        Err(err) => ChainHealth {
            reachable: false,
            last_error: Some(err.to_string()),
        },
    }
}
