//! `GET /logs?limit=N` — tails the oracle's log file.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use swap_oracle_chain::client::ChainClient;
use swap_oracle_types::api::v1::LogsResponse;

use crate::state::AppState;

const DEFAULT_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
struct LogsQuery {
    limit: Option<usize>,
}

/// Routes for the logs endpoint.
pub fn routes<C: ChainClient>(state: AppState<C>) -> Router {
    Router::new()
        .route("/logs", get(logs::<C>))
        .with_state(state)
}

async fn logs<C: ChainClient>(
    State(state): State<AppState<C>>,
    Query(query): Query<LogsQuery>,
) -> Json<LogsResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let lines = tail_log_file(&state.log_file, limit);
    Json(LogsResponse { lines })
}

fn tail_log_file(path: &std::path::Path, limit: usize) -> Vec<String> {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    let all_lines: Vec<&str> = contents.lines().collect();
    let start = all_lines.len().saturating_sub(limit);
    all_lines[start..].iter().map(|line| line.to_string()).collect()
}
