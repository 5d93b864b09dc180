//! # v1 API types
//!
//! Data transfer objects for the version 1 status API. These mirror
//! the read-only HTTP surface — nothing here accepts a write, the
//! oracle only ever reports what it already derived from chain state.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{TradeId, TradeState};

/// Response for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `true` if both chains are reachable.
    pub healthy: bool,
    /// Asset-chain reachability.
    pub asset_chain: ChainHealth,
    /// Payment-chain reachability.
    pub payment_chain: ChainHealth,
}

/// Per-chain reachability summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainHealth {
    /// `true` if the most recent RPC call to this chain succeeded.
    pub reachable: bool,
    /// The error from the last failed RPC call, if any.
    pub last_error: Option<String>,
}

/// Response for `GET /status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Asset-chain event pump status.
    pub asset_chain: ChainStatus,
    /// Payment-chain event pump status.
    pub payment_chain: ChainStatus,
    /// Known asset-trade-id to payment-trade-id mappings.
    pub cross_chain_mappings: Vec<CrossChainMapping>,
    /// Path of the current run's log file.
    pub log_file: String,
}

/// A discovered asset-leg/payment-leg trade id pairing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossChainMapping {
    /// The asset-chain trade id.
    pub asset_trade_id: TradeId,
    /// The payment-chain trade id it is paired with.
    pub payment_trade_id: TradeId,
}

/// Per-chain progress and in-flight trade summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainStatus {
    /// The last block the event pump finished scanning.
    pub last_processed_block: u64,
    /// The chain's current head block, as of the last poll.
    pub current_block: u64,
    /// Trade ids this oracle currently holds an in-memory record for.
    pub active_trade_ids: Vec<TradeId>,
    /// Number of events queued but not yet dispatched.
    pub pending_events_count: u64,
}

/// Response for `GET /stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Asset-chain trade-id range and counters.
    pub asset_chain: ChainStats,
    /// Payment-chain trade-id range and counters.
    pub payment_chain: ChainStats,
    /// Process-wide counters.
    pub counters: Counters,
    /// Resident memory usage of the oracle process, in bytes.
    pub memory_bytes: u64,
}

/// Oldest/newest in-flight trade id and record count for one chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainStats {
    /// The oldest trade id this oracle still holds a record for.
    pub oldest_trade_id: Option<TradeId>,
    /// The newest trade id this oracle still holds a record for.
    pub newest_trade_id: Option<TradeId>,
    /// Number of trade records currently held for this chain.
    pub record_count: u64,
}

/// Lifetime counters surfaced by `GET /stats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Counters {
    /// Trades created from a first `TimeRequestSent` event.
    pub trades_created: u64,
    /// Trades moved into their confirmation phase.
    pub trades_confirmed: u64,
    /// Legs observed `Completed` on-chain.
    pub trades_completed: u64,
    /// Double-spend risks detected and failed out.
    pub double_spends_detected: u64,
    /// Legs failed for exceeding their confirmation window.
    pub confirmation_timeout_failures: u64,
    /// Legs failed for exceeding their execution window.
    pub execution_timeout_failures: u64,
    /// Oracle callbacks submitted (`fulfillTime`).
    pub callbacks_submitted: u64,
    /// Terminal-callback submits that reverted on-chain, excluding nonce issues.
    pub terminal_callback_reverts: u64,
    /// Positive cross-chain verifier verdicts.
    pub verifier_passes: u64,
    /// Negative cross-chain verifier verdicts (timeout, reorg, absent tx).
    pub verifier_failures: u64,
}

/// Response for `GET /logs?limit=N`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsResponse {
    /// The last `limit` lines of the current run's log file.
    pub lines: Vec<String>,
}

/// A trade or payment record as read back from the escrow contract via
/// `getTrade`/`getPayment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    /// The trade or payment id.
    pub id: TradeId,
    /// The escrowed amount.
    pub amount: U256,
    /// The buyer address.
    pub buyer: Address,
    /// The seller address.
    pub seller: Address,
    /// The on-chain lifecycle state.
    pub state: TradeState,
    /// Unix timestamp the trade was created.
    pub inception_time: u64,
    /// Unix timestamp of the confirmation-phase stamp, `0` if unset.
    pub confirmation_time: u64,
    /// The validity window, in seconds.
    pub duration: u64,
    /// For payment records, the asset-chain trade id it is paired with.
    pub asset_trade_id: Option<TradeId>,
}

/// Response for `GET /trade/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeView {
    /// The asset-chain trade record.
    pub trade: TradeRecord,
    /// The paired payment-chain record, if the oracle has discovered one.
    pub payment: Option<TradeRecord>,
}

/// Response for `GET /payment/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentView {
    /// The payment-chain record.
    pub payment: TradeRecord,
    /// The paired asset-chain record, if the oracle has discovered one.
    pub trade: Option<TradeRecord>,
}
