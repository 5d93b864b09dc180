//! The in-memory [`TradeRecord`] and its per-chain table.

use swap_oracle_types::{ChainRole, RequestId, TradeId};

/// One chain-local mirror of a trade's lifecycle, keyed by `trade_id`.
/// The oracle keeps one table of these per chain (`asset_trades`,
/// `payment_trades`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRecord {
    /// Shared identifier across both chains for the same swap.
    pub trade_id: TradeId,
    /// Which leg this record belongs to.
    pub chain: ChainRole,
    /// Wall-clock seconds when the oracle first stamped this leg.
    pub inception_time: u64,
    /// Swap validity window, in seconds, supplied by the contract event.
    pub duration: u64,
    /// Most recent Oracle request id seen for this leg.
    pub last_request_id: RequestId,
    /// Wall-clock seconds of that last request.
    pub last_request_time: u64,
    /// When the leg entered `Confirmed`; set during the confirmation-phase request.
    pub confirmation_time: Option<u64>,
    /// `false` until the second `TimeRequestSent` for this `trade_id`.
    pub is_confirmation_phase: bool,
}

impl TradeRecord {
    /// Builds the record created by the first `TimeRequestSent` for a
    /// `trade_id` on `chain`.
    pub fn new_created(
        chain: ChainRole,
        trade_id: TradeId,
        duration: u64,
        request_id: RequestId,
        inception_time: u64,
    ) -> Self {
        Self {
            trade_id,
            chain,
            inception_time,
            duration,
            last_request_id: request_id,
            last_request_time: inception_time,
            confirmation_time: None,
            is_confirmation_phase: false,
        }
    }
}
