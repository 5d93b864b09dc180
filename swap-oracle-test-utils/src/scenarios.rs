//! Builders for the literal scenarios in the testable-properties
//! section: fixed trade ids, durations, and request ids so tests read
//! like the scenario descriptions they implement.

use alloy::primitives::{B256, U256};
use swap_oracle_types::{ChainRole, RequestId, TimeRequestEvent, TradeId};

/// The `trade_id = 42` used by the happy-path and timeout scenarios.
pub fn scenario_trade_id() -> TradeId {
    TradeId::new(U256::from(42u64))
}

/// Builds a `TimeRequestSent(request_id, trade_id, duration)` event as
/// the dispatcher would receive it, tagging the request id with
/// `request_tag` so successive requests for the same trade are
/// distinguishable in assertions.
pub fn time_request_event(
    chain: ChainRole,
    trade_id: TradeId,
    duration: u64,
    request_tag: u8,
) -> TimeRequestEvent {
    TimeRequestEvent {
        chain,
        request_id: RequestId::new(B256::repeat_byte(request_tag)),
        trade_id,
        duration,
        block_number: 1,
        block_timestamp: 0,
    }
}
