//! ABI-encodes the three oracle callbacks so the
//! [`swap_oracle_chain::submitter::TransactionSubmitter`]'s `(to, data)`
//! interface can stay chain-agnostic.

use alloy::{primitives::Bytes, sol_types::SolCall};
use swap_oracle_types::{RequestId, TradeId, chain::EscrowContract};

/// Encodes `fulfillTime(requestId, timestamp)`.
pub fn fulfill_time(request_id: RequestId, timestamp: u64) -> Bytes {
    EscrowContract::fulfillTimeCall {
        requestId: request_id.into_inner(),
        timestamp: alloy::primitives::U256::from(timestamp),
    }
    .abi_encode()
    .into()
}

/// Encodes `handleFailedConfirmation(id)`.
pub fn handle_failed_confirmation(trade_id: TradeId) -> Bytes {
    EscrowContract::handleFailedConfirmationCall {
        id: trade_id.into_inner(),
    }
    .abi_encode()
    .into()
}

/// Encodes `handleExecutionTimeout(id)`.
pub fn handle_execution_timeout(trade_id: TradeId) -> Bytes {
    EscrowContract::handleExecutionTimeoutCall {
        id: trade_id.into_inner(),
    }
    .abi_encode()
    .into()
}
