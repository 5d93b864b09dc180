//! The cross-chain trade-id pairing table.
//!
//! Modeled as a small `{asset_tid, payment_tid}` struct stored in a
//! single map keyed by the shared trade id, rather than a
//! `payment_<id>` string-keyed trick.

use std::collections::HashMap;

use parking_lot::Mutex;
use swap_oracle_types::TradeId;

/// A discovered pairing between an Asset-chain and Payment-chain trade id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossChainPair {
    /// The Asset-chain trade id.
    pub asset_trade_id: TradeId,
    /// The Payment-chain trade id.
    pub payment_trade_id: TradeId,
}

/// The set of currently-live cross-chain pairings, keyed by the shared
/// trade id.
#[derive(Default)]
pub struct CrossChainPairs {
    pairs: Mutex<HashMap<TradeId, CrossChainPair>>,
}

impl CrossChainPairs {
    /// Records that `trade_id` now has a healthy record on both chains.
    pub fn establish(&self, trade_id: TradeId) {
        self.pairs.lock().insert(
            trade_id,
            CrossChainPair {
                asset_trade_id: trade_id,
                payment_trade_id: trade_id,
            },
        );
    }

    /// Returns the pairing for `trade_id`, if one is currently live.
    pub fn get(&self, trade_id: TradeId) -> Option<CrossChainPair> {
        self.pairs.lock().get(&trade_id).copied()
    }

    /// Clears the pairing for `trade_id`. Called when either leg is
    /// driven to failure or completes.
    pub fn clear(&self, trade_id: TradeId) {
        self.pairs.lock().remove(&trade_id);
    }

    /// A snapshot of all live pairings, for the status surface.
    pub fn snapshot(&self) -> Vec<CrossChainPair> {
        self.pairs.lock().values().copied().collect()
    }
}
