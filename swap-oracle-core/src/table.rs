//! Per-chain trade table, processing set, and deferred-event queue.
//! One [`ChainTable`] exists per chain; every mutation
//! goes through its methods so the concurrency discipline lives in one
//! place instead of being reimplemented at each call site.

use std::collections::{HashMap, HashSet, VecDeque};

use parking_lot::{Mutex, RwLock};
use swap_oracle_types::{ChainRole, TimeRequestEvent, TradeId};

use crate::record::TradeRecord;

/// A chain's in-memory trade table, processing set, and deferred-event
/// queues.
pub struct ChainTable {
    chain: ChainRole,
    trades: RwLock<HashMap<TradeId, TradeRecord>>,
    processing: Mutex<HashSet<TradeId>>,
    deferred: Mutex<HashMap<TradeId, VecDeque<TimeRequestEvent>>>,
}

impl ChainTable {
    /// Creates an empty table for `chain`.
    pub fn new(chain: ChainRole) -> Self {
        Self {
            chain,
            trades: RwLock::default(),
            processing: Mutex::default(),
            deferred: Mutex::default(),
        }
    }

    /// The chain this table belongs to.
    pub fn chain(&self) -> ChainRole {
        self.chain
    }

    /// Returns a clone of the record for `trade_id`, if one exists.
    pub fn get(&self, trade_id: TradeId) -> Option<TradeRecord> {
        self.trades.read().get(&trade_id).cloned()
    }

    /// Inserts or overwrites the record for `trade_id`.
    pub fn insert(&self, record: TradeRecord) {
        let len = {
            let mut trades = self.trades.write();
            trades.insert(record.trade_id, record);
            trades.len()
        };
        self.record_open_trades_gauge(len);
    }

    /// Removes the record for `trade_id`, e.g. on terminal outcome.
    pub fn remove(&self, trade_id: TradeId) -> Option<TradeRecord> {
        let (removed, len) = {
            let mut trades = self.trades.write();
            let removed = trades.remove(&trade_id);
            (removed, trades.len())
        };
        self.record_open_trades_gauge(len);
        removed
    }

    fn record_open_trades_gauge(&self, len: usize) {
        metrics::gauge!(crate::metrics::METRICS_ID_OPEN_TRADES, crate::metrics::METRICS_ATTRID_CHAIN => self.chain.to_string())
            .set(len as f64);
    }

    /// All trade ids this table currently holds a record for.
    pub fn active_trade_ids(&self) -> Vec<TradeId> {
        self.trades.read().keys().copied().collect()
    }

    /// A snapshot of every record, e.g. for the sweeper's scan pass.
    pub fn snapshot(&self) -> Vec<TradeRecord> {
        self.trades.read().values().cloned().collect()
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.trades.read().len()
    }

    /// `true` if no records are currently held.
    pub fn is_empty(&self) -> bool {
        self.trades.read().is_empty()
    }

    /// Attempts to claim `trade_id` for exclusive processing. Returns
    /// `true` if the claim succeeded (the id was idle).
    pub fn try_mark_processing(&self, trade_id: TradeId) -> bool {
        self.processing.lock().insert(trade_id)
    }

    /// Releases the processing claim on `trade_id`.
    pub fn unmark_processing(&self, trade_id: TradeId) {
        self.processing.lock().remove(&trade_id);
    }

    /// `true` if `trade_id` is currently claimed by a handler.
    pub fn is_processing(&self, trade_id: TradeId) -> bool {
        self.processing.lock().contains(&trade_id)
    }

    /// Appends `event` to `trade_id`'s deferred queue. Called when an
    /// event arrives for an id that is already being processed.
    pub fn enqueue_deferred(&self, trade_id: TradeId, event: TimeRequestEvent) {
        self.deferred.lock().entry(trade_id).or_default().push_back(event);
    }

    /// Pops the next deferred event for `trade_id`, if any. Removes
    /// the queue entry entirely once drained.
    pub fn pop_deferred(&self, trade_id: TradeId) -> Option<TimeRequestEvent> {
        let mut deferred = self.deferred.lock();
        let queue = deferred.get_mut(&trade_id)?;
        let next = queue.pop_front();
        if queue.is_empty() {
            deferred.remove(&trade_id);
        }
        next
    }

    /// Total number of events still queued across all trade ids.
    pub fn pending_events_count(&self) -> u64 {
        self.deferred.lock().values().map(|q| q.len() as u64).sum()
    }
}
