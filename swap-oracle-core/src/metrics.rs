//! Metrics definitions and lifetime counters for the oracle core.

use std::sync::atomic::{AtomicU64, Ordering};

use swap_oracle_types::api::v1::Counters as CountersView;

/// Attribute key for the chain a gauge reading belongs to.
pub const METRICS_ATTRID_CHAIN: &str = "chain";
/// Attribute key for a verifier verdict's failure reason.
pub const METRICS_ATTRID_REASON: &str = "reason";

/// Metrics key for trades created (first `TimeRequestSent` for an id on a chain).
pub const METRICS_ID_TRADES_CREATED: &str = "swap_oracle.trades.created";
/// Metrics key for trades moved into their confirmation phase.
pub const METRICS_ID_TRADES_CONFIRMED: &str = "swap_oracle.trades.confirmed";
/// Metrics key for legs observed `Completed` on-chain.
pub const METRICS_ID_TRADES_COMPLETED: &str = "swap_oracle.trades.completed";
/// Metrics key for double-spend risks detected and failed out.
pub const METRICS_ID_DOUBLE_SPENDS_DETECTED: &str = "swap_oracle.double_spends.detected";
/// Metrics key for legs failed for exceeding their confirmation window.
pub const METRICS_ID_CONFIRMATION_TIMEOUT_FAILURES: &str = "swap_oracle.confirmation_timeouts.failed";
/// Metrics key for legs failed for exceeding their execution window.
pub const METRICS_ID_EXECUTION_TIMEOUT_FAILURES: &str = "swap_oracle.execution_timeouts.failed";
/// Metrics key for oracle callbacks submitted (`fulfillTime`, `handleFailedConfirmation`, `handleExecutionTimeout`).
pub const METRICS_ID_CALLBACKS_SUBMITTED: &str = "swap_oracle.callbacks.submitted";
/// Metrics key for terminal-callback submits that reverted on-chain (excluding nonce issues).
pub const METRICS_ID_TERMINAL_CALLBACK_REVERTS: &str = "swap_oracle.terminal_callback.reverts";
/// Metrics key for positive cross-chain verifier verdicts.
pub const METRICS_ID_VERIFIER_PASSES: &str = "swap_oracle.verifier.passes";
/// Metrics key for cross-chain verifier failures, labeled by [`METRICS_ATTRID_REASON`].
pub const METRICS_ID_VERIFIER_FAILURES: &str = "swap_oracle.verifier.failures";
/// Metrics key for the duration of a single Swap Coordinator event handling pass.
pub const METRICS_ID_EVENT_HANDLE_DURATION: &str = "swap_oracle.event.handle.duration";
/// Metrics key for the duration of a Cross-Chain Verifier wait, labeled by chain.
pub const METRICS_ID_VERIFIER_WAIT_DURATION: &str = "swap_oracle.verifier.wait.duration";
/// Metrics key for the number of records a chain's table currently holds, labeled by chain.
pub const METRICS_ID_OPEN_TRADES: &str = "swap_oracle.trades.open";
/// Metrics key for the gap between a chain's head and its last-processed block, labeled by chain.
pub const METRICS_ID_BLOCK_LAG: &str = "swap_oracle.block.lag";

/// Describes all metrics used by the oracle core with the `metrics` crate.
pub fn describe_metrics() {
    metrics::describe_counter!(
        METRICS_ID_TRADES_CREATED,
        metrics::Unit::Count,
        "Number of trades created from a first TimeRequestSent event"
    );
    metrics::describe_counter!(
        METRICS_ID_TRADES_CONFIRMED,
        metrics::Unit::Count,
        "Number of trades moved into their confirmation phase"
    );
    metrics::describe_counter!(
        METRICS_ID_TRADES_COMPLETED,
        metrics::Unit::Count,
        "Number of legs observed Completed on-chain"
    );
    metrics::describe_counter!(
        METRICS_ID_DOUBLE_SPENDS_DETECTED,
        metrics::Unit::Count,
        "Number of timeout-inversion / double-spend risks detected and failed out"
    );
    metrics::describe_counter!(
        METRICS_ID_CONFIRMATION_TIMEOUT_FAILURES,
        metrics::Unit::Count,
        "Number of legs failed for exceeding their confirmation window"
    );
    metrics::describe_counter!(
        METRICS_ID_EXECUTION_TIMEOUT_FAILURES,
        metrics::Unit::Count,
        "Number of legs failed for exceeding their execution window"
    );
    metrics::describe_counter!(
        METRICS_ID_CALLBACKS_SUBMITTED,
        metrics::Unit::Count,
        "Number of oracle callback transactions submitted"
    );
    metrics::describe_counter!(
        METRICS_ID_TERMINAL_CALLBACK_REVERTS,
        metrics::Unit::Count,
        "Number of handleFailedConfirmation/handleExecutionTimeout submits that reverted on-chain, excluding nonce issues"
    );
    metrics::describe_counter!(
        METRICS_ID_VERIFIER_PASSES,
        metrics::Unit::Count,
        "Number of cross-chain verifier runs that returned a positive verdict"
    );
    metrics::describe_counter!(
        METRICS_ID_VERIFIER_FAILURES,
        metrics::Unit::Count,
        "Number of cross-chain verifier runs that returned a negative verdict, labeled by reason"
    );
    metrics::describe_histogram!(
        METRICS_ID_EVENT_HANDLE_DURATION,
        metrics::Unit::Milliseconds,
        "Duration of a single Swap Coordinator event handling pass"
    );
    metrics::describe_histogram!(
        METRICS_ID_VERIFIER_WAIT_DURATION,
        metrics::Unit::Milliseconds,
        "Duration of a single Cross-Chain Verifier wait"
    );
    metrics::describe_gauge!(
        METRICS_ID_OPEN_TRADES,
        metrics::Unit::Count,
        "Number of trade records a chain's table currently holds"
    );
    metrics::describe_gauge!(
        METRICS_ID_BLOCK_LAG,
        metrics::Unit::Count,
        "Blocks between a chain's head and its last-processed block at the start of a poll"
    );
}

/// Process-wide lifetime counters, shared between the coordinator/sweeper
/// and the `/stats` status endpoint.
#[derive(Default)]
pub struct Counters {
    trades_created: AtomicU64,
    trades_confirmed: AtomicU64,
    trades_completed: AtomicU64,
    double_spends_detected: AtomicU64,
    confirmation_timeout_failures: AtomicU64,
    execution_timeout_failures: AtomicU64,
    callbacks_submitted: AtomicU64,
    terminal_callback_reverts: AtomicU64,
    verifier_passes: AtomicU64,
    verifier_failures: AtomicU64,
}

impl Counters {
    /// Records one trade created from a first `TimeRequestSent` event.
    pub fn record_trade_created(&self) {
        self.trades_created.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(METRICS_ID_TRADES_CREATED).increment(1);
    }

    /// Records one trade moved into its confirmation phase.
    pub fn record_trade_confirmed(&self) {
        self.trades_confirmed.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(METRICS_ID_TRADES_CONFIRMED).increment(1);
    }

    /// Records one leg observed `Completed` on-chain.
    pub fn record_trade_completed(&self) {
        self.trades_completed.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(METRICS_ID_TRADES_COMPLETED).increment(1);
    }

    /// Records one detected double-spend / timeout-inversion risk.
    pub fn record_double_spend_detected(&self) {
        self.double_spends_detected.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(METRICS_ID_DOUBLE_SPENDS_DETECTED).increment(1);
    }

    /// Records one leg failed for exceeding its confirmation window,
    /// whether caught proactively by the coordinator or by the sweeper.
    pub fn record_confirmation_timeout_failure(&self) {
        self.confirmation_timeout_failures.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(METRICS_ID_CONFIRMATION_TIMEOUT_FAILURES).increment(1);
    }

    /// Records one leg failed for exceeding its execution window.
    pub fn record_execution_timeout_failure(&self) {
        self.execution_timeout_failures.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(METRICS_ID_EXECUTION_TIMEOUT_FAILURES).increment(1);
    }

    /// Records one oracle callback submission.
    pub fn record_callback_submitted(&self) {
        self.callbacks_submitted.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(METRICS_ID_CALLBACKS_SUBMITTED).increment(1);
    }

    /// Records one handleFailedConfirmation/handleExecutionTimeout submit
    /// that reverted on-chain (as opposed to a nonce-related terminal error).
    pub fn record_terminal_callback_revert(&self) {
        self.terminal_callback_reverts.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(METRICS_ID_TERMINAL_CALLBACK_REVERTS).increment(1);
    }

    /// Records one positive verifier verdict.
    pub fn record_verifier_pass(&self) {
        self.verifier_passes.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(METRICS_ID_VERIFIER_PASSES).increment(1);
    }

    /// Records one negative verifier verdict, labeled by `reason`.
    pub fn record_verifier_failure(&self, reason: &'static str) {
        self.verifier_failures.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(METRICS_ID_VERIFIER_FAILURES, METRICS_ATTRID_REASON => reason).increment(1);
    }

    /// A point-in-time view of all counters, for the `/stats` endpoint.
    pub fn snapshot(&self) -> CountersView {
        CountersView {
            trades_created: self.trades_created.load(Ordering::Relaxed),
            trades_confirmed: self.trades_confirmed.load(Ordering::Relaxed),
            trades_completed: self.trades_completed.load(Ordering::Relaxed),
            double_spends_detected: self.double_spends_detected.load(Ordering::Relaxed),
            confirmation_timeout_failures: self.confirmation_timeout_failures.load(Ordering::Relaxed),
            execution_timeout_failures: self.execution_timeout_failures.load(Ordering::Relaxed),
            callbacks_submitted: self.callbacks_submitted.load(Ordering::Relaxed),
            terminal_callback_reverts: self.terminal_callback_reverts.load(Ordering::Relaxed),
            verifier_passes: self.verifier_passes.load(Ordering::Relaxed),
            verifier_failures: self.verifier_failures.load(Ordering::Relaxed),
        }
    }
}
