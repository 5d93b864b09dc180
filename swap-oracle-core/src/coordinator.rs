//! The Swap Coordinator — the state machine core.
//!
//! One [`SwapCoordinator`] owns both chains' [`ChainTable`]s and the
//! [`CrossChainPairs`] between them. It never touches a lock across an
//! RPC call: a [`ChainTable`] read/write only ever wraps the local
//! bookkeeping, while every contract call goes through a
//! [`TransactionSubmitter`].

use std::sync::Arc;

use alloy::primitives::Address;
use swap_oracle_types::{ChainRole, Clock, TimeRequestEvent, TradeId};

use crate::{
    metrics::Counters,
    pairs::CrossChainPairs,
    record::TradeRecord,
    table::ChainTable,
    verifier::{CrossChainVerifier, VerifiedPayment, VerifierError},
};

/// One chain's contract address, local table, and transaction
/// submitter, bundled so the coordinator can address "this chain" or
/// "the other chain" without repeating itself.
pub struct ChainHandle<C> {
    /// Which leg this handle drives.
    pub role: ChainRole,
    /// The escrow contract address this handle calls back into.
    pub contract_address: Address,
    /// The in-memory table for this chain.
    pub table: Arc<ChainTable>,
    /// The submitter used for every callback on this chain.
    pub submitter: Arc<swap_oracle_chain::submitter::TransactionSubmitter<C>>,
}

impl<C> ChainHandle<C> {
    /// Builds a handle for `role`, with a fresh empty table.
    pub fn new(
        role: ChainRole,
        contract_address: Address,
        submitter: Arc<swap_oracle_chain::submitter::TransactionSubmitter<C>>,
    ) -> Self {
        Self {
            role,
            contract_address,
            table: Arc::new(ChainTable::new(role)),
            submitter,
        }
    }
}

/// Owns both chains' state and drives the event-handling algorithm.
/// Generic over the chain client so tests can swap in a fake.
pub struct SwapCoordinator<C> {
    asset: ChainHandle<C>,
    payment: ChainHandle<C>,
    pairs: CrossChainPairs,
    clock: Arc<dyn Clock>,
    counters: Arc<Counters>,
    payment_verifier: Option<Arc<CrossChainVerifier<C>>>,
}

impl<C: swap_oracle_chain::client::ChainClient> SwapCoordinator<C> {
    /// Builds a coordinator over the two chain handles, with no
    /// Cross-Chain Verifier gating wired in.
    pub fn new(
        asset: ChainHandle<C>,
        payment: ChainHandle<C>,
        clock: Arc<dyn Clock>,
        counters: Arc<Counters>,
    ) -> Self {
        Self {
            asset,
            payment,
            pairs: CrossChainPairs::default(),
            clock,
            counters,
            payment_verifier: None,
        }
    }

    /// Attaches a Cross-Chain Verifier for the Payment chain, enabling
    /// [`Self::verify_payment_release`] gating.
    pub fn with_payment_verifier(mut self, verifier: Arc<CrossChainVerifier<C>>) -> Self {
        self.payment_verifier = Some(verifier);
        self
    }

    /// Verifies that a payment-release transaction on the Payment
    /// chain actually executed, for callers that want to gate the
    /// Asset-side key-reveal path on it rather than trust the
    /// contracts' own timeouts alone. Returns an error if no verifier
    /// was attached via [`Self::with_payment_verifier`].
    pub async fn verify_payment_release(
        &self,
        tx_hash: alloy::primitives::B256,
        expected_payment_id: TradeId,
        value: alloy::primitives::U256,
    ) -> Result<VerifiedPayment, VerifierError> {
        let Some(verifier) = &self.payment_verifier else {
            return Err(VerifierError::NotConfigured);
        };
        let result = verifier.verify(tx_hash, expected_payment_id, value).await;
        match &result {
            Ok(_) => self.counters.record_verifier_pass(),
            Err(err) => self.counters.record_verifier_failure(err.reason_tag()),
        }
        result
    }

    /// The Asset-chain handle.
    pub fn asset(&self) -> &ChainHandle<C> {
        &self.asset
    }

    /// The Payment-chain handle.
    pub fn payment(&self) -> &ChainHandle<C> {
        &self.payment
    }

    /// The live cross-chain pairings.
    pub fn pairs(&self) -> &CrossChainPairs {
        &self.pairs
    }

    /// The shared lifetime counters, e.g. for the sweeper to record
    /// callback-submit outcomes against.
    pub fn counters(&self) -> &Arc<Counters> {
        &self.counters
    }

    fn handle(&self, role: ChainRole) -> &ChainHandle<C> {
        match role {
            ChainRole::Asset => &self.asset,
            ChainRole::Payment => &self.payment,
        }
    }

    /// The in-memory table for `role`, e.g. for the dispatcher's
    /// processing-set bookkeeping or the sweeper's scan pass.
    pub fn table(&self, role: ChainRole) -> &Arc<ChainTable> {
        &self.handle(role).table
    }

    /// Dispatches one `TimeRequestSent` event: creation if no local
    /// record exists yet for `event.trade_id` on `event.chain`,
    /// confirmation otherwise.
    #[tracing::instrument(level = "debug", skip(self, event), fields(chain = %event.chain, trade_id = %event.trade_id))]
    pub async fn handle_event(&self, event: TimeRequestEvent) {
        let start = std::time::Instant::now();
        let this = self.handle(event.chain);
        let existing = this.table.get(event.trade_id);
        match existing {
            None => self.handle_creation(event).await,
            Some(record) => self.handle_confirmation(event, record).await,
        }
        metrics::histogram!(crate::metrics::METRICS_ID_EVENT_HANDLE_DURATION)
            .record(start.elapsed().as_millis() as f64);
    }

    /// First request for `trade_id` on this chain.
    async fn handle_creation(&self, event: TimeRequestEvent) {
        let this = self.handle(event.chain);
        let other = self.handle(event.chain.other());
        let other_record = other.table.get(event.trade_id);

        if let Some(other_record) = &other_record {
            let (asset_dur, payment_dur) = match event.chain {
                ChainRole::Asset => (event.duration, other_record.duration),
                ChainRole::Payment => (other_record.duration, event.duration),
            };
            if asset_dur < payment_dur {
                tracing::warn!(
                    trade_id = %event.trade_id,
                    asset_dur,
                    payment_dur,
                    "asset duration shorter than payment duration, failing both legs"
                );
                self.counters.record_double_spend_detected();
                self.fail_current_leg_unstarted(this, event.trade_id).await;
                self.fail_peer_leg(other, event.trade_id).await;
                return;
            }
        }

        let inception_time = match (&other_record, event.chain) {
            (Some(other_record), _) => other_record.inception_time,
            (None, _) => self.clock.now(),
        };

        let record = TradeRecord::new_created(
            event.chain,
            event.trade_id,
            event.duration,
            event.request_id,
            inception_time,
        );
        this.table.insert(record);
        self.counters.record_trade_created();
        if other_record.is_some() {
            self.pairs.establish(event.trade_id);
        }

        self.stamp(this, event.trade_id, event.request_id, inception_time)
            .await;
    }

    /// Subsequent request for an existing `trade_id`, moving it into
    /// its confirmation phase.
    async fn handle_confirmation(&self, event: TimeRequestEvent, mut record: TradeRecord) {
        let this = self.handle(event.chain);
        let other_record = self
            .pairs
            .get(event.trade_id)
            .and_then(|_| self.handle(event.chain.other()).table.get(event.trade_id));

        let now = self.clock.now();
        let confirmation_time = match &other_record {
            Some(other_record) => now.max(other_record.last_request_time),
            None => now,
        };

        if confirmation_time.saturating_sub(record.inception_time) > record.duration {
            tracing::warn!(
                trade_id = %event.trade_id,
                chain = %event.chain,
                "confirmation window exceeded, failing both legs"
            );
            self.counters.record_confirmation_timeout_failure();
            self.fail_current_leg(this, event.trade_id).await;
            self.fail_peer_leg(self.handle(event.chain.other()), event.trade_id)
                .await;
            return;
        }

        record.last_request_id = event.request_id;
        record.last_request_time = now;
        record.is_confirmation_phase = true;
        record.confirmation_time = Some(confirmation_time);
        this.table.insert(record);
        self.counters.record_trade_confirmed();

        self.stamp(this, event.trade_id, event.request_id, confirmation_time)
            .await;
    }

    /// Encodes and submits `fulfillTime`. On a terminal submit error
    /// the local record is dropped so the coordinator never retries a
    /// leg the submitter already gave up on; the sweeper and the
    /// contracts' own timeouts are the fallback.
    async fn stamp(
        &self,
        handle: &ChainHandle<C>,
        trade_id: TradeId,
        request_id: swap_oracle_types::RequestId,
        timestamp: u64,
    ) {
        let data = crate::encode::fulfill_time(request_id, timestamp);
        match handle.submitter.submit(handle.contract_address, data).await {
            Ok(()) => self.counters.record_callback_submitted(),
            Err(err) => {
                tracing::error!(%err, trade_id = %trade_id, chain = %handle.role, "fulfillTime submit failed, dropping local record");
                handle.table.remove(trade_id);
                self.pairs.clear(trade_id);
            }
        }
    }

    /// Fails a leg that is in the current call stack (already marked
    /// processing by the dispatcher) but has a local record to clear.
    async fn fail_current_leg(&self, handle: &ChainHandle<C>, trade_id: TradeId) {
        let data = crate::encode::handle_failed_confirmation(trade_id);
        if let Err(err) = handle.submitter.submit(handle.contract_address, data).await {
            tracing::error!(%err, trade_id = %trade_id, chain = %handle.role, "handleFailedConfirmation submit failed");
            self.record_if_revert(&err);
        }
        handle.table.remove(trade_id);
        self.pairs.clear(trade_id);
    }

    /// Fails a leg that has no local record yet (the double-spend
    /// check fires before the new record is inserted).
    async fn fail_current_leg_unstarted(&self, handle: &ChainHandle<C>, trade_id: TradeId) {
        let data = crate::encode::handle_failed_confirmation(trade_id);
        if let Err(err) = handle.submitter.submit(handle.contract_address, data).await {
            tracing::error!(%err, trade_id = %trade_id, chain = %handle.role, "handleFailedConfirmation submit failed");
            self.record_if_revert(&err);
        }
        self.pairs.clear(trade_id);
    }

    /// Records [`crate::metrics::Counters::record_terminal_callback_revert`]
    /// for a terminal-callback submit error, excluding nonce-related failures.
    fn record_if_revert(&self, err: &swap_oracle_chain::error::RpcError) {
        if matches!(err, swap_oracle_chain::error::RpcError::Reverted(_)) {
            self.counters.record_terminal_callback_revert();
        }
    }

    /// Fails the peer leg, acquiring its ProcessingSet membership
    /// first so the peer's own handler can't race this cleanup. If the
    /// peer is already being handled, this is a no-op — that handler
    /// will observe the cleared pair and the contract's own state on
    /// its next pass.
    pub(crate) async fn fail_peer_leg(&self, peer: &ChainHandle<C>, trade_id: TradeId) {
        self.fail_peer_leg_with(peer, trade_id, crate::encode::handle_failed_confirmation(trade_id))
            .await;
    }

    /// Like [`Self::fail_peer_leg`] but with an explicit callback
    /// payload — used by the sweeper, which must propagate
    /// `handleExecutionTimeout` rather than `handleFailedConfirmation`
    /// when that's what expired the leg it's cancelling.
    pub(crate) async fn fail_peer_leg_with(
        &self,
        peer: &ChainHandle<C>,
        trade_id: TradeId,
        data: alloy::primitives::Bytes,
    ) {
        if !peer.table.try_mark_processing(trade_id) {
            tracing::debug!(trade_id = %trade_id, chain = %peer.role, "peer already processing, skipping propagated failure");
            return;
        }
        if peer.table.get(trade_id).is_some() {
            if let Err(err) = peer.submitter.submit(peer.contract_address, data).await {
                tracing::error!(%err, trade_id = %trade_id, chain = %peer.role, "propagated callback submit failed");
                self.record_if_revert(&err);
            }
            peer.table.remove(trade_id);
        }
        self.pairs.clear(trade_id);
        peer.table.unmark_processing(trade_id);
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, B256, U256};
    use swap_oracle_types::RequestId;

    use super::*;
    use crate::test_support::{FixedClock, MockChainClient};

    async fn build_coordinator(clock: Arc<dyn Clock>) -> SwapCoordinator<MockChainClient> {
        let client = Arc::new(MockChainClient::default());
        let asset_submitter = Arc::new(
            swap_oracle_chain::submitter::TransactionSubmitter::new(
                Arc::clone(&client),
                Address::ZERO,
                200_000,
                3,
            )
            .await
            .unwrap(),
        );
        let payment_submitter = Arc::new(
            swap_oracle_chain::submitter::TransactionSubmitter::new(client, Address::ZERO, 200_000, 3)
                .await
                .unwrap(),
        );
        let asset = ChainHandle::new(ChainRole::Asset, Address::repeat_byte(1), asset_submitter);
        let payment = ChainHandle::new(
            ChainRole::Payment,
            Address::repeat_byte(2),
            payment_submitter,
        );
        SwapCoordinator::new(asset, payment, clock, Arc::new(Counters::default()))
    }

    fn event(chain: ChainRole, trade_id: TradeId, duration: u64, tag: u8) -> TimeRequestEvent {
        TimeRequestEvent {
            chain,
            request_id: RequestId::new(B256::repeat_byte(tag)),
            trade_id,
            duration,
            block_number: 1,
            block_timestamp: 1_000,
        }
    }

    #[tokio::test]
    async fn verify_payment_release_errs_without_attached_verifier() {
        let coordinator = build_coordinator(Arc::new(FixedClock::new(1_000))).await;
        let result = coordinator
            .verify_payment_release(B256::ZERO, TradeId::new(U256::from(1u64)), U256::ZERO)
            .await;
        assert!(matches!(result, Err(VerifierError::NotConfigured)));
    }

    #[tokio::test]
    async fn shorter_asset_duration_fails_both_legs_as_double_spend() {
        let coordinator = build_coordinator(Arc::new(FixedClock::new(1_000))).await;
        let trade_id = TradeId::new(U256::from(7u64));

        coordinator
            .handle_event(event(ChainRole::Payment, trade_id, 200, 1))
            .await;
        coordinator
            .handle_event(event(ChainRole::Asset, trade_id, 100, 2))
            .await;

        assert!(coordinator.table(ChainRole::Asset).get(trade_id).is_none());
        assert!(coordinator.table(ChainRole::Payment).get(trade_id).is_none());
        assert!(coordinator.pairs().get(trade_id).is_none());
    }

    #[tokio::test]
    async fn confirmation_outside_duration_window_fails_both_legs() {
        let clock = Arc::new(FixedClock::new(1_000));
        let coordinator = build_coordinator(Arc::clone(&clock) as Arc<dyn Clock>).await;
        let trade_id = TradeId::new(U256::from(9u64));

        coordinator
            .handle_event(event(ChainRole::Asset, trade_id, 100, 1))
            .await;
        assert!(coordinator.table(ChainRole::Asset).get(trade_id).is_some());

        // Second request for the same trade id arrives after the
        // duration window has already elapsed.
        clock.advance(101);
        coordinator
            .handle_event(event(ChainRole::Asset, trade_id, 100, 2))
            .await;

        assert!(coordinator.table(ChainRole::Asset).get(trade_id).is_none());
        assert!(coordinator.pairs().get(trade_id).is_none());
    }

    #[tokio::test]
    async fn paired_legs_establish_and_confirm_normally() {
        let coordinator = build_coordinator(Arc::new(FixedClock::new(1_000))).await;
        let trade_id = TradeId::new(U256::from(11u64));

        coordinator
            .handle_event(event(ChainRole::Asset, trade_id, 100, 1))
            .await;
        coordinator
            .handle_event(event(ChainRole::Payment, trade_id, 100, 2))
            .await;
        assert!(coordinator.pairs().get(trade_id).is_some());

        coordinator
            .handle_event(event(ChainRole::Asset, trade_id, 100, 3))
            .await;
        let record = coordinator.table(ChainRole::Asset).get(trade_id).unwrap();
        assert!(record.is_confirmation_phase);
    }

    #[tokio::test]
    async fn creation_and_confirmation_update_their_counters() {
        let coordinator = build_coordinator(Arc::new(FixedClock::new(1_000))).await;
        let trade_id = TradeId::new(U256::from(13u64));

        coordinator
            .handle_event(event(ChainRole::Asset, trade_id, 100, 1))
            .await;
        let snapshot = coordinator.counters().snapshot();
        assert_eq!(snapshot.trades_created, 1);
        assert_eq!(snapshot.trades_confirmed, 0);

        coordinator
            .handle_event(event(ChainRole::Asset, trade_id, 100, 2))
            .await;
        let snapshot = coordinator.counters().snapshot();
        assert_eq!(snapshot.trades_created, 1);
        assert_eq!(snapshot.trades_confirmed, 1);
    }

    #[tokio::test]
    async fn confirmation_window_exceeded_records_confirmation_timeout_failure() {
        let clock = Arc::new(FixedClock::new(1_000));
        let coordinator = build_coordinator(Arc::clone(&clock) as Arc<dyn Clock>).await;
        let trade_id = TradeId::new(U256::from(17u64));

        coordinator
            .handle_event(event(ChainRole::Asset, trade_id, 100, 1))
            .await;
        clock.advance(101);
        coordinator
            .handle_event(event(ChainRole::Asset, trade_id, 100, 2))
            .await;

        assert_eq!(coordinator.counters().snapshot().confirmation_timeout_failures, 1);
    }
}
