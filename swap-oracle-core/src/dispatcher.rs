//! Per-trade-id serialization: at most one handler runs for
//! a given `(chain, trade_id)` at a time. Events that arrive while one
//! is already in flight are queued and drained FIFO by the same task,
//! rather than spawning a new one per event.

use std::sync::Arc;

use swap_oracle_types::TimeRequestEvent;

use crate::coordinator::SwapCoordinator;

/// Accepts events from the two Event Pumps and hands them to the
/// [`SwapCoordinator`] with the per-trade serialization guarantee.
pub struct TradeDispatcher<C> {
    coordinator: Arc<SwapCoordinator<C>>,
}

impl<C: swap_oracle_chain::client::ChainClient> TradeDispatcher<C> {
    /// Wraps `coordinator`.
    pub fn new(coordinator: Arc<SwapCoordinator<C>>) -> Self {
        Self { coordinator }
    }

    /// Submits `event` for handling. Returns immediately; the actual
    /// handling (and any queued follow-ups) runs on a spawned task.
    pub fn dispatch(&self, event: TimeRequestEvent) {
        let table = self.coordinator.table(event.chain).clone();
        let trade_id = event.trade_id;

        if !table.try_mark_processing(trade_id) {
            tracing::debug!(chain = %event.chain, trade_id = %trade_id, "trade busy, deferring event");
            table.enqueue_deferred(trade_id, event);
            return;
        }

        let coordinator = Arc::clone(&self.coordinator);
        tokio::spawn(async move {
            let mut next = event;
            loop {
                coordinator.handle_event(next).await;
                match table.pop_deferred(trade_id) {
                    Some(deferred) => next = deferred,
                    None => break,
                }
            }
            table.unmark_processing(trade_id);
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use swap_oracle_types::{ChainRole, RequestId, TimeRequestEvent};

    use super::*;
    use crate::{
        coordinator::ChainHandle,
        test_support::{FixedClock, MockChainClient},
    };

    async fn build_coordinator() -> Arc<SwapCoordinator<MockChainClient>> {
        let client = Arc::new(MockChainClient::default());
        let asset_submitter = Arc::new(
            swap_oracle_chain::submitter::TransactionSubmitter::new(
                Arc::clone(&client),
                alloy::primitives::Address::ZERO,
                200_000,
                3,
            )
            .await
            .unwrap(),
        );
        let payment_submitter = Arc::new(
            swap_oracle_chain::submitter::TransactionSubmitter::new(
                client,
                alloy::primitives::Address::ZERO,
                200_000,
                3,
            )
            .await
            .unwrap(),
        );
        let asset = ChainHandle::new(ChainRole::Asset, Address::repeat_byte(1), asset_submitter);
        let payment = ChainHandle::new(
            ChainRole::Payment,
            Address::repeat_byte(2),
            payment_submitter,
        );
        Arc::new(SwapCoordinator::new(
            asset,
            payment,
            Arc::new(FixedClock::new(1_000)),
            Arc::new(crate::metrics::Counters::default()),
        ))
    }

    use alloy::primitives::Address;

    #[tokio::test]
    async fn events_for_the_same_trade_are_serialized() {
        let coordinator = build_coordinator().await;
        let dispatcher = TradeDispatcher::new(Arc::clone(&coordinator));

        let trade_id = swap_oracle_types::TradeId::new(alloy::primitives::U256::from(1u64));
        let creation = TimeRequestEvent {
            chain: ChainRole::Asset,
            request_id: RequestId::new(alloy::primitives::B256::repeat_byte(1)),
            trade_id,
            duration: 100,
            block_number: 1,
            block_timestamp: 1_000,
        };
        let confirmation = TimeRequestEvent {
            request_id: RequestId::new(alloy::primitives::B256::repeat_byte(2)),
            ..creation
        };

        dispatcher.dispatch(creation);
        dispatcher.dispatch(confirmation);

        // Give the spawned task a chance to drain both events.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let record = coordinator.table(ChainRole::Asset).get(trade_id).unwrap();
        assert!(record.is_confirmation_phase);
    }
}
