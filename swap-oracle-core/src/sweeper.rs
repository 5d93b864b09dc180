//! Timeout Sweeper: periodic scan that drives expired legs
//! to failure or execution-timeout, propagating to the paired leg.

use std::{sync::Arc, time::Duration};

use swap_oracle_chain::client::ChainClient;
use swap_oracle_types::{ChainRole, Clock, TradeId};
use tokio_util::sync::CancellationToken;

use crate::{
    coordinator::{ChainHandle, SwapCoordinator},
    record::TradeRecord,
};

/// What the sweeper decided to do about one record, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Classification {
    Healthy,
    ExecutionTimeout,
    ConfirmationTimeout,
}

fn classify(record: &TradeRecord, now: u64) -> Classification {
    if let Some(confirmation_time) = record.confirmation_time {
        if now.saturating_sub(confirmation_time) > record.duration
            && now.saturating_sub(record.inception_time) <= 2 * record.duration
        {
            return Classification::ExecutionTimeout;
        }
    }
    if now.saturating_sub(record.inception_time) > record.duration {
        return Classification::ConfirmationTimeout;
    }
    Classification::Healthy
}

/// Periodically scans both chains' tables and drives expired legs to
/// the terminal state their classification calls for.
pub struct TimeoutSweeper<C> {
    coordinator: Arc<SwapCoordinator<C>>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl<C: ChainClient> TimeoutSweeper<C> {
    /// Builds a sweeper ticking every `interval`.
    pub fn new(coordinator: Arc<SwapCoordinator<C>>, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            coordinator,
            clock,
            interval,
        }
    }

    /// Runs the sweep loop until `cancellation_token` fires.
    pub async fn run(self, cancellation_token: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.sweep_once().await,
                _ = cancellation_token.cancelled() => {
                    tracing::info!("timeout sweeper shutting down");
                    break;
                }
            }
        }
    }

    /// Runs a single sweep pass over both chains. Exposed separately
    /// from [`Self::run`] so tests can drive it deterministically.
    pub async fn sweep_once(&self) {
        self.sweep_chain(ChainRole::Asset).await;
        self.sweep_chain(ChainRole::Payment).await;
    }

    async fn sweep_chain(&self, role: ChainRole) {
        let now = self.clock.now();
        let handle = match role {
            ChainRole::Asset => self.coordinator.asset(),
            ChainRole::Payment => self.coordinator.payment(),
        };
        for record in handle.table.snapshot() {
            let classification = classify(&record, now);
            if classification == Classification::Healthy {
                continue;
            }
            if !handle.table.try_mark_processing(record.trade_id) {
                continue;
            }
            self.sweep_trade(handle, record.trade_id, classification).await;
            handle.table.unmark_processing(record.trade_id);
        }
    }

    async fn sweep_trade(
        &self,
        handle: &ChainHandle<C>,
        trade_id: TradeId,
        classification: Classification,
    ) {
        let client = handle.submitter.client();
        match client
            .read_trade_state(handle.contract_address, trade_id, handle.role)
            .await
        {
            Ok(Some(state)) if state.is_terminal() => {
                tracing::debug!(trade_id = %trade_id, chain = %handle.role, ?state, "on-chain state already terminal, dropping local record");
                if state == swap_oracle_types::TradeState::Completed {
                    self.coordinator.counters().record_trade_completed();
                }
                handle.table.remove(trade_id);
                self.coordinator.pairs().clear(trade_id);
                return;
            }
            Ok(None) => {
                tracing::debug!(trade_id = %trade_id, chain = %handle.role, "trade no longer exists on-chain, dropping local record");
                handle.table.remove(trade_id);
                self.coordinator.pairs().clear(trade_id);
                return;
            }
            Ok(Some(_)) => {}
            Err(err) => {
                tracing::warn!(%err, trade_id = %trade_id, chain = %handle.role, "could not read on-chain state, skipping this sweep");
                return;
            }
        }

        let data = match classification {
            Classification::ExecutionTimeout => crate::encode::handle_execution_timeout(trade_id),
            Classification::ConfirmationTimeout => crate::encode::handle_failed_confirmation(trade_id),
            Classification::Healthy => unreachable!("healthy records are filtered before sweep_trade"),
        };
        match handle.submitter.submit(handle.contract_address, data).await {
            Ok(()) => {
                tracing::info!(trade_id = %trade_id, chain = %handle.role, ?classification, "swept expired leg");
                match classification {
                    Classification::ExecutionTimeout => {
                        self.coordinator.counters().record_execution_timeout_failure();
                    }
                    Classification::ConfirmationTimeout => {
                        self.coordinator.counters().record_confirmation_timeout_failure();
                    }
                    Classification::Healthy => unreachable!("healthy records are filtered before sweep_trade"),
                }
            }
            Err(err) => {
                tracing::error!(%err, trade_id = %trade_id, chain = %handle.role, "sweeper callback submit failed");
                if matches!(err, swap_oracle_chain::error::RpcError::Reverted(_)) {
                    self.coordinator.counters().record_terminal_callback_revert();
                }
            }
        }
        handle.table.remove(trade_id);

        let peer = match handle.role {
            ChainRole::Asset => self.coordinator.payment(),
            ChainRole::Payment => self.coordinator.asset(),
        };
        let peer_data = match classification {
            Classification::ExecutionTimeout => crate::encode::handle_execution_timeout(trade_id),
            Classification::ConfirmationTimeout => crate::encode::handle_failed_confirmation(trade_id),
            Classification::Healthy => unreachable!("healthy records are filtered before sweep_trade"),
        };
        self.coordinator
            .fail_peer_leg_with(peer, trade_id, peer_data)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, B256, U256};
    use swap_oracle_types::RequestId;

    use super::*;
    use crate::{
        metrics::Counters,
        record::TradeRecord,
        test_support::{FixedClock, MockChainClient},
    };

    #[test]
    fn healthy_record_within_both_windows_is_untouched() {
        let record = TradeRecord::new_created(
            ChainRole::Asset,
            TradeId::new(U256::from(1u64)),
            100,
            RequestId::new(B256::ZERO),
            1_000,
        );
        assert_eq!(classify(&record, 1_050), Classification::Healthy);
    }

    #[test]
    fn unconfirmed_record_past_duration_is_a_confirmation_timeout() {
        let record = TradeRecord::new_created(
            ChainRole::Asset,
            TradeId::new(U256::from(1u64)),
            100,
            RequestId::new(B256::ZERO),
            1_000,
        );
        assert_eq!(
            classify(&record, 1_101),
            Classification::ConfirmationTimeout
        );
    }

    #[test]
    fn confirmed_record_past_its_execution_window_is_an_execution_timeout() {
        let mut record = TradeRecord::new_created(
            ChainRole::Asset,
            TradeId::new(U256::from(1u64)),
            100,
            RequestId::new(B256::ZERO),
            1_000,
        );
        record.is_confirmation_phase = true;
        record.confirmation_time = Some(1_050);
        assert_eq!(
            classify(&record, 1_200),
            Classification::ExecutionTimeout
        );
    }

    #[tokio::test]
    async fn sweep_drops_record_whose_on_chain_state_is_already_terminal() {
        let client = Arc::new(MockChainClient::default());
        let asset_contract = Address::repeat_byte(1);
        let trade_id = TradeId::new(U256::from(5u64));
        client.set_trade_state(
            asset_contract,
            trade_id,
            ChainRole::Asset,
            swap_oracle_types::TradeState::Completed,
        );

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
        let asset = ChainHandle::new(ChainRole::Asset, asset_contract, asset_submitter);
        let payment = ChainHandle::new(ChainRole::Payment, Address::repeat_byte(2), payment_submitter);
        let clock = Arc::new(FixedClock::new(2_000));
        let coordinator = Arc::new(SwapCoordinator::new(
            asset,
            payment,
            Arc::clone(&clock) as Arc<dyn Clock>,
            Arc::new(Counters::default()),
        ));

        let record = TradeRecord::new_created(
            ChainRole::Asset,
            trade_id,
            100,
            RequestId::new(B256::ZERO),
            1_000,
        );
        coordinator.table(ChainRole::Asset).insert(record);

        let sweeper = TimeoutSweeper::new(Arc::clone(&coordinator), clock, Duration::from_secs(30));
        sweeper.sweep_once().await;

        assert!(coordinator.table(ChainRole::Asset).get(trade_id).is_none());
        assert_eq!(coordinator.counters().snapshot().trades_completed, 1);
    }

    #[tokio::test]
    async fn sweep_does_not_count_an_already_failed_record_as_completed() {
        let client = Arc::new(MockChainClient::default());
        let asset_contract = Address::repeat_byte(1);
        let trade_id = TradeId::new(U256::from(6u64));
        client.set_trade_state(
            asset_contract,
            trade_id,
            ChainRole::Asset,
            swap_oracle_types::TradeState::Failed,
        );

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
        let asset = ChainHandle::new(ChainRole::Asset, asset_contract, asset_submitter);
        let payment = ChainHandle::new(ChainRole::Payment, Address::repeat_byte(2), payment_submitter);
        let clock = Arc::new(FixedClock::new(2_000));
        let coordinator = Arc::new(SwapCoordinator::new(
            asset,
            payment,
            Arc::clone(&clock) as Arc<dyn Clock>,
            Arc::new(Counters::default()),
        ));

        let record = TradeRecord::new_created(
            ChainRole::Asset,
            trade_id,
            100,
            RequestId::new(B256::ZERO),
            1_000,
        );
        coordinator.table(ChainRole::Asset).insert(record);

        let sweeper = TimeoutSweeper::new(Arc::clone(&coordinator), clock, Duration::from_secs(30));
        sweeper.sweep_once().await;

        assert!(coordinator.table(ChainRole::Asset).get(trade_id).is_none());
        assert_eq!(coordinator.counters().snapshot().trades_completed, 0);
    }
}
