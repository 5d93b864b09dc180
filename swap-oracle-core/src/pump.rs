//! Event Pump: one instance per chain. Polls block height,
//! queries `TimeRequestSent` logs in the unprocessed range, and
//! forwards them to the [`TradeDispatcher`]. The block cursor only
//! advances after the whole range has been delivered, so a transport
//! failure mid-range simply retries the same range next tick.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use alloy::{
    eips::BlockNumberOrTag,
    primitives::Address,
    rpc::types::Filter,
    sol_types::SolEvent as _,
};
use swap_oracle_chain::client::ChainClient;
use swap_oracle_types::{ChainRole, RequestId, TimeRequestEvent, TradeId, chain::EscrowContract};
use tokio_util::sync::CancellationToken;

use crate::dispatcher::TradeDispatcher;

/// Polls one chain's escrow contract for `TimeRequestSent` events.
pub struct EventPump<C> {
    chain: ChainRole,
    client: Arc<C>,
    contract_address: Address,
    dispatcher: Arc<TradeDispatcher<C>>,
    poll_interval: Duration,
    last_processed_block: Arc<AtomicU64>,
    started: Arc<AtomicBool>,
}

impl<C: ChainClient> EventPump<C> {
    /// Builds a pump for `chain`, watching `contract_address` via
    /// `client`. `started` is flipped to `true` once the pump has
    /// fetched its starting cursor, for `/health`'s readiness gate.
    pub fn new(
        chain: ChainRole,
        client: Arc<C>,
        contract_address: Address,
        dispatcher: Arc<TradeDispatcher<C>>,
        poll_interval: Duration,
        started: Arc<AtomicBool>,
    ) -> Self {
        Self {
            chain,
            client,
            contract_address,
            dispatcher,
            poll_interval,
            last_processed_block: Arc::new(AtomicU64::new(0)),
            started,
        }
    }

    /// A cheaply-clonable handle to the last-processed-block cursor,
    /// for the status surface to read without touching the pump itself.
    pub fn last_processed_block_handle(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.last_processed_block)
    }

    /// Runs the poll loop until `cancellation_token` fires. Starts
    /// from the chain's current head.
    pub async fn run(self, cancellation_token: CancellationToken) -> eyre::Result<()> {
        let mut last_processed_block = self.client.block_number().await?;
        self.last_processed_block.store(last_processed_block, Ordering::Relaxed);
        tracing::info!(chain = %self.chain, last_processed_block, "event pump starting");
        self.started.store(true, Ordering::Relaxed);
        let mut ticker = tokio::time::interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.poll(last_processed_block).await {
                        Ok(new_cursor) => {
                            last_processed_block = new_cursor;
                            self.last_processed_block.store(new_cursor, Ordering::Relaxed);
                        }
                        Err(err) => tracing::warn!(chain = %self.chain, %err, "event pump poll failed, retrying same range next tick"),
                    }
                }
                _ = cancellation_token.cancelled() => {
                    tracing::info!(chain = %self.chain, "event pump shutting down");
                    return Ok(());
                }
            }
        }
    }

    /// Queries and dispatches `(last_processed_block, latest]`,
    /// returning the new cursor. Exposed separately from [`Self::run`]
    /// for deterministic tests.
    pub async fn poll(&self, last_processed_block: u64) -> Result<u64, swap_oracle_chain::error::RpcError> {
        let latest = self.client.block_number().await?;
        metrics::gauge!(crate::metrics::METRICS_ID_BLOCK_LAG, crate::metrics::METRICS_ATTRID_CHAIN => self.chain.to_string())
            .set(latest.saturating_sub(last_processed_block) as f64);
        if latest <= last_processed_block {
            return Ok(last_processed_block);
        }

        let filter = Filter::new()
            .address(self.contract_address)
            .from_block(BlockNumberOrTag::Number(last_processed_block + 1))
            .to_block(BlockNumberOrTag::Number(latest))
            .event_signature(EscrowContract::TimeRequestSent::SIGNATURE_HASH);
        let logs = self.client.logs(&filter).await?;

        for log in logs {
            let block_number = log.block_number.unwrap_or(latest);
            let decoded = match log.log_decode::<EscrowContract::TimeRequestSent>() {
                Ok(decoded) => decoded,
                Err(err) => {
                    tracing::warn!(chain = %self.chain, block_number, %err, "skipping malformed TimeRequestSent log");
                    continue;
                }
            };
            let block_timestamp = self
                .client
                .block(block_number, false)
                .await
                .ok()
                .flatten()
                .map(|block| block.header.timestamp)
                .unwrap_or_default();

            let event = TimeRequestEvent {
                chain: self.chain,
                request_id: RequestId::new(decoded.inner.data.requestId),
                trade_id: TradeId::new(decoded.inner.data.tradeId),
                duration: u64::try_from(decoded.inner.data.duration).unwrap_or(u64::MAX),
                block_number,
                block_timestamp,
            };
            tracing::debug!(chain = %self.chain, trade_id = %event.trade_id, "dispatching TimeRequestSent event");
            self.dispatcher.dispatch(event);
        }

        Ok(latest)
    }
}
