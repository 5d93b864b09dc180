//! Wraps a [`ChainClient`] and [`NonceManager`] with the retry/backoff
//! and failure-classification policy for submitting oracle callbacks.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes};
use backon::{BackoffBuilder, ExponentialBuilder};

use crate::{client::ChainClient, error::RpcError, nonce::NonceManager};

/// Submits oracle-callback transactions with an explicit gas limit,
/// nonce management, and a classified retry policy:
///
/// - `NonceTooLow` → resync nonce from chain, retry once.
/// - `AlreadyKnown` → treated as success (it was us).
/// - `RpcUnavailable` / `ReplacementUnderpriced` → bounded exponential
///   backoff retry, up to `max_retries` attempts.
/// - `Reverted` / `InsufficientFunds` → terminal, returned to caller.
pub struct TransactionSubmitter<C> {
    client: Arc<C>,
    nonce_manager: NonceManager,
    gas_limit: u64,
    max_retries: usize,
}

impl<C: ChainClient> TransactionSubmitter<C> {
    /// Builds a submitter for `client`, initializing its nonce manager
    /// from the chain's current transaction count for `signer`.
    pub async fn new(
        client: Arc<C>,
        signer: Address,
        gas_limit: u64,
        max_retries: usize,
    ) -> Result<Self, RpcError> {
        let nonce_manager = NonceManager::init(client.as_ref(), signer).await?;
        Ok(Self {
            client,
            nonce_manager,
            gas_limit,
            max_retries,
        })
    }

    /// The signer address transactions are submitted from.
    pub fn signer(&self) -> Address {
        self.nonce_manager.address()
    }

    /// The underlying chain client, e.g. for read-only calls the
    /// submitter itself doesn't need (state reads, proof fetches).
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Submits a call to `to` with ABI-encoded `data`, retrying per the
    /// policy above. Resolves once the transaction is broadcast (this
    /// does not wait for a receipt — callers that need confirmation
    /// poll [`ChainClient::receipt`] separately, as the
    /// [`crate::client::AlloyChainClient`] doesn't block `send` on mining).
    #[tracing::instrument(level = "debug", skip(self, data), fields(to = %to))]
    pub async fn submit(&self, to: Address, data: Bytes) -> Result<(), RpcError> {
        let start = std::time::Instant::now();
        let result = self.submit_inner(to, data).await;
        metrics::histogram!(crate::metrics::METRICS_ID_SUBMIT_DURATION)
            .record(start.elapsed().as_millis() as f64);
        result
    }

    async fn submit_inner(&self, to: Address, data: Bytes) -> Result<(), RpcError> {
        let mut backoff = ExponentialBuilder::default()
            .with_max_times(self.max_retries)
            .build();
        let mut resynced_once = false;

        loop {
            let guard = self.nonce_manager.reserve().await;
            let nonce = guard.nonce();
            match self.client.send(to, data.clone(), nonce, self.gas_limit).await {
                Ok(_tx_hash) => {
                    guard.commit();
                    return Ok(());
                }
                Err(RpcError::AlreadyKnown) => {
                    tracing::debug!(nonce, "transaction already known, treating as success");
                    guard.commit();
                    return Ok(());
                }
                Err(RpcError::NonceTooLow) if !resynced_once => {
                    drop(guard);
                    tracing::warn!(nonce, "nonce too low, resyncing and retrying once");
                    self.nonce_manager.resync(self.client.as_ref()).await?;
                    resynced_once = true;
                    metrics::counter!(crate::metrics::METRICS_ID_SUBMIT_RETRIES).increment(1);
                    continue;
                }
                Err(err) if err.is_retryable() => {
                    drop(guard);
                    match backoff.next() {
                        Some(delay) => {
                            tracing::warn!(nonce, ?delay, %err, "retryable rpc error, backing off");
                            tokio::time::sleep(delay).await;
                            metrics::counter!(crate::metrics::METRICS_ID_SUBMIT_RETRIES).increment(1);
                            continue;
                        }
                        None => {
                            tracing::error!(nonce, %err, "exhausted retries submitting transaction");
                            return Err(err);
                        }
                    }
                }
                Err(err) => {
                    drop(guard);
                    tracing::error!(nonce, %err, "terminal error submitting transaction");
                    return Err(err);
                }
            }
        }
    }
}
