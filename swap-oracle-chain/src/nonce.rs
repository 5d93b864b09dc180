//! Per-signer monotonic nonce tracking.
//!
//! The nonce is held behind a `tokio::sync::Mutex` so the guard can be
//! kept across the `send` await: only the [`crate::submitter::TransactionSubmitter`]
//! that currently holds the guard may use or advance the nonce, giving
//! commit-on-success semantics — a failed send never advances
//! `next_nonce`, so it can't leave a permanent gap.

use alloy::primitives::Address;
use tokio::sync::{Mutex, MutexGuard};

use crate::{client::ChainClient, error::RpcError};

/// Tracks `next_nonce` for a single signer address.
pub struct NonceManager {
    address: Address,
    next_nonce: Mutex<u64>,
}

/// Holds the lock for one in-flight send; dropping without calling
/// [`NonceGuard::commit`] leaves `next_nonce` untouched, so a failed
/// send never burns a nonce.
pub struct NonceGuard<'a> {
    guard: MutexGuard<'a, u64>,
    nonce: u64,
}

impl NonceGuard<'_> {
    /// The nonce reserved for this send attempt.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Records that `nonce` was accepted by the chain; advances
    /// `next_nonce` to `nonce + 1`.
    pub fn commit(mut self) {
        *self.guard = self.nonce + 1;
    }
}

impl NonceManager {
    /// Initializes `next_nonce` from the chain's current transaction
    /// count for `address`.
    pub async fn init(client: &dyn ChainClient, address: Address) -> Result<Self, RpcError> {
        let next_nonce = client.transaction_count(address).await?;
        Ok(Self {
            address,
            next_nonce: Mutex::new(next_nonce),
        })
    }

    /// The signer address this manager tracks.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Acquires the lock and reserves the current `next_nonce` for one
    /// send attempt. The caller must either [`NonceGuard::commit`] on
    /// success or drop the guard on failure.
    pub async fn reserve(&self) -> NonceGuard<'_> {
        let guard = self.next_nonce.lock().await;
        let nonce = *guard;
        NonceGuard { guard, nonce }
    }

    /// Resynchronizes `next_nonce` from the chain. Called after a
    /// `NonceTooLow` response.
    pub async fn resync(&self, client: &dyn ChainClient) -> Result<(), RpcError> {
        let guard = self.next_nonce.lock().await;
        let mut guard = guard;
        *guard = client.transaction_count(self.address).await?;
        tracing::warn!(address = %self.address, resynced_nonce = *guard, "nonce desync detected, resynced from chain");
        Ok(())
    }
}
