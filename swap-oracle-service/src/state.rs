//! Shared application state for the status HTTP surface.

use std::{path::PathBuf, sync::Arc};

use nodes_common::StartedServices;
use swap_oracle_chain::client::ChainClient;
use swap_oracle_core::{SwapCoordinator, metrics::Counters};
use swap_oracle_types::ChainRole;

/// State shared across every status-surface handler.
pub struct AppState<C> {
    /// The coordinator, for reading both chains' in-memory tables and pairings.
    pub coordinator: Arc<SwapCoordinator<C>>,
    /// Last-processed-block cursor for the Asset chain's Event Pump.
    pub asset_last_processed_block: Arc<std::sync::atomic::AtomicU64>,
    /// Last-processed-block cursor for the Payment chain's Event Pump.
    pub payment_last_processed_block: Arc<std::sync::atomic::AtomicU64>,
    /// Chain client for the Asset chain, for `/health`'s reachability probe.
    pub asset_client: Arc<C>,
    /// Chain client for the Payment chain, for `/health`'s reachability probe.
    pub payment_client: Arc<C>,
    /// Process-wide lifetime counters.
    pub counters: Arc<Counters>,
    /// Path the `/logs` endpoint tails.
    pub log_file: PathBuf,
    /// Whether `/logs` is registered at all.
    pub expose_logs: bool,
    /// Readiness flags for the background tasks `/health` aggregates.
    pub started_services: StartedServices,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            coordinator: Arc::clone(&self.coordinator),
            asset_last_processed_block: Arc::clone(&self.asset_last_processed_block),
            payment_last_processed_block: Arc::clone(&self.payment_last_processed_block),
            asset_client: Arc::clone(&self.asset_client),
            payment_client: Arc::clone(&self.payment_client),
            counters: Arc::clone(&self.counters),
            log_file: self.log_file.clone(),
            expose_logs: self.expose_logs,
            started_services: self.started_services.clone(),
        }
    }
}

impl<C: ChainClient> AppState<C> {
    /// The last-processed-block cursor for `role`.
    pub fn last_processed_block(&self, role: ChainRole) -> u64 {
        let handle = match role {
            ChainRole::Asset => &self.asset_last_processed_block,
            ChainRole::Payment => &self.payment_last_processed_block,
        };
        handle.load(std::sync::atomic::Ordering::Relaxed)
    }

    /// The chain client for `role`.
    pub fn client(&self, role: ChainRole) -> &Arc<C> {
        match role {
            ChainRole::Asset => &self.asset_client,
            ChainRole::Payment => &self.payment_client,
        }
    }
}
