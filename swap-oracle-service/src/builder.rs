//! Wires together both chains' clients, submitters, the coordinator,
//! dispatcher, sweeper, and event pumps into a running oracle plus its
//! status-surface router.

use std::sync::Arc;

use eyre::Context as _;
use swap_oracle_chain::{
    client::AlloyChainClient, connect::connect_signer, submitter::TransactionSubmitter,
};
use swap_oracle_core::{
    coordinator::{ChainHandle, SwapCoordinator},
    dispatcher::TradeDispatcher,
    metrics::Counters,
    pump::EventPump,
    sweeper::TimeoutSweeper,
    verifier::{self, CrossChainVerifier},
};
use swap_oracle_types::{ChainRole, Clock, SystemClock};
use tokio_util::sync::CancellationToken;

use crate::{api, config::OracleConfig, state::AppState};

/// The background tasks spawned by [`start`]. Await [`OracleTasks::join`]
/// after cancelling the token for graceful shutdown.
pub struct OracleTasks {
    asset_pump: tokio::task::JoinHandle<eyre::Result<()>>,
    payment_pump: tokio::task::JoinHandle<eyre::Result<()>>,
    sweeper: tokio::task::JoinHandle<()>,
}

impl OracleTasks {
    /// Joins every spawned background task.
    pub async fn join(self) -> eyre::Result<()> {
        let (asset, payment, sweeper) =
            tokio::join!(self.asset_pump, self.payment_pump, self.sweeper);
        asset??;
        payment??;
        sweeper?;
        Ok(())
    }
}

/// Starts the swap oracle: connects both chains, wires the coordinator
/// and its satellite tasks, and returns the status-surface router
/// alongside the spawned background tasks.
pub async fn start(
    config: OracleConfig,
    cancellation_token: CancellationToken,
) -> eyre::Result<(axum::Router, OracleTasks)> {
    swap_oracle_core::metrics::describe_metrics();
    swap_oracle_chain::metrics::describe_metrics();

    tracing::info!("connecting to asset chain..");
    let (asset_provider, asset_signer) =
        connect_signer(&config.asset_rpc_url, &config.resolve_asset_signer_key())
            .await
            .context("while connecting to asset chain")?;
    tracing::info!("connecting to payment chain..");
    let (payment_provider, payment_signer) =
        connect_signer(&config.payment_rpc_url, &config.resolve_payment_signer_key())
            .await
            .context("while connecting to payment chain")?;

    let asset_client = Arc::new(AlloyChainClient::new(asset_provider));
    let payment_client = Arc::new(AlloyChainClient::new(payment_provider));

    let asset_submitter = Arc::new(
        TransactionSubmitter::new(
            Arc::clone(&asset_client),
            asset_signer,
            config.callback_gas_limit,
            config.submit_max_retries,
        )
        .await
        .context("while initializing asset chain nonce manager")?,
    );
    let payment_submitter = Arc::new(
        TransactionSubmitter::new(
            Arc::clone(&payment_client),
            payment_signer,
            config.callback_gas_limit,
            config.submit_max_retries,
        )
        .await
        .context("while initializing payment chain nonce manager")?,
    );

    let asset_handle = ChainHandle::new(
        ChainRole::Asset,
        config.asset_contract_address,
        asset_submitter,
    );
    let payment_handle = ChainHandle::new(
        ChainRole::Payment,
        config.payment_contract_address,
        payment_submitter,
    );

    let clock = Arc::new(SystemClock) as Arc<dyn Clock>;
    let counters = Arc::new(Counters::default());
    let confirmation_table = config
        .verifier_confirmation_table
        .clone()
        .unwrap_or_else(verifier::default_confirmation_table);
    let payment_verifier = Arc::new(CrossChainVerifier::new(
        Arc::clone(&payment_client),
        config.payment_contract_address,
        confirmation_table,
    ));
    let coordinator = Arc::new(
        SwapCoordinator::new(
            asset_handle,
            payment_handle,
            Arc::clone(&clock),
            Arc::clone(&counters),
        )
        .with_payment_verifier(payment_verifier),
    );
    let dispatcher = Arc::new(TradeDispatcher::new(Arc::clone(&coordinator)));
    let started_services = nodes_common::StartedServices::new();

    let asset_pump_task = EventPump::new(
        ChainRole::Asset,
        Arc::clone(&asset_client),
        config.asset_contract_address,
        Arc::clone(&dispatcher),
        config.event_poll_interval,
        started_services.new_service(),
    );
    let asset_last_processed_block = asset_pump_task.last_processed_block_handle();
    let payment_pump_task = EventPump::new(
        ChainRole::Payment,
        Arc::clone(&payment_client),
        config.payment_contract_address,
        Arc::clone(&dispatcher),
        config.event_poll_interval,
        started_services.new_service(),
    );
    let payment_last_processed_block = payment_pump_task.last_processed_block_handle();

    let sweeper = TimeoutSweeper::new(Arc::clone(&coordinator), clock, config.sweep_interval);
    started_services.new_service().store(true, std::sync::atomic::Ordering::Relaxed);

    tracing::info!("spawning event pumps and timeout sweeper..");
    let asset_pump = tokio::spawn(asset_pump_task.run(cancellation_token.clone()));
    let payment_pump = tokio::spawn(payment_pump_task.run(cancellation_token.clone()));
    let sweeper_handle = tokio::spawn(sweeper.run(cancellation_token.clone()));

    let state = AppState {
        coordinator,
        asset_last_processed_block,
        payment_last_processed_block,
        asset_client,
        payment_client,
        counters,
        log_file: config.log_file,
        expose_logs: config.status_expose_logs,
        started_services,
    };

    Ok((
        api::routes(state),
        OracleTasks {
            asset_pump,
            payment_pump,
            sweeper: sweeper_handle,
        },
    ))
}
