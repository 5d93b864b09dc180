//! Swap Oracle operator CLI.
//!
//! This is the main entry point for the oracle process. It initializes
//! tracing and metrics, parses configuration from the command line or
//! environment, and starts the oracle service with graceful shutdown
//! on SIGINT/SIGTERM.

use std::{process::ExitCode, sync::atomic::Ordering};

use clap::Parser;
use eyre::Context;
use swap_oracle_service::config::OracleConfig;

#[tokio::main]
async fn main() -> eyre::Result<ExitCode> {
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .expect("can install");
    let tracing_config = nodes_observability::TracingConfig::try_from_env()?;
    let _tracing_handle = nodes_observability::initialize_tracing(&tracing_config)?;

    tracing::info!("{}", nodes_common::version_info!());

    let config = OracleConfig::parse();
    tracing::info!("starting swap-oracle with config: {config:#?}");

    let (cancellation_token, is_graceful_shutdown) =
        nodes_common::spawn_shutdown_task(nodes_common::default_shutdown_signal());

    let bind_addr = config.bind_addr;
    let max_wait_time_shutdown = config.max_wait_time_shutdown;

    let (router, tasks) = swap_oracle_service::start(config, cancellation_token.clone())
        .await
        .context("while starting swap oracle")?;

    tracing::info!("binding to {bind_addr}");
    let tcp_listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .context("while binding tcp listener")?;

    let axum_cancel_token = cancellation_token.clone();
    let server = tokio::spawn(async move {
        let axum_shutdown_signal = axum_cancel_token.clone();
        let result = axum::serve(tcp_listener, router)
            .with_graceful_shutdown(async move { axum_shutdown_signal.cancelled().await })
            .await;
        tracing::info!("axum server shutdown");
        if let Err(err) = result {
            tracing::error!("got error from axum: {err:?}");
        }
        axum_cancel_token.cancel();
    });

    tracing::info!("everything started successfully - now waiting for shutdown...");
    cancellation_token.cancelled().await;

    tracing::info!("waiting for shutdown of services (max wait time {max_wait_time_shutdown:?})..");
    match tokio::time::timeout(max_wait_time_shutdown, async move {
        tokio::join!(server, tasks.join())
    })
    .await
    {
        Ok((server_result, tasks_result)) => {
            if let Err(err) = server_result {
                tracing::error!("server task panicked: {err:?}");
            }
            if let Err(err) = tasks_result {
                tracing::error!("background task error: {err:?}");
            }
            tracing::info!("successfully finished shutdown in time");
        }
        Err(_) => {
            is_graceful_shutdown.store(false, Ordering::Relaxed);
            tracing::warn!("could not finish shutdown in time");
        }
    }

    tracing::info!("good night!");
    if is_graceful_shutdown.load(Ordering::Relaxed) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
