//! Configuration types and CLI/environment parsing for a swap oracle instance.

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use alloy::primitives::{Address, U256};
use clap::{Parser, ValueEnum};
use secrecy::SecretString;
use swap_oracle_core::verifier::ConfirmationTable;

/// The environment the oracle is running in.
///
/// Main usage for the `Environment` is to call
/// [`Environment::assert_is_dev`]. Convenience behavior that is only
/// safe off mainnet (like falling back to anvil's well-known default
/// signer key) asserts it is called from the `dev` environment.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Environment {
    /// Production environment.
    Prod,
    /// Development environment.
    Dev,
}

impl Environment {
    /// Asserts that `Environment` is `dev`. Panics if not the case.
    pub fn assert_is_dev(&self) {
        assert!(matches!(self, Environment::Dev), "Is not dev environment")
    }
}

/// The configuration for the swap oracle.
///
/// Can be configured via environment variables or command line
/// arguments using `clap`.
#[derive(Parser, Debug)]
pub struct OracleConfig {
    /// The environment of the swap oracle (either `prod` or `dev`).
    #[clap(long, env = "SWAP_ORACLE_ENVIRONMENT", default_value = "prod")]
    pub environment: Environment,

    /// The bind addr of the status HTTP surface.
    #[clap(long, env = "SWAP_ORACLE_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// JSON-RPC websocket endpoint for the Asset Chain.
    #[clap(long, env = "SWAP_ORACLE_ASSET_RPC_URL")]
    pub asset_rpc_url: SecretString,

    /// JSON-RPC websocket endpoint for the Payment Chain.
    #[clap(long, env = "SWAP_ORACLE_PAYMENT_RPC_URL")]
    pub payment_rpc_url: SecretString,

    /// Escrow contract address on the Asset Chain.
    #[clap(long, env = "SWAP_ORACLE_ASSET_CONTRACT_ADDRESS")]
    pub asset_contract_address: Address,

    /// Escrow contract address on the Payment Chain.
    #[clap(long, env = "SWAP_ORACLE_PAYMENT_CONTRACT_ADDRESS")]
    pub payment_contract_address: Address,

    /// Private key the oracle signs Asset-chain callbacks with. If
    /// unset, the `dev` environment falls back to anvil's well-known
    /// default account; any other environment errors.
    #[clap(long, env = "SWAP_ORACLE_ASSET_SIGNER_KEY")]
    pub asset_signer_key: Option<SecretString>,

    /// Private key the oracle signs Payment-chain callbacks with. Same
    /// dev-only fallback as `asset_signer_key`.
    #[clap(long, env = "SWAP_ORACLE_PAYMENT_SIGNER_KEY")]
    pub payment_signer_key: Option<SecretString>,

    /// Cadence of each chain's Event Pump.
    #[clap(long, env = "SWAP_ORACLE_EVENT_POLL_INTERVAL", value_parser = humantime::parse_duration, default_value = "15s")]
    pub event_poll_interval: Duration,

    /// Cadence of the Timeout Sweeper.
    #[clap(long, env = "SWAP_ORACLE_SWEEP_INTERVAL", value_parser = humantime::parse_duration, default_value = "30s")]
    pub sweep_interval: Duration,

    /// Fixed gas limit for every oracle callback transaction.
    #[clap(long, env = "SWAP_ORACLE_CALLBACK_GAS_LIMIT", default_value = "200000")]
    pub callback_gas_limit: u64,

    /// Submitter retry cap for recoverable RPC errors.
    #[clap(long, env = "SWAP_ORACLE_SUBMIT_MAX_RETRIES", default_value = "3")]
    pub submit_max_retries: usize,

    /// Path the status surface's `/logs` endpoint tails; also passed
    /// to the tracing file appender.
    #[clap(long, env = "SWAP_ORACLE_LOG_FILE", default_value = "swap-oracle.log")]
    pub log_file: PathBuf,

    /// Registers the `/logs` endpoint on the status surface. Off by
    /// default since it tails the process's own log file over HTTP.
    #[clap(long, env = "SWAP_ORACLE_STATUS_EXPOSE_LOGS")]
    pub status_expose_logs: bool,

    /// Overrides the Cross-Chain Verifier's required-confirmations
    /// tiers, as a comma-separated list of `wei=blocks` pairs sorted
    /// by descending value threshold, e.g. `10000000000000000000=30,0=10`.
    #[clap(long, env = "SWAP_ORACLE_VERIFIER_CONFIRMATION_TABLE", value_parser = parse_confirmation_table)]
    pub verifier_confirmation_table: Option<ConfirmationTable>,

    /// Max wait time the service waits for its background tasks during shutdown.
    #[clap(long, env = "SWAP_ORACLE_MAX_WAIT_TIME_SHUTDOWN", default_value = "10s", value_parser = humantime::parse_duration)]
    pub max_wait_time_shutdown: Duration,
}

/// Anvil's well-known default account #0 private key, used only as a
/// `dev`-environment fallback when a signer key is left unset.
pub const ANVIL_DEFAULT_SIGNER_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

impl OracleConfig {
    /// Resolves `asset_signer_key`, falling back to
    /// [`ANVIL_DEFAULT_SIGNER_KEY`] if unset, after asserting
    /// `environment` is `dev`.
    pub fn resolve_asset_signer_key(&self) -> SecretString {
        resolve_signer_key(self.environment, &self.asset_signer_key)
    }

    /// Resolves `payment_signer_key`, same fallback as
    /// [`Self::resolve_asset_signer_key`].
    pub fn resolve_payment_signer_key(&self) -> SecretString {
        resolve_signer_key(self.environment, &self.payment_signer_key)
    }
}

fn resolve_signer_key(environment: Environment, key: &Option<SecretString>) -> SecretString {
    match key {
        Some(key) => key.clone(),
        None => {
            environment.assert_is_dev();
            tracing::warn!("no signer key configured, falling back to anvil's default dev account");
            SecretString::from(ANVIL_DEFAULT_SIGNER_KEY)
        }
    }
}

fn parse_confirmation_table(raw: &str) -> Result<ConfirmationTable, String> {
    let mut table: ConfirmationTable = raw
        .split(',')
        .map(|pair| {
            let (wei, blocks) = pair
                .split_once('=')
                .ok_or_else(|| format!("expected `wei=blocks`, got `{pair}`"))?;
            let wei = wei
                .trim()
                .parse::<U256>()
                .map_err(|err| format!("invalid wei threshold `{wei}`: {err}"))?;
            let blocks = blocks
                .trim()
                .parse::<u64>()
                .map_err(|err| format!("invalid block count `{blocks}`: {err}"))?;
            Ok((wei, blocks))
        })
        .collect::<Result<_, String>>()?;
    table.sort_by(|(a, _), (b, _)| b.cmp(a));
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_sorts_confirmation_table() {
        let table = parse_confirmation_table("0=10,1000=20").unwrap();
        assert_eq!(table, vec![(U256::from(1000u64), 20), (U256::ZERO, 10)]);
    }

    #[test]
    fn rejects_malformed_pair() {
        assert!(parse_confirmation_table("not-a-pair").is_err());
    }
}
