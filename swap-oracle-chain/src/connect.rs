//! Connects an `alloy` provider with a local wallet filler from a raw
//! private key. Deliberately skips `with_simple_nonce_management`,
//! since the oracle's own [`crate::nonce::NonceManager`] owns nonce
//! assignment.

use alloy::{
    network::EthereumWallet,
    providers::{DynProvider, Provider as _, ProviderBuilder, WsConnect, fillers::ChainIdFiller},
    signers::local::PrivateKeySigner,
};
use eyre::Context as _;
use secrecy::{ExposeSecret as _, SecretString};

/// Connects to `rpc_url` over WebSocket, filling transactions with a
/// wallet derived from `private_key`. Returns the erased provider and
/// the wallet's address.
pub async fn connect_signer(
    rpc_url: &SecretString,
    private_key: &SecretString,
) -> eyre::Result<(DynProvider, alloy::primitives::Address)> {
    let signer: PrivateKeySigner = private_key
        .expose_secret()
        .parse()
        .context("while parsing signer private key")?;
    let address = signer.address();
    let wallet = EthereumWallet::from(signer);

    let ws = WsConnect::new(rpc_url.expose_secret());
    let provider = ProviderBuilder::new()
        .filler(ChainIdFiller::default())
        .with_gas_estimation()
        .wallet(wallet)
        .connect_ws(ws)
        .await
        .context("while connecting to RPC")?
        .erased();

    let balance = provider
        .get_balance(address)
        .await
        .context("while fetching initial signer balance")?;
    tracing::info!(
        %address,
        balance_eth = %alloy::primitives::utils::format_ether(balance),
        "connected signer"
    );

    Ok((provider, address))
}
