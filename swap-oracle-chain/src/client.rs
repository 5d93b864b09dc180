//! A thin wrapper over a single EVM JSON-RPC endpoint.
//!
//! [`ChainClient`] narrows the much larger [`alloy::providers::Provider`]
//! surface down to exactly the operations the oracle's control plane
//! needs, with every failure classified into an [`RpcError`] so callers
//! never have to pattern-match transport detail.

use alloy::{
    eips::{BlockId, BlockNumberOrTag},
    primitives::{Address, Bytes, B256, U256},
    providers::{DynProvider, PendingTransactionBuilder, Provider as _},
    rpc::types::{Block, EIP1186AccountProofResponse, Filter, Log, TransactionReceipt},
};
use async_trait::async_trait;
use swap_oracle_types::{ChainRole, TradeId, TradeState, chain::EscrowContract};

use crate::error::RpcError;

/// One leg's on-chain lifecycle data, as read back via `getTrade`
/// (Asset) or `getPayment` (Payment). `asset_trade_id` is only ever
/// `Some` for a payment record; the Asset side's ABI has no such field.
#[derive(Debug, Clone, Copy)]
pub struct OnChainTrade {
    /// The escrowed amount.
    pub amount: U256,
    /// The buyer address.
    pub buyer: Address,
    /// The seller address.
    pub seller: Address,
    /// The on-chain lifecycle state.
    pub state: TradeState,
    /// Unix timestamp the leg was created.
    pub inception_time: u64,
    /// Unix timestamp of the confirmation-phase stamp.
    pub confirmation_time: u64,
    /// The validity window, in seconds.
    pub duration: u64,
    /// For payment records, the asset-chain trade id it is paired with.
    pub asset_trade_id: Option<TradeId>,
}

/// Abstracts a single EVM JSON-RPC endpoint behind a narrow interface.
/// Implementations must classify every failure into an [`RpcError`]
/// variant; they never retry internally — that policy belongs to the
/// caller (the Nonce Manager / Transaction Submitter).
#[async_trait]
pub trait ChainClient: Send + Sync + 'static {
    /// Returns the current block height.
    async fn block_number(&self) -> Result<u64, RpcError>;

    /// Returns logs matching `filter`, in ascending block/log-index order.
    async fn logs(&self, filter: &Filter) -> Result<Vec<Log>, RpcError>;

    /// Returns the receipt for `tx_hash`, or `None` if not yet mined.
    async fn receipt(&self, tx_hash: B256) -> Result<Option<TransactionReceipt>, RpcError>;

    /// Returns the block at `number`. `with_txs` controls whether full
    /// transaction objects or only hashes are populated.
    async fn block(&self, number: u64, with_txs: bool) -> Result<Option<Block>, RpcError>;

    /// Signs and submits a raw call to `to` with `data`, at the given
    /// explicit `nonce` and `gas_limit`. Returns the pending tx hash.
    async fn send(
        &self,
        to: Address,
        data: Bytes,
        nonce: u64,
        gas_limit: u64,
    ) -> Result<B256, RpcError>;

    /// `eth_getProof` passthrough. `None` if the endpoint does not
    /// support it — callers must treat this as a soft failure, not a
    /// hard error.
    async fn get_proof(
        &self,
        address: Address,
        slots: Vec<B256>,
        block_number: u64,
    ) -> Option<EIP1186AccountProofResponse>;

    /// Returns the signer-relevant balance of `address`.
    async fn balance(&self, address: Address) -> Result<U256, RpcError>;

    /// Returns the current on-chain transaction count (nonce) for `address`.
    async fn transaction_count(&self, address: Address) -> Result<u64, RpcError>;

    /// Reads back the on-chain lifecycle state of a leg via `getTrade`
    /// (Asset) or `getPayment` (Payment). Used by the Timeout Sweeper to
    /// avoid a redundant callback when the contract is already terminal.
    async fn read_trade_state(
        &self,
        contract: Address,
        trade_id: TradeId,
        role: ChainRole,
    ) -> Result<Option<TradeState>, RpcError>;

    /// Reads the full Asset-leg record via `getTrade`. `None` if the
    /// contract has no such trade (already cleaned up or never created).
    async fn get_trade(
        &self,
        contract: Address,
        trade_id: TradeId,
    ) -> Result<Option<OnChainTrade>, RpcError>;

    /// Reads the full Payment-leg record via `getPayment`. `None` if the
    /// contract has no such payment.
    async fn get_payment(
        &self,
        contract: Address,
        trade_id: TradeId,
    ) -> Result<Option<OnChainTrade>, RpcError>;
}

/// [`ChainClient`] implementation backed by an `alloy` [`DynProvider`].
///
/// The provider is expected to already hold a configured wallet filler
/// (see [`crate::connect`]), so `send` signs with that wallet.
pub struct AlloyChainClient {
    provider: DynProvider,
}

impl AlloyChainClient {
    /// Wraps an already-connected provider.
    pub fn new(provider: DynProvider) -> Self {
        Self { provider }
    }

    /// Returns the underlying provider, e.g. to build `alloy::sol!`
    /// contract instances directly.
    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }
}

#[async_trait]
impl ChainClient for AlloyChainClient {
    async fn block_number(&self) -> Result<u64, RpcError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|err| RpcError::RpcUnavailable(eyre::eyre!(err)))
    }

    async fn logs(&self, filter: &Filter) -> Result<Vec<Log>, RpcError> {
        self.provider
            .get_logs(filter)
            .await
            .map_err(|err| RpcError::RpcUnavailable(eyre::eyre!(err)))
    }

    async fn receipt(&self, tx_hash: B256) -> Result<Option<TransactionReceipt>, RpcError> {
        self.provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|err| RpcError::RpcUnavailable(eyre::eyre!(err)))
    }

    async fn block(&self, number: u64, with_txs: bool) -> Result<Option<Block>, RpcError> {
        let id = BlockId::Number(BlockNumberOrTag::Number(number));
        let block = if with_txs {
            self.provider.get_block(id).full().await
        } else {
            self.provider.get_block(id).await
        };
        block.map_err(|err| RpcError::RpcUnavailable(eyre::eyre!(err)))
    }

    async fn send(
        &self,
        to: Address,
        data: Bytes,
        nonce: u64,
        gas_limit: u64,
    ) -> Result<B256, RpcError> {
        let tx = alloy::rpc::types::TransactionRequest::default()
            .to(to)
            .input(data.into())
            .nonce(nonce)
            .gas_limit(gas_limit);
        let pending: PendingTransactionBuilder<_> = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(crate::error::classify_rpc_error)?;
        Ok(*pending.tx_hash())
    }

    async fn get_proof(
        &self,
        address: Address,
        slots: Vec<B256>,
        block_number: u64,
    ) -> Option<EIP1186AccountProofResponse> {
        self.provider
            .get_proof(address, slots)
            .block_id(BlockId::Number(BlockNumberOrTag::Number(block_number)))
            .await
            .ok()
    }

    async fn balance(&self, address: Address) -> Result<U256, RpcError> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|err| RpcError::RpcUnavailable(eyre::eyre!(err)))
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, RpcError> {
        self.provider
            .get_transaction_count(address)
            .await
            .map_err(|err| RpcError::RpcUnavailable(eyre::eyre!(err)))
    }

    async fn read_trade_state(
        &self,
        contract: Address,
        trade_id: TradeId,
        role: ChainRole,
    ) -> Result<Option<TradeState>, RpcError> {
        let record = match role {
            ChainRole::Asset => self.get_trade(contract, trade_id).await?,
            ChainRole::Payment => self.get_payment(contract, trade_id).await?,
        };
        Ok(record.map(|record| record.state))
    }

    async fn get_trade(
        &self,
        contract: Address,
        trade_id: TradeId,
    ) -> Result<Option<OnChainTrade>, RpcError> {
        let contract = EscrowContract::new(contract, self.provider.clone());
        match contract.getTrade(trade_id.into_inner()).call().await {
            Ok(trade) => Ok(Some(OnChainTrade {
                amount: trade.amount,
                buyer: trade.buyer,
                seller: trade.seller,
                state: TradeState::try_from(trade.state)
                    .map_err(|err| RpcError::RpcUnavailable(eyre::eyre!(err)))?,
                inception_time: trade.inceptionTime,
                confirmation_time: trade.confirmationTime,
                duration: trade.duration,
                asset_trade_id: None,
            })),
            Err(err) => Self::decode_view_error(err),
        }
    }

    async fn get_payment(
        &self,
        contract: Address,
        trade_id: TradeId,
    ) -> Result<Option<OnChainTrade>, RpcError> {
        let contract = EscrowContract::new(contract, self.provider.clone());
        match contract.getPayment(trade_id.into_inner()).call().await {
            Ok(payment) => Ok(Some(OnChainTrade {
                amount: payment.amount,
                buyer: payment.buyer,
                seller: payment.seller,
                state: TradeState::try_from(payment.state)
                    .map_err(|err| RpcError::RpcUnavailable(eyre::eyre!(err)))?,
                inception_time: payment.inceptionTime,
                confirmation_time: payment.confirmationTime,
                duration: payment.duration,
                asset_trade_id: Some(TradeId::new(payment.assetTradeId)),
            })),
            Err(err) => Self::decode_view_error(err),
        }
    }
}

impl AlloyChainClient {
    /// A reverted view call means the trade id is unknown to the
    /// contract (already cleaned up); anything else is a real RPC
    /// problem the caller should not paper over.
    fn decode_view_error<T>(err: alloy::contract::Error) -> Result<Option<T>, RpcError> {
        match crate::error::classify_contract_error(err) {
            RpcError::Reverted(_) => Ok(None),
            other => Err(other),
        }
    }
}
