//! Inline test doubles for this crate's own unit tests. Kept here
//! rather than in `swap-oracle-test-utils` to avoid a circular
//! dependency (that crate depends on this one for scenario builders).

use std::collections::HashMap;

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::rpc::types::{Block, EIP1186AccountProofResponse, Filter, Log, TransactionReceipt};
use async_trait::async_trait;
use parking_lot::Mutex;
use swap_oracle_chain::{
    client::{ChainClient, OnChainTrade},
    error::RpcError,
};
use swap_oracle_types::{ChainRole, Clock, TradeId, TradeState};

/// A [`Clock`] that always reports the same instant, for deterministic tests.
pub struct FixedClock(std::sync::atomic::AtomicU64);

impl FixedClock {
    /// Builds a clock fixed at `now`.
    pub fn new(now: u64) -> Self {
        Self(std::sync::atomic::AtomicU64::new(now))
    }

    /// Advances the clock by `delta` seconds.
    pub fn advance(&self, delta: u64) {
        self.0.fetch_add(delta, std::sync::atomic::Ordering::Relaxed);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0.load(std::sync::atomic::Ordering::Relaxed)
    }
}

/// A [`ChainClient`] whose `send` always succeeds, for exercising the
/// coordinator/dispatcher without a real RPC endpoint.
#[derive(Default)]
pub struct MockChainClient {
    next_nonce: std::sync::atomic::AtomicU64,
    trade_records: Mutex<HashMap<(Address, TradeId, ChainRole), OnChainTrade>>,
}

impl MockChainClient {
    /// Scripts the on-chain state [`Self::read_trade_state`] reports
    /// for `(contract, trade_id, role)`, with every other field zeroed.
    pub fn set_trade_state(
        &self,
        contract: Address,
        trade_id: TradeId,
        role: ChainRole,
        state: TradeState,
    ) {
        self.trade_records.lock().insert(
            (contract, trade_id, role),
            OnChainTrade {
                amount: U256::ZERO,
                buyer: Address::ZERO,
                seller: Address::ZERO,
                state,
                inception_time: 0,
                confirmation_time: 0,
                duration: 0,
                asset_trade_id: None,
            },
        );
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn block_number(&self) -> Result<u64, RpcError> {
        Ok(1)
    }

    async fn logs(&self, _filter: &Filter) -> Result<Vec<Log>, RpcError> {
        Ok(Vec::new())
    }

    async fn receipt(&self, _tx_hash: B256) -> Result<Option<TransactionReceipt>, RpcError> {
        Ok(None)
    }

    async fn block(&self, _number: u64, _with_txs: bool) -> Result<Option<Block>, RpcError> {
        Ok(None)
    }

    async fn send(
        &self,
        _to: Address,
        _data: Bytes,
        _nonce: u64,
        _gas_limit: u64,
    ) -> Result<B256, RpcError> {
        Ok(B256::ZERO)
    }

    async fn get_proof(
        &self,
        _address: Address,
        _slots: Vec<B256>,
        _block_number: u64,
    ) -> Option<EIP1186AccountProofResponse> {
        None
    }

    async fn balance(&self, _address: Address) -> Result<U256, RpcError> {
        Ok(U256::ZERO)
    }

    async fn transaction_count(&self, _address: Address) -> Result<u64, RpcError> {
        Ok(self.next_nonce.load(std::sync::atomic::Ordering::Relaxed))
    }

    async fn read_trade_state(
        &self,
        contract: Address,
        trade_id: TradeId,
        role: ChainRole,
    ) -> Result<Option<TradeState>, RpcError> {
        Ok(self
            .trade_records
            .lock()
            .get(&(contract, trade_id, role))
            .map(|record| record.state))
    }

    async fn get_trade(&self, contract: Address, trade_id: TradeId) -> Result<Option<OnChainTrade>, RpcError> {
        Ok(self.trade_records.lock().get(&(contract, trade_id, ChainRole::Asset)).copied())
    }

    async fn get_payment(&self, contract: Address, trade_id: TradeId) -> Result<Option<OnChainTrade>, RpcError> {
        Ok(self.trade_records.lock().get(&(contract, trade_id, ChainRole::Payment)).copied())
    }
}
