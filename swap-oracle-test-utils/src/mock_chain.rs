//! A scriptable [`ChainClient`] double: no RPC endpoint, no deployed
//! contract, just enough behavior to drive the coordinator, sweeper,
//! and dispatcher through the scenarios in integration tests.

use std::collections::{HashMap, VecDeque};

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::rpc::types::{Block, EIP1186AccountProofResponse, Filter, Log, TransactionReceipt};
use async_trait::async_trait;
use parking_lot::Mutex;
use swap_oracle_chain::{
    client::{ChainClient, OnChainTrade},
    error::RpcError,
};
use swap_oracle_types::{ChainRole, TradeId, TradeState};

/// One call recorded by [`MockChainClient::send`], for assertions.
#[derive(Debug, Clone)]
pub struct SentCall {
    /// The contract address the call targeted.
    pub to: Address,
    /// The ABI-encoded calldata.
    pub data: Bytes,
    /// The nonce the call was sent with.
    pub nonce: u64,
}

/// A scripted outcome for the next [`MockChainClient::send`] call.
#[derive(Debug, Clone, Copy)]
pub enum SendOutcome {
    /// The send succeeds.
    Success,
    /// The send fails as if the nonce had already been used.
    NonceTooLow,
    /// The send fails as if the same transaction was already submitted.
    AlreadyKnown,
    /// The send fails as if a replacement was underpriced.
    ReplacementUnderpriced,
    /// The send fails as if the RPC endpoint was unreachable.
    RpcUnavailable,
    /// The send fails as if the contract call reverted.
    Reverted,
    /// The send fails as if the signer lacked funds.
    InsufficientFunds,
}

impl SendOutcome {
    fn into_result(self, tx_hash: B256) -> Result<B256, RpcError> {
        match self {
            Self::Success => Ok(tx_hash),
            Self::NonceTooLow => Err(RpcError::NonceTooLow),
            Self::AlreadyKnown => Err(RpcError::AlreadyKnown),
            Self::ReplacementUnderpriced => Err(RpcError::ReplacementUnderpriced),
            Self::RpcUnavailable => Err(RpcError::RpcUnavailable(eyre::eyre!("mock rpc unavailable"))),
            Self::Reverted => Err(RpcError::Reverted("mock revert".to_string())),
            Self::InsufficientFunds => Err(RpcError::InsufficientFunds),
        }
    }
}

struct State {
    block_number: u64,
    next_nonce: u64,
    sent: Vec<SentCall>,
    scripted_outcomes: VecDeque<SendOutcome>,
    trade_records: HashMap<(Address, TradeId, ChainRole), OnChainTrade>,
}

/// A scriptable [`ChainClient`]. Defaults to: block 1, nonce 0, every
/// `send` succeeds, every `read_trade_state` returns `None`.
pub struct MockChainClient {
    state: Mutex<State>,
}

impl Default for MockChainClient {
    fn default() -> Self {
        Self {
            state: Mutex::new(State {
                block_number: 1,
                next_nonce: 0,
                sent: Vec::new(),
                scripted_outcomes: VecDeque::new(),
                trade_records: HashMap::new(),
            }),
        }
    }
}

impl MockChainClient {
    /// Queues `outcome` to be returned by the next `send` call. Calls
    /// beyond the queued outcomes default to [`SendOutcome::Success`].
    pub fn push_send_outcome(&self, outcome: SendOutcome) {
        self.state.lock().scripted_outcomes.push_back(outcome);
    }

    /// Sets the block height returned by `block_number`.
    pub fn set_block_number(&self, block_number: u64) {
        self.state.lock().block_number = block_number;
    }

    /// Sets the on-chain state `read_trade_state`/`get_trade`/`get_payment`
    /// report for `(contract, trade_id, role)`, with every other field
    /// zeroed. Use [`Self::set_trade_record`] to script a full record.
    pub fn set_trade_state(&self, contract: Address, trade_id: TradeId, role: ChainRole, state: TradeState) {
        self.set_trade_record(
            contract,
            trade_id,
            role,
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

    /// Scripts the full on-chain record `get_trade`/`get_payment` report
    /// for `(contract, trade_id, role)`.
    pub fn set_trade_record(&self, contract: Address, trade_id: TradeId, role: ChainRole, record: OnChainTrade) {
        self.state
            .lock()
            .trade_records
            .insert((contract, trade_id, role), record);
    }

    /// All calls recorded so far, in submission order.
    pub fn sent_calls(&self) -> Vec<SentCall> {
        self.state.lock().sent.clone()
    }

    /// Number of calls sent to `to` so far.
    pub fn sent_count_to(&self, to: Address) -> usize {
        self.state.lock().sent.iter().filter(|call| call.to == to).count()
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn block_number(&self) -> Result<u64, RpcError> {
        Ok(self.state.lock().block_number)
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

    async fn send(&self, to: Address, data: Bytes, nonce: u64, _gas_limit: u64) -> Result<B256, RpcError> {
        let outcome = {
            let mut state = self.state.lock();
            state
                .sent
                .push(SentCall { to, data: data.clone(), nonce });
            state.scripted_outcomes.pop_front().unwrap_or(SendOutcome::Success)
        };
        outcome.into_result(B256::repeat_byte(nonce as u8))
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
        Ok(self.state.lock().next_nonce)
    }

    async fn read_trade_state(
        &self,
        contract: Address,
        trade_id: TradeId,
        role: ChainRole,
    ) -> Result<Option<TradeState>, RpcError> {
        Ok(self
            .state
            .lock()
            .trade_records
            .get(&(contract, trade_id, role))
            .map(|record| record.state))
    }

    async fn get_trade(&self, contract: Address, trade_id: TradeId) -> Result<Option<OnChainTrade>, RpcError> {
        Ok(self.state.lock().trade_records.get(&(contract, trade_id, ChainRole::Asset)).copied())
    }

    async fn get_payment(&self, contract: Address, trade_id: TradeId) -> Result<Option<OnChainTrade>, RpcError> {
        Ok(self.state.lock().trade_records.get(&(contract, trade_id, ChainRole::Payment)).copied())
    }
}
