//! Cross-Chain Verifier: proves a payment-release
//! transaction actually executed on the Payment Chain, with defense
//! against receipt-without-inclusion anomalies and reorgs across the
//! confirmation wait.

use std::time::Duration;

use alloy::{
    primitives::{Address, B256, U256},
    sol_types::SolEvent as _,
};
use swap_oracle_chain::{client::ChainClient, error::RpcError};
use swap_oracle_types::{TradeId, chain::EscrowContract};
use tokio::time::Instant;

/// A successfully verified payment-release.
#[derive(Debug, Clone, Copy)]
pub struct VerifiedPayment {
    /// The decoded `paymentId` from the `PaymentCompleted` log.
    pub payment_id: TradeId,
    /// The block the transaction was ultimately confirmed in.
    pub block_number: u64,
}

/// Why [`CrossChainVerifier::verify`] returned a negative verdict. A
/// failed verification never drops funds by itself — the contracts'
/// own timeouts remain the safety net.
#[derive(Debug, thiserror::Error)]
pub enum VerifierError {
    /// The receipt never appeared before the deadline.
    #[error("receipt for {0} not found before deadline")]
    ReceiptTimeout(B256),
    /// The receipt was found but reports a failed transaction.
    #[error("transaction {0} reverted on-chain")]
    TransactionReverted(B256),
    /// The required confirmation depth was not reached before the deadline.
    #[error("confirmation wait for {0} timed out before reaching required depth")]
    ConfirmationTimeout(B256),
    /// The transaction's block doesn't actually list it among its transactions.
    #[error("transaction {0} missing from its own receipt's block")]
    InclusionMismatch(B256),
    /// The receipt's block hash changed between the first and second read.
    #[error("reorg detected for {0} across the confirmation wait")]
    ReorgDetected(B256),
    /// No `PaymentCompleted` log for the expected contract was found.
    #[error("no PaymentCompleted log found for {0}")]
    PaymentLogMissing(B256),
    /// The decoded `paymentId` did not match what was expected.
    #[error("payment id mismatch: expected {expected}, found {found}")]
    PaymentIdMismatch {
        /// The payment id we expected to see.
        expected: TradeId,
        /// The payment id actually decoded from the log.
        found: TradeId,
    },
    /// An RPC call failed while verifying.
    #[error(transparent)]
    Rpc(#[from] RpcError),
    /// No verifier was attached for this chain; gating was requested
    /// but never configured.
    #[error("no cross-chain verifier configured")]
    NotConfigured,
}

impl VerifierError {
    /// A short, stable tag for this failure's cause, for the
    /// [`crate::metrics::Counters::record_verifier_failure`] label.
    pub fn reason_tag(&self) -> &'static str {
        match self {
            Self::ReceiptTimeout(_) => "receipt_timeout",
            Self::TransactionReverted(_) => "transaction_reverted",
            Self::ConfirmationTimeout(_) => "confirmation_timeout",
            Self::InclusionMismatch(_) => "inclusion_mismatch",
            Self::ReorgDetected(_) => "reorg_detected",
            Self::PaymentLogMissing(_) => "payment_log_missing",
            Self::PaymentIdMismatch { .. } => "payment_id_mismatch",
            Self::Rpc(_) => "rpc",
            Self::NotConfigured => "not_configured",
        }
    }
}

/// A value-threshold/required-confirmations tier, sorted descending by
/// threshold. The first tier whose threshold the payment value meets or
/// exceeds wins; a table with no matching tier falls back to its lowest.
pub type ConfirmationTable = Vec<(U256, u64)>;

/// The built-in tiers, used when the operator doesn't override them.
pub fn default_confirmation_table() -> ConfirmationTable {
    let eth = U256::from(10).pow(U256::from(18));
    vec![
        (eth.saturating_mul(U256::from(10)), 30),
        (eth, 20),
        (eth / U256::from(10), 15),
        (U256::ZERO, 10),
    ]
}

fn required_confirmations(table: &ConfirmationTable, value: U256) -> u64 {
    table
        .iter()
        .find(|(threshold, _)| value >= *threshold)
        .or_else(|| table.last())
        .map(|(_, confirmations)| *confirmations)
        .unwrap_or(10)
}

fn deadline_for(required_confirmations: u64) -> Duration {
    Duration::from_secs(required_confirmations * 12 * 2 + 60)
}

/// Verifies that a payment-release transaction executed, was not
/// reorged out, and carries the expected `paymentId`.
pub struct CrossChainVerifier<C> {
    client: std::sync::Arc<C>,
    contract_address: Address,
    confirmation_table: ConfirmationTable,
}

impl<C: ChainClient> CrossChainVerifier<C> {
    /// Builds a verifier reading from `client`, expecting
    /// `PaymentCompleted` logs from `contract_address`, with the
    /// required-confirmations tiers in `confirmation_table`.
    pub fn new(
        client: std::sync::Arc<C>,
        contract_address: Address,
        confirmation_table: ConfirmationTable,
    ) -> Self {
        Self {
            client,
            contract_address,
            confirmation_table,
        }
    }

    /// Runs the full verification sequence for `tx_hash`, expecting a
    /// `PaymentCompleted(expected_payment_id, ..)` log once confirmed,
    /// where `value` determines the required confirmation depth.
    #[tracing::instrument(level = "info", skip(self), fields(%tx_hash))]
    pub async fn verify(
        &self,
        tx_hash: B256,
        expected_payment_id: TradeId,
        value: U256,
    ) -> Result<VerifiedPayment, VerifierError> {
        let start = Instant::now();
        let result = self.verify_inner(tx_hash, expected_payment_id, value).await;
        metrics::histogram!(crate::metrics::METRICS_ID_VERIFIER_WAIT_DURATION)
            .record(start.elapsed().as_millis() as f64);
        result
    }

    async fn verify_inner(
        &self,
        tx_hash: B256,
        expected_payment_id: TradeId,
        value: U256,
    ) -> Result<VerifiedPayment, VerifierError> {
        let confirmations_needed = required_confirmations(&self.confirmation_table, value);
        let deadline = Instant::now() + deadline_for(confirmations_needed);

        let receipt = self.await_receipt(tx_hash, deadline).await?;
        if !receipt.status() {
            return Err(VerifierError::TransactionReverted(tx_hash));
        }
        let receipt_block = receipt
            .block_number
            .ok_or(VerifierError::ReceiptTimeout(tx_hash))?;
        let first_block_hash = receipt.block_hash;

        self.await_confirmations(receipt_block, confirmations_needed, deadline, tx_hash)
            .await?;

        let block = self
            .client
            .block(receipt_block, true)
            .await?
            .ok_or(VerifierError::InclusionMismatch(tx_hash))?;
        if !block.transactions.hashes().any(|hash| hash == tx_hash) {
            return Err(VerifierError::InclusionMismatch(tx_hash));
        }

        if self
            .client
            .get_proof(self.contract_address, Vec::new(), receipt_block)
            .await
            .is_none()
        {
            tracing::warn!(%tx_hash, "eth_getProof unsupported or failed, continuing with basic verification");
        }

        let final_receipt = self
            .client
            .receipt(tx_hash)
            .await?
            .ok_or(VerifierError::ReceiptTimeout(tx_hash))?;
        if final_receipt.block_hash != first_block_hash {
            return Err(VerifierError::ReorgDetected(tx_hash));
        }

        let payment_id = self.decode_payment_completed(&final_receipt, tx_hash)?;
        if payment_id != expected_payment_id {
            return Err(VerifierError::PaymentIdMismatch {
                expected: expected_payment_id,
                found: payment_id,
            });
        }

        Ok(VerifiedPayment {
            payment_id,
            block_number: receipt_block,
        })
    }

    async fn await_receipt(
        &self,
        tx_hash: B256,
        deadline: Instant,
    ) -> Result<alloy::rpc::types::TransactionReceipt, VerifierError> {
        loop {
            if let Some(receipt) = self.client.receipt(tx_hash).await? {
                return Ok(receipt);
            }
            if Instant::now() >= deadline {
                return Err(VerifierError::ReceiptTimeout(tx_hash));
            }
            tokio::time::sleep(Duration::from_secs(2)).await;
        }
    }

    async fn await_confirmations(
        &self,
        receipt_block: u64,
        confirmations_needed: u64,
        deadline: Instant,
        tx_hash: B256,
    ) -> Result<(), VerifierError> {
        loop {
            let current = self.client.block_number().await?;
            if current.saturating_sub(receipt_block) >= confirmations_needed {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(VerifierError::ConfirmationTimeout(tx_hash));
            }
            tokio::time::sleep(Duration::from_secs(12)).await;
        }
    }

    fn decode_payment_completed(
        &self,
        receipt: &alloy::rpc::types::TransactionReceipt,
        tx_hash: B256,
    ) -> Result<TradeId, VerifierError> {
        for log in receipt.logs() {
            if log.address() != self.contract_address {
                continue;
            }
            if log.topics().first() != Some(&EscrowContract::PaymentCompleted::SIGNATURE_HASH) {
                continue;
            }
            if let Ok(decoded) = log.log_decode::<EscrowContract::PaymentCompleted>() {
                return Ok(TradeId::new(decoded.inner.data.paymentId));
            }
        }
        Err(VerifierError::PaymentLogMissing(tx_hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_picks_tier_by_value() {
        let table = default_confirmation_table();
        let eth = U256::from(10).pow(U256::from(18));
        assert_eq!(required_confirmations(&table, eth.saturating_mul(U256::from(10))), 30);
        assert_eq!(required_confirmations(&table, eth), 20);
        assert_eq!(required_confirmations(&table, eth / U256::from(2)), 15);
        assert_eq!(required_confirmations(&table, U256::ZERO), 10);
    }

    #[test]
    fn custom_table_overrides_defaults() {
        let table: ConfirmationTable = vec![(U256::from(5u64), 3), (U256::ZERO, 1)];
        assert_eq!(required_confirmations(&table, U256::from(10u64)), 3);
        assert_eq!(required_confirmations(&table, U256::from(1u64)), 1);
    }
}
