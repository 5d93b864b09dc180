//! Classified RPC errors.
//!
//! Every Chain Client operation that can fail surfaces one of these
//! variants rather than a raw transport error, so that callers (the
//! Nonce Manager, the Submitter, the Swap Coordinator) can apply the
//! retry/terminal policy from the error-handling design without
//! re-parsing transport-level detail.

/// A classified failure from a chain RPC call.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Transient transport failure (connection reset, timeout, null
    /// response). Retry with backoff; never alters trade state.
    #[error("rpc unavailable: {0}")]
    RpcUnavailable(#[source] eyre::Error),
    /// The submitted nonce was already mined by a later transaction.
    /// Resync `next_nonce` from the chain and retry once.
    #[error("nonce too low")]
    NonceTooLow,
    /// The signer's balance cannot cover `value + gas_limit * gas_price`.
    /// Terminal for the call.
    #[error("insufficient funds")]
    InsufficientFunds,
    /// The exact same transaction is already known to the node's
    /// mempool. Treated as success — it was us.
    #[error("already known")]
    AlreadyKnown,
    /// A replacement transaction with the same nonce underpriced the
    /// one already pending.
    #[error("replacement transaction underpriced")]
    ReplacementUnderpriced,
    /// The transaction was mined but reverted. Terminal for the call.
    #[error("transaction reverted: {0}")]
    Reverted(String),
}

impl RpcError {
    /// `true` if the Submitter should retry this call (possibly after
    /// resync/backoff); `false` if it is terminal for the attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RpcUnavailable(_) | Self::NonceTooLow | Self::ReplacementUnderpriced
        )
    }

    /// `true` if this failure should be treated as if the call had
    /// succeeded (the transaction is already on its way).
    pub fn is_already_known(&self) -> bool {
        matches!(self, Self::AlreadyKnown)
    }
}

/// Classifies an [`alloy::contract::Error`] (raised by a `CallBuilder::send`
/// or `::call`) into an [`RpcError`].
pub fn classify_contract_error(err: alloy::contract::Error) -> RpcError {
    classify_error_message(&err.to_string())
}

/// Classifies any RPC-transport-flavored error (by its `Display` text)
/// into an [`RpcError`]. Used for calls whose error type doesn't carry
/// a structured variant we can match on directly.
pub fn classify_rpc_error<E: std::fmt::Display>(err: E) -> RpcError {
    classify_error_message(&err.to_string())
}

/// Classifies a [`alloy::providers::PendingTransactionError`] into an
/// [`RpcError`].
pub fn classify_pending_error(err: alloy::providers::PendingTransactionError) -> RpcError {
    match err {
        alloy::providers::PendingTransactionError::TransportError(
            alloy::transports::RpcError::NullResp,
        ) => RpcError::RpcUnavailable(eyre::eyre!("null response from RPC")),
        other => classify_error_message(&other.to_string()),
    }
}

fn classify_error_message(message: &str) -> RpcError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("nonce too low") {
        RpcError::NonceTooLow
    } else if lower.contains("insufficient funds") {
        RpcError::InsufficientFunds
    } else if lower.contains("already known") {
        RpcError::AlreadyKnown
    } else if lower.contains("replacement transaction underpriced") {
        RpcError::ReplacementUnderpriced
    } else if lower.contains("revert") || lower.contains("execution reverted") {
        RpcError::Reverted(message.to_owned())
    } else {
        RpcError::RpcUnavailable(eyre::eyre!(message.to_owned()))
    }
}
