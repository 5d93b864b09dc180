//! Types for on-chain messages.
//!
//! This module defines the events emitted by the escrow contracts and
//! the calls the oracle submits back in response to them. The ABI is
//! shared by both chains: the asset-leg and payment-leg contracts
//! expose the same event/function surface, differing only in which
//! view function (`getTrade` vs `getPayment`) is meaningful.

use alloy::sol;

// Codegen from ABI file to interact with the contract.
sol!(
    #[allow(missing_docs, clippy::too_many_arguments)]
    #[sol(rpc)]
    EscrowContract,
    "./abi/EscrowContract.json"
);
