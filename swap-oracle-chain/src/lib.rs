#![deny(missing_docs)]
//! The EVM chain layer for the cross-chain swap oracle.
//!
//! Provides the [`client::ChainClient`] abstraction over a single
//! JSON-RPC endpoint, the [`nonce::NonceManager`] that tracks a
//! signer's nonce, and the [`submitter::TransactionSubmitter`] that
//! combines the two with the retry/backoff policy from the error
//! handling design.

pub mod client;
pub mod connect;
pub mod error;
pub mod metrics;
pub mod nonce;
pub mod submitter;

pub use client::{AlloyChainClient, ChainClient};
pub use error::RpcError;
pub use nonce::NonceManager;
pub use submitter::TransactionSubmitter;
