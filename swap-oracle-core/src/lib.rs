#![deny(missing_docs)]
//! The state-machine core of the cross-chain swap oracle.
//!
//! Glues the [`swap_oracle_chain`] layer into the control plane: the
//! per-trade serialization queue ([`dispatcher`]), the swap state
//! machine ([`coordinator`]), the periodic timeout scan ([`sweeper`]),
//! the per-chain log pump ([`pump`]), and the cross-chain transaction
//! verifier ([`verifier`]).

pub mod coordinator;
pub mod dispatcher;
mod encode;
pub mod metrics;
pub mod pairs;
pub mod pump;
pub mod record;
pub mod sweeper;
#[cfg(test)]
mod test_support;
pub mod table;
pub mod verifier;

pub use coordinator::{ChainHandle, SwapCoordinator};
pub use dispatcher::TradeDispatcher;
pub use pairs::{CrossChainPair, CrossChainPairs};
pub use pump::EventPump;
pub use record::TradeRecord;
pub use sweeper::TimeoutSweeper;
pub use table::ChainTable;
pub use verifier::{CrossChainVerifier, VerifierError, VerifiedPayment};
