#![deny(missing_docs)]
//! Shared type definitions for the cross-chain swap oracle.
//!
//! This crate groups together the strongly-typed values and message
//! structures shared between the chain layer, the coordinator core, and
//! the HTTP status surface. It provides:
//!
//! * Thin wrappers around the on-chain identifiers (`trade_id`,
//!   `request_id`) with consistent serialization and display
//!   implementations (see [`ids`]).
//! * A [`Clock`] capability so the coordinator's wall-clock reads can be
//!   replaced with a deterministic clock in tests.
//! * The escrow contract's event and function ABI (see [`chain`]).
//! * API types for the read-only status surface (see [`api`]).

use std::time::{SystemTime, UNIX_EPOCH};

pub mod api;
pub mod chain;
mod ids;

pub use ids::{ChainRole, RequestId, TradeId};

/// Capability to read the current wall-clock time as UNIX seconds.
///
/// The oracle deliberately never uses the chain-supplied block
/// timestamp for coordination logic: using a single clock keeps the
/// two chains' possibly-skewed clocks from becoming an exploit
/// surface. Implementations must be cheap and side-effect free so they
/// can be called freely from hot paths.
pub trait Clock: Send + Sync + 'static {
    /// Returns the current time as UNIX seconds.
    fn now(&self) -> u64;
}

/// A [`Clock`] backed by [`SystemTime::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before UNIX epoch")
            .as_secs()
    }
}

/// The on-chain trade/payment lifecycle state, mirrored from the escrow
/// contracts' `state` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum TradeState {
    /// The leg was created but has not yet reached `AwaitingConfirmation`.
    Initiated = 0,
    /// The leg is created and stamped, waiting for the confirmation-phase request.
    AwaitingConfirmation = 1,
    /// The leg has been stamped a second time and is in its execution phase.
    Confirmed = 2,
    /// The leg completed successfully (e.g. key-reveal happened).
    Completed = 3,
    /// The leg was cancelled/refunded.
    Failed = 4,
}

/// Error returned when an on-chain `state` value does not map to a known [`TradeState`].
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("unknown on-chain trade state: {0}")]
pub struct UnknownTradeState(pub u8);

impl TryFrom<u8> for TradeState {
    type Error = UnknownTradeState;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Initiated),
            1 => Ok(Self::AwaitingConfirmation),
            2 => Ok(Self::Confirmed),
            3 => Ok(Self::Completed),
            4 => Ok(Self::Failed),
            other => Err(UnknownTradeState(other)),
        }
    }
}

impl TradeState {
    /// Returns `true` if this state is terminal (`Completed` or `Failed`) and
    /// the oracle should drop its local record for the leg.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// A `TimeRequestSent` event resolved from a chain's logs, ready to hand
/// to the trade dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRequestEvent {
    /// The chain this event was observed on.
    pub chain: ChainRole,
    /// The Oracle request id from the event.
    pub request_id: RequestId,
    /// The trade id shared across both legs of the swap.
    pub trade_id: TradeId,
    /// The swap validity window, in seconds, as supplied by the contract.
    pub duration: u64,
    /// The block number the event was found in.
    pub block_number: u64,
    /// The timestamp of the containing block. Observability only — never
    /// used for coordination logic.
    pub block_timestamp: u64,
}
