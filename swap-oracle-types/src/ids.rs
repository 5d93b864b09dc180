//! Strongly-typed wrappers around the on-chain identifiers.
//!
//! Mirrors the wrapper style of [`crate::TradeState`] — thin newtypes
//! with consistent `Display`/serde rather than passing raw
//! `alloy_primitives` values around.

use std::fmt;

use alloy::primitives::{B256, U256};
use serde::{Deserialize, Serialize};

/// The shared identifier for a swap, present on both the Asset and
/// Payment leg.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(U256);

impl TradeId {
    /// Wraps a raw `U256` trade id.
    pub fn new(value: U256) -> Self {
        Self(value)
    }

    /// Returns the inner `U256`.
    pub fn into_inner(self) -> U256 {
        self.0
    }
}

impl From<U256> for TradeId {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TradeId({})", self.0)
    }
}

/// The Oracle request id emitted by `TimeRequestSent`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(B256);

impl RequestId {
    /// Wraps a raw `B256` request id.
    pub fn new(value: B256) -> Self {
        Self(value)
    }

    /// Returns the inner `B256`.
    pub fn into_inner(self) -> B256 {
        self.0
    }
}

impl From<B256> for RequestId {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestId({})", self.0)
    }
}

/// Which leg of a swap a piece of state or an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainRole {
    /// The chain escrowing the traded asset.
    Asset,
    /// The chain escrowing the payment.
    Payment,
}

impl ChainRole {
    /// Returns the other leg's role.
    pub fn other(self) -> Self {
        match self {
            Self::Asset => Self::Payment,
            Self::Payment => Self::Asset,
        }
    }
}

impl fmt::Display for ChainRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asset => f.write_str("asset"),
            Self::Payment => f.write_str("payment"),
        }
    }
}
