//! Fakes and scenario builders for exercising the swap oracle without
//! a live chain or deployed contracts.

mod clock;
mod mock_chain;
pub mod scenarios;

pub use clock::FakeClock;
pub use mock_chain::{MockChainClient, SendOutcome, SentCall};
