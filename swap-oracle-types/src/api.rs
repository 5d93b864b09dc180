//! # API module
//!
//! Response payloads for the read-only status HTTP surface. Currently
//! exposes the version 1 types under [`v1`].

pub mod v1;
