#![deny(missing_docs)]
//! Configuration, HTTP status surface, and top-level service wiring
//! for the cross-chain swap oracle.
//!
//! The main entry point is [`builder::start`], which connects both
//! chains, spawns the Event Pumps and Timeout Sweeper, and returns an
//! `axum::Router` serving the read-only status surface alongside the
//! background tasks' join handles.

pub mod api;
pub mod builder;
pub mod config;
pub mod state;

pub use builder::{OracleTasks, start};
