//! Test fixtures
//!
//! Deterministic wallets, funded snapshots and logging setup shared by the
//! unit tests.

pub mod test_utils;

pub use test_utils::*;
