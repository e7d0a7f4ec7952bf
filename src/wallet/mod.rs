//! Wallet-side operations
//!
//! Key handling, balances and the construction and signing of payments.

pub mod builder;
#[allow(clippy::module_inception)]
pub mod wallet;

pub use builder::TransactionBuilder;
pub use wallet::Wallet;
