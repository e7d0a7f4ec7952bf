//! Core ledger functionality
//!
//! Transactions, their content-addressed identity, the monetary constants and
//! the validation rules that guard the UTXO set.

pub mod monetary;
pub mod transaction;
pub mod validation;

pub use monetary::COINBASE_AMOUNT;
pub use transaction::{compute_id, OutPoint, Transaction, TxIn, TxOut, UnspentTxOut};
pub use validation::TransactionValidator;
