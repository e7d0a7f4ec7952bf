//! Ledger state
//!
//! The immutable UTXO snapshots, the pool of pending transactions and the
//! single-writer owner that advances both as blocks are confirmed.

pub mod ledger_state;
pub mod memory_pool;
pub mod utxo_set;

pub use ledger_state::LedgerState;
pub use memory_pool::TransactionPool;
pub use utxo_set::UTXOSet;
