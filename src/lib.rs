//! # UTXO Ledger - transaction and ledger-consistency core
//!
//! Everything that decides whether value may move: how a transaction is
//! identified, who may spend an output, how the set of unspent outputs advances
//! block by block and which pending transactions are still acceptable.
//!
//! ## Layout
//! - `core/`: transactions, content-hash ids, coinbase and batch validation
//! - `storage/`: immutable UTXO snapshots, the transaction pool, the single-writer ledger state
//! - `wallet/`: keys, balances and building/signing payments
//! - `utils/`: SHA-256, secp256k1 signatures, binary and JSON encodings
//! - `config/`: runtime tunables
//! - `error/`: rejection reasons and crate errors
//!
//! ## Rules worth remembering
//! - A transaction id is SHA-256 over its inputs' references and its outputs, in order.
//! - Addresses are the 128-hex X||Y of an uncompressed secp256k1 key, no `04` prefix.
//! - Inputs must sum exactly to outputs; only the coinbase mints (50 per block).
//! - A batch is checked against the snapshot from before the batch.
//!
//! Block format, mining, networking and key files live outside this crate.

pub mod config;
pub mod core;
pub mod error;
pub mod storage;
pub mod utils;
pub mod wallet;

#[cfg(test)]
pub mod testnet;

// Re-export commonly used types for convenience
pub use config::{Config, GLOBAL_CONFIG};
pub use crate::core::{
    compute_id, OutPoint, Transaction, TransactionValidator, TxIn, TxOut, UnspentTxOut,
    COINBASE_AMOUNT,
};
pub use error::{LedgerError, Rejection, Result};
pub use storage::{LedgerState, TransactionPool, UTXOSet};
pub use utils::{
    derive_public_address, generate_private_key, is_valid_address, secp256k1_sign,
    secp256k1_verify, sha256_digest,
};
pub use wallet::{TransactionBuilder, Wallet};
