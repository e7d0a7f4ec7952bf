//! Error handling for the ledger core
//!
//! Validation outcomes are plain values (`Rejection`), not faults. Everything a
//! caller can hit while building, decoding or configuring goes through
//! `LedgerError`.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Why a transaction or a batch of transactions was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// An output address or another field has the wrong shape
    MalformedStructure(String),
    /// The stored id does not match the recomputed content hash
    IdMismatch { expected: String, actual: String },
    /// An input points at an output that is not in the UTXO set
    UnknownReference { source_tx_id: String, output_index: u64 },
    /// An input signature does not verify against the referenced address
    BadSignature { input_index: usize },
    /// Inputs and outputs do not carry the same total value
    ValueMismatch { inputs: u64, outputs: u64 },
    /// The first transaction of a batch is not a well-formed coinbase
    CoinbaseShapeMismatch(String),
    /// Two inputs in one batch consume the same output
    DuplicateSpendInBatch { source_tx_id: String, output_index: u64 },
    /// An input is already consumed by a pending pool transaction
    DuplicateSpendInPool { source_tx_id: String, output_index: u64 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MalformedStructure(msg) => write!(f, "malformed structure: {msg}"),
            Rejection::IdMismatch { expected, actual } => {
                write!(f, "id mismatch: expected {expected}, got {actual}")
            }
            Rejection::UnknownReference {
                source_tx_id,
                output_index,
            } => write!(f, "unknown reference: {source_tx_id}:{output_index}"),
            Rejection::BadSignature { input_index } => {
                write!(f, "bad signature on input {input_index}")
            }
            Rejection::ValueMismatch { inputs, outputs } => {
                write!(f, "value mismatch: inputs={inputs}, outputs={outputs}")
            }
            Rejection::CoinbaseShapeMismatch(msg) => write!(f, "coinbase shape mismatch: {msg}"),
            Rejection::DuplicateSpendInBatch {
                source_tx_id,
                output_index,
            } => write!(f, "duplicate spend in batch: {source_tx_id}:{output_index}"),
            Rejection::DuplicateSpendInPool {
                source_tx_id,
                output_index,
            } => write!(f, "duplicate spend in pool: {source_tx_id}:{output_index}"),
        }
    }
}

impl std::error::Error for Rejection {}

/// Error types for ledger operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A validation rule refused the transaction or batch
    Rejected(Rejection),
    /// A lookup by input key found nothing in the UTXO set
    UnknownReference { source_tx_id: String, output_index: u64 },
    /// The wallet cannot cover the requested amount
    InsufficientFunds { required: u64, available: u64 },
    /// The signing key does not own the output being spent
    AuthorizationMismatch { expected: String, actual: String },
    /// Cryptographic operation errors
    Crypto(String),
    /// Invalid address format
    InvalidAddress(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::Rejected(reason) => write!(f, "Transaction rejected: {reason}"),
            LedgerError::UnknownReference {
                source_tx_id,
                output_index,
            } => write!(f, "Referenced output not found: {source_tx_id}:{output_index}"),
            LedgerError::InsufficientFunds {
                required,
                available,
            } => {
                write!(
                    f,
                    "Insufficient funds: required {required}, available {available}"
                )
            }
            LedgerError::AuthorizationMismatch { expected, actual } => write!(
                f,
                "Authorization mismatch: output belongs to {expected}, key derives {actual}"
            ),
            LedgerError::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
            LedgerError::InvalidAddress(addr) => write!(f, "Invalid address: {addr}"),
            LedgerError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            LedgerError::Config(msg) => write!(f, "Configuration error: {msg}"),
            LedgerError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<Rejection> for LedgerError {
    fn from(reason: Rejection) -> Self {
        LedgerError::Rejected(reason)
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for LedgerError {
    fn from(err: bincode::error::EncodeError) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for LedgerError {
    fn from(err: bincode::error::DecodeError) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        LedgerError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_converts_into_ledger_error() {
        let err: LedgerError = Rejection::ValueMismatch {
            inputs: 50,
            outputs: 51,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Transaction rejected: value mismatch: inputs=50, outputs=51"
        );
    }

    #[test]
    fn test_insufficient_funds_message() {
        let err = LedgerError::InsufficientFunds {
            required: 60,
            available: 50,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds: required 60, available 50"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let err: LedgerError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err, LedgerError::Io("gone".to_string()));
    }
}
