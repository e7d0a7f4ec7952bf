//! Utility functions and helpers
//!
//! Hashing, secp256k1 signatures and the record encodings shared by the
//! rest of the ledger.

pub mod crypto;
pub mod serialization;

pub use crypto::{
    derive_public_address, generate_private_key, is_valid_address, secp256k1_sign,
    secp256k1_verify, sha256_digest, sha256_hex, ADDRESS_HEX_LEN,
};

pub use serialization::{deserialize, from_json, serialize, to_json};
