use crate::core::{Transaction, UnspentTxOut};
use crate::error::{LedgerError, Result};
use crate::storage::{TransactionPool, UTXOSet};
use crate::utils::{derive_public_address, generate_private_key};
use crate::wallet::TransactionBuilder;
use data_encoding::HEXLOWER_PERMISSIVE;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// An in-memory secp256k1 key and the address derived from it.
/// Storing the key is up to the caller; the key bytes are wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Wallet {
    private_key: [u8; 32],
    address: String,
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl Wallet {
    pub fn new() -> Result<Wallet> {
        Self::from_private_key(&generate_private_key())
    }

    /// Wrap a raw 32-byte private key supplied by key storage
    pub fn from_private_key(private_key: &[u8]) -> Result<Wallet> {
        let key: [u8; 32] = private_key.try_into().map_err(|_| {
            LedgerError::Crypto(format!(
                "Private key must be 32 bytes, got {}",
                private_key.len()
            ))
        })?;
        let address = derive_public_address(&key)?;
        Ok(Wallet {
            private_key: key,
            address,
        })
    }

    pub fn from_hex(private_key_hex: &str) -> Result<Wallet> {
        let mut raw = HEXLOWER_PERMISSIVE
            .decode(private_key_hex.trim().as_bytes())
            .map_err(|e| LedgerError::Crypto(format!("Invalid private key hex: {e}")))?;
        let wallet = Self::from_private_key(&raw);
        raw.zeroize();
        wallet
    }

    pub fn get_address(&self) -> &str {
        self.address.as_str()
    }

    pub fn get_private_key(&self) -> &[u8] {
        &self.private_key
    }

    /// Outputs in `utxo_set` this wallet can spend, in snapshot order
    pub fn unspent_outputs(&self, utxo_set: &UTXOSet) -> Vec<UnspentTxOut> {
        utxo_set.owned_by(&self.address).cloned().collect()
    }

    pub fn balance(&self, utxo_set: &UTXOSet) -> u64 {
        utxo_set.balance_of(&self.address)
    }

    pub fn create_transaction(
        &self,
        receiver_address: &str,
        amount: u64,
        utxo_set: &UTXOSet,
        pool: &TransactionPool,
    ) -> Result<Transaction> {
        TransactionBuilder::build(receiver_address, amount, &self.private_key, utxo_set, pool)
    }
}
