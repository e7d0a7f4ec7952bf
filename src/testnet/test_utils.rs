//! Test utilities for ledger testing

use crate::config::Config;
use crate::core::{Transaction, TransactionValidator, UnspentTxOut};
use crate::storage::{TransactionPool, UTXOSet};
use crate::wallet::Wallet;

/// Route `log` output through the test harness; safe to call from every test
pub fn init_test_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

/// A wallet with a fixed key, so addresses are stable across runs
pub fn test_wallet(seed: u8) -> Wallet {
    Wallet::from_private_key(&[seed; 32]).expect("non-zero seed gives a valid key")
}

/// Validator with default settings, independent of the environment
pub fn test_validator() -> TransactionValidator {
    TransactionValidator::new(Config::default())
}

pub fn test_pool() -> TransactionPool {
    TransactionPool::with_validator(test_validator())
}

/// Snapshot holding one output per `(source_tx_id, amount)` pair, all owned by `wallet`
pub fn funded_utxo_set(wallet: &Wallet, outputs: &[(&str, u64)]) -> UTXOSet {
    UTXOSet::from_unspent(
        outputs
            .iter()
            .map(|(source, amount)| UnspentTxOut::new(source, 0, wallet.get_address(), *amount)),
    )
}

/// Mine `blocks` coinbase-only blocks to `wallet`, starting at block index 1
pub fn mine_empty_blocks(wallet: &Wallet, blocks: u64) -> UTXOSet {
    let validator = test_validator();
    let mut utxo_set = UTXOSet::new();
    for block_index in 1..=blocks {
        let batch = [Transaction::coinbase(wallet.get_address(), block_index)];
        utxo_set = validator
            .process_batch(&batch, &utxo_set, block_index)
            .expect("coinbase-only batch is valid");
    }
    utxo_set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::COINBASE_AMOUNT;

    #[test]
    fn test_mined_blocks_fund_wallet() {
        init_test_logging();
        let wallet = test_wallet(1);
        let utxo_set = mine_empty_blocks(&wallet, 3);
        assert_eq!(wallet.balance(&utxo_set), 3 * COINBASE_AMOUNT);
        assert_eq!(utxo_set.len(), 3);
    }

    #[test]
    fn test_funded_wallet_can_pay() {
        init_test_logging();
        let alice = test_wallet(2);
        let bob = test_wallet(3);
        let utxo_set = funded_utxo_set(&alice, &[("T1", 20), ("T2", 20)]);
        let pool = test_pool();

        let tx = alice
            .create_transaction(bob.get_address(), 35, &utxo_set, &pool)
            .unwrap();
        assert_eq!(pool.admit(tx, &utxo_set), Ok(()));
        assert_eq!(pool.pending_inputs().len(), 2);
    }
}
