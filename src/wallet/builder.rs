// Wallet-side construction of payments: pick my unspent outputs, add change, sign.

use crate::core::{OutPoint, Transaction, TxIn, TxOut, UnspentTxOut};
use crate::error::{LedgerError, Result};
use crate::storage::{TransactionPool, UTXOSet};
use crate::utils::{derive_public_address, is_valid_address, secp256k1_sign};
use std::collections::HashSet;

pub struct TransactionBuilder;

impl TransactionBuilder {
    /// Build and sign a payment of `amount` to `receiver_address` from the outputs
    /// owned by `private_key`. Outputs already spent by a pending pool transaction
    /// are never reused.
    pub fn build(
        receiver_address: &str,
        amount: u64,
        private_key: &[u8],
        utxo_set: &UTXOSet,
        pool: &TransactionPool,
    ) -> Result<Transaction> {
        if !is_valid_address(receiver_address) {
            return Err(LedgerError::InvalidAddress(receiver_address.to_string()));
        }
        let my_address = derive_public_address(private_key)?;

        let pending = pool.pending_inputs().into_iter().collect::<HashSet<_>>();
        let candidates = Self::spendable_outputs(&my_address, utxo_set, &pending);
        log::debug!(
            "Building payment of {amount} with {} candidate outputs ({} pending transactions)",
            candidates.len(),
            pool.len()
        );

        let (selected, leftover) = Self::select_outputs(amount, &candidates)?;

        let ins = selected
            .iter()
            .map(|utxo| TxIn::new(utxo.get_source_tx_id(), utxo.get_output_index()))
            .collect::<Vec<_>>();
        let outs = Self::create_outs(receiver_address, &my_address, amount, leftover);

        let mut tx = Transaction::new(ins, outs);
        Self::sign_transaction(&mut tx, private_key, utxo_set)?;
        Ok(tx)
    }

    fn spendable_outputs<'a>(
        my_address: &str,
        utxo_set: &'a UTXOSet,
        pending: &HashSet<OutPoint>,
    ) -> Vec<&'a UnspentTxOut> {
        utxo_set
            .iter()
            .filter(|utxo| utxo.get_address() == my_address)
            .filter(|utxo| !pending.contains(&utxo.out_point()))
            .collect()
    }

    // Greedy, in snapshot order: stop as soon as the amount is covered
    fn select_outputs<'a>(
        amount: u64,
        candidates: &[&'a UnspentTxOut],
    ) -> Result<(Vec<&'a UnspentTxOut>, u64)> {
        let mut accumulated = 0u64;
        let mut selected = vec![];
        for utxo in candidates {
            selected.push(*utxo);
            accumulated = accumulated.saturating_add(utxo.get_amount());
            if accumulated >= amount {
                return Ok((selected, accumulated - amount));
            }
        }
        Err(LedgerError::InsufficientFunds {
            required: amount,
            available: accumulated,
        })
    }

    fn create_outs(receiver: &str, my_address: &str, amount: u64, leftover: u64) -> Vec<TxOut> {
        let mut outs = vec![TxOut::new(receiver, amount)];
        if leftover > 0 {
            outs.push(TxOut::new(my_address, leftover));
        }
        outs
    }

    /// Sign every input of `transaction` in order
    pub fn sign_transaction(
        transaction: &mut Transaction,
        private_key: &[u8],
        utxo_set: &UTXOSet,
    ) -> Result<()> {
        for idx in 0..transaction.get_ins().len() {
            let signature = Self::sign_input(transaction, idx, private_key, utxo_set)?;
            transaction.set_signature(idx, signature);
        }
        Ok(())
    }

    /// Signature for input `input_index`. The key must own the referenced output.
    pub fn sign_input(
        transaction: &Transaction,
        input_index: usize,
        private_key: &[u8],
        utxo_set: &UTXOSet,
    ) -> Result<String> {
        let tx_in = transaction.get_ins().get(input_index).ok_or_else(|| {
            LedgerError::Crypto(format!(
                "Transaction {} has no input {input_index}",
                transaction.get_id()
            ))
        })?;
        let referenced = utxo_set
            .find(tx_in.get_source_tx_id(), tx_in.get_output_index())
            .ok_or_else(|| LedgerError::UnknownReference {
                source_tx_id: tx_in.get_source_tx_id().to_string(),
                output_index: tx_in.get_output_index(),
            })?;

        let signer = derive_public_address(private_key)?;
        if signer != referenced.get_address() {
            return Err(LedgerError::AuthorizationMismatch {
                expected: referenced.get_address().to_string(),
                actual: signer,
            });
        }

        secp256k1_sign(transaction.get_id().as_bytes(), private_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::TransactionValidator;

    const ALICE: [u8; 32] = [8u8; 32];
    const BOB: [u8; 32] = [9u8; 32];

    fn address(key: &[u8; 32]) -> String {
        derive_public_address(key).unwrap()
    }

    fn validator() -> TransactionValidator {
        TransactionValidator::new(Config::default())
    }

    fn pool() -> TransactionPool {
        TransactionPool::with_validator(validator())
    }

    #[test]
    fn test_build_with_change() {
        let utxo_set =
            UTXOSet::from_unspent(vec![UnspentTxOut::new("T1", 0, &address(&ALICE), 50)]);
        let tx = TransactionBuilder::build(&address(&BOB), 30, &ALICE, &utxo_set, &pool()).unwrap();

        assert_eq!(
            tx.get_outs(),
            &[TxOut::new(&address(&BOB), 30), TxOut::new(&address(&ALICE), 20)]
        );
        assert_eq!(tx.get_ins().len(), 1);
        assert_eq!(tx.get_ins()[0].out_point(), OutPoint::new("T1", 0));
        assert!(!tx.get_ins()[0].get_signature().is_empty());
        assert_eq!(validator().validate_transaction(&tx, &utxo_set), Ok(()));
    }

    #[test]
    fn test_build_exact_amount_has_no_change() {
        let utxo_set =
            UTXOSet::from_unspent(vec![UnspentTxOut::new("T1", 0, &address(&ALICE), 50)]);
        let tx = TransactionBuilder::build(&address(&BOB), 50, &ALICE, &utxo_set, &pool()).unwrap();
        assert_eq!(tx.get_outs(), &[TxOut::new(&address(&BOB), 50)]);
    }

    #[test]
    fn test_build_insufficient_funds() {
        let utxo_set =
            UTXOSet::from_unspent(vec![UnspentTxOut::new("T1", 0, &address(&ALICE), 50)]);
        let result = TransactionBuilder::build(&address(&BOB), 60, &ALICE, &utxo_set, &pool());
        assert_eq!(
            result,
            Err(LedgerError::InsufficientFunds {
                required: 60,
                available: 50
            })
        );
    }

    #[test]
    fn test_build_selects_greedily_in_order() {
        let utxo_set = UTXOSet::from_unspent(vec![
            UnspentTxOut::new("T1", 0, &address(&ALICE), 10),
            UnspentTxOut::new("T1", 1, &address(&BOB), 100),
            UnspentTxOut::new("T2", 0, &address(&ALICE), 15),
            UnspentTxOut::new("T3", 0, &address(&ALICE), 40),
        ]);
        let tx = TransactionBuilder::build(&address(&BOB), 20, &ALICE, &utxo_set, &pool()).unwrap();
        let refs = tx.out_points().collect::<Vec<_>>();
        assert_eq!(refs, vec![OutPoint::new("T1", 0), OutPoint::new("T2", 0)]);
        assert_eq!(tx.get_outs()[1].get_amount(), 5);
        assert_eq!(validator().validate_transaction(&tx, &utxo_set), Ok(()));
    }

    #[test]
    fn test_build_skips_outputs_pending_in_pool() {
        let utxo_set = UTXOSet::from_unspent(vec![
            UnspentTxOut::new("T1", 0, &address(&ALICE), 50),
            UnspentTxOut::new("T2", 0, &address(&ALICE), 50),
        ]);
        let pool = pool();
        let first =
            TransactionBuilder::build(&address(&BOB), 50, &ALICE, &utxo_set, &pool).unwrap();
        pool.admit(first, &utxo_set).unwrap();

        let second =
            TransactionBuilder::build(&address(&BOB), 50, &ALICE, &utxo_set, &pool).unwrap();
        assert_eq!(second.out_points().collect::<Vec<_>>(), vec![OutPoint::new("T2", 0)]);
        assert_eq!(pool.admit(second, &utxo_set), Ok(()));

        let third = TransactionBuilder::build(&address(&BOB), 1, &ALICE, &utxo_set, &pool);
        assert_eq!(
            third,
            Err(LedgerError::InsufficientFunds {
                required: 1,
                available: 0
            })
        );
    }

    #[test]
    fn test_sign_input_requires_ownership() {
        let utxo_set =
            UTXOSet::from_unspent(vec![UnspentTxOut::new("T1", 0, &address(&ALICE), 50)]);
        let tx = Transaction::new(vec![TxIn::new("T1", 0)], vec![TxOut::new(&address(&BOB), 50)]);
        let result = TransactionBuilder::sign_input(&tx, 0, &BOB, &utxo_set);
        assert!(matches!(result, Err(LedgerError::AuthorizationMismatch { .. })));

        let missing = TransactionBuilder::sign_input(&tx, 0, &ALICE, &UTXOSet::new());
        assert!(matches!(missing, Err(LedgerError::UnknownReference { .. })));
    }

    #[test]
    fn test_build_rejects_bad_receiver() {
        let utxo_set =
            UTXOSet::from_unspent(vec![UnspentTxOut::new("T1", 0, &address(&ALICE), 50)]);
        let result = TransactionBuilder::build("nope", 10, &ALICE, &utxo_set, &pool());
        assert!(matches!(result, Err(LedgerError::InvalidAddress(_))));
    }
}
