use crate::config::{Config, GLOBAL_CONFIG};
use crate::core::{compute_id, OutPoint, Transaction, COINBASE_AMOUNT};
use crate::error::{LedgerError, Rejection};
use crate::storage::UTXOSet;
use crate::utils::{is_valid_address, secp256k1_verify};
use rayon::prelude::*;
use std::collections::HashSet;

/// Checks transactions and transaction batches against a UTXO snapshot.
///
/// Every check runs in a fixed order and the first failure is returned; later
/// checks never run. A batch is judged as a whole against the snapshot from
/// before the batch, so a transaction cannot spend an output created by another
/// transaction of the same batch.
#[derive(Debug, Clone)]
pub struct TransactionValidator {
    config: Config,
}

impl Default for TransactionValidator {
    fn default() -> Self {
        Self::new(GLOBAL_CONFIG.clone())
    }
}

impl TransactionValidator {
    pub fn new(config: Config) -> TransactionValidator {
        TransactionValidator { config }
    }

    /// Validate a regular (non-coinbase) transaction
    pub fn validate_transaction(
        &self,
        transaction: &Transaction,
        utxo_set: &UTXOSet,
    ) -> Result<(), Rejection> {
        let result = Self::check_transaction(transaction, utxo_set);
        self.report(transaction, &result);
        result
    }

    /// Validate the minting transaction of block `block_index`
    pub fn validate_coinbase(
        &self,
        transaction: &Transaction,
        block_index: u64,
    ) -> Result<(), Rejection> {
        let result = Self::check_coinbase(transaction, block_index);
        self.report(transaction, &result);
        result
    }

    /// Validate the transactions of one block. The first one must be the coinbase.
    pub fn validate_batch(
        &self,
        transactions: &[Transaction],
        utxo_set: &UTXOSet,
        block_index: u64,
    ) -> Result<(), Rejection> {
        let (coinbase, rest) = transactions.split_first().ok_or_else(|| {
            Rejection::CoinbaseShapeMismatch("batch has no coinbase transaction".to_string())
        })?;
        self.validate_coinbase(coinbase, block_index)?;

        if let Err(reason) = Self::check_no_duplicate_spends(rest) {
            if self.config.log_rejections {
                log::warn!("Batch for block {block_index} rejected: {reason}");
            }
            return Err(reason);
        }

        if self.config.parallel_verification {
            // signature checks are independent, but report in batch order
            let results = rest
                .par_iter()
                .map(|tx| Self::check_transaction(tx, utxo_set))
                .collect::<Vec<_>>();
            for (tx, result) in rest.iter().zip(results) {
                self.report(tx, &result);
                result?;
            }
        } else {
            for tx in rest {
                self.validate_transaction(tx, utxo_set)?;
            }
        }

        log::debug!(
            "Batch for block {block_index} with {} transactions is valid",
            transactions.len()
        );
        Ok(())
    }

    /// Validate a batch and, only if it is valid, produce the next snapshot
    pub fn process_batch(
        &self,
        transactions: &[Transaction],
        utxo_set: &UTXOSet,
        block_index: u64,
    ) -> Result<UTXOSet, Rejection> {
        self.validate_batch(transactions, utxo_set, block_index)?;
        Ok(utxo_set.apply(transactions))
    }

    fn report(&self, transaction: &Transaction, result: &Result<(), Rejection>) {
        if let Err(reason) = result {
            if self.config.log_rejections {
                log::warn!("Transaction {} rejected: {reason}", transaction.get_id());
            }
        }
    }

    fn check_transaction(transaction: &Transaction, utxo_set: &UTXOSet) -> Result<(), Rejection> {
        Self::check_structure(transaction)?;
        Self::check_identity(transaction)?;
        Self::check_inputs(transaction, utxo_set)?;
        Self::check_value(transaction, utxo_set)
    }

    fn check_structure(transaction: &Transaction) -> Result<(), Rejection> {
        for (idx, out) in transaction.get_outs().iter().enumerate() {
            if !is_valid_address(out.get_address()) {
                return Err(Rejection::MalformedStructure(format!(
                    "output {idx} address is not {} hex characters",
                    crate::utils::ADDRESS_HEX_LEN
                )));
            }
        }
        Ok(())
    }

    fn check_identity(transaction: &Transaction) -> Result<(), Rejection> {
        let expected = compute_id(transaction.get_ins(), transaction.get_outs());
        if expected != transaction.get_id() {
            return Err(Rejection::IdMismatch {
                expected,
                actual: transaction.get_id().to_string(),
            });
        }
        Ok(())
    }

    fn check_inputs(transaction: &Transaction, utxo_set: &UTXOSet) -> Result<(), Rejection> {
        for (idx, tx_in) in transaction.get_ins().iter().enumerate() {
            let referenced = utxo_set
                .find(tx_in.get_source_tx_id(), tx_in.get_output_index())
                .ok_or_else(|| Rejection::UnknownReference {
                    source_tx_id: tx_in.get_source_tx_id().to_string(),
                    output_index: tx_in.get_output_index(),
                })?;

            if !secp256k1_verify(
                transaction.get_id().as_bytes(),
                tx_in.get_signature(),
                referenced.get_address(),
            ) {
                return Err(Rejection::BadSignature { input_index: idx });
            }
        }
        Ok(())
    }

    fn check_value(transaction: &Transaction, utxo_set: &UTXOSet) -> Result<(), Rejection> {
        let amounts = utxo_set
            .amounts_for(transaction.get_ins())
            .map_err(|err| match err {
                LedgerError::UnknownReference {
                    source_tx_id,
                    output_index,
                } => Rejection::UnknownReference {
                    source_tx_id,
                    output_index,
                },
                other => Rejection::MalformedStructure(other.to_string()),
            })?;

        let inputs = amounts
            .iter()
            .try_fold(0u64, |acc, amount| acc.checked_add(*amount));
        let outputs = transaction
            .get_outs()
            .iter()
            .try_fold(0u64, |acc, out| acc.checked_add(out.get_amount()));

        match (inputs, outputs) {
            (Some(inputs), Some(outputs)) if inputs == outputs => Ok(()),
            (inputs, outputs) => Err(Rejection::ValueMismatch {
                inputs: inputs.unwrap_or(u64::MAX),
                outputs: outputs.unwrap_or(u64::MAX),
            }),
        }
    }

    fn check_coinbase(transaction: &Transaction, block_index: u64) -> Result<(), Rejection> {
        if transaction.get_ins().len() != 1 {
            return Err(Rejection::CoinbaseShapeMismatch(format!(
                "expected exactly one input, found {}",
                transaction.get_ins().len()
            )));
        }
        let height = transaction.get_ins()[0].get_output_index();
        if height != block_index {
            return Err(Rejection::CoinbaseShapeMismatch(format!(
                "input carries height {height}, block index is {block_index}"
            )));
        }
        if transaction.get_outs().len() != 1 {
            return Err(Rejection::CoinbaseShapeMismatch(format!(
                "expected exactly one output, found {}",
                transaction.get_outs().len()
            )));
        }
        let amount = transaction.get_outs()[0].get_amount();
        if amount != COINBASE_AMOUNT {
            return Err(Rejection::CoinbaseShapeMismatch(format!(
                "output amount {amount}, subsidy is {COINBASE_AMOUNT}"
            )));
        }
        Self::check_identity(transaction)
    }

    // The coinbase input carries a height, not a reference, so it is left out
    fn check_no_duplicate_spends(transactions: &[Transaction]) -> Result<(), Rejection> {
        let mut seen: HashSet<OutPoint> = HashSet::new();
        for out_point in transactions.iter().flat_map(|tx| tx.out_points()) {
            if seen.contains(&out_point) {
                return Err(Rejection::DuplicateSpendInBatch {
                    source_tx_id: out_point.source_tx_id,
                    output_index: out_point.output_index,
                });
            }
            seen.insert(out_point);
        }
        Ok(())
    }
}
