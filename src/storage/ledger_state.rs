use crate::core::{Transaction, TransactionValidator};
use crate::error::Rejection;
use crate::storage::{TransactionPool, UTXOSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Owner of the current UTXO snapshot and the transaction pool.
///
/// Snapshot transitions are single-writer: a batch is validated, applied and the
/// pool reconciled while holding one lock, so two batches can never be applied
/// against the same base snapshot. Readers take a cheap clone of the current
/// snapshot and may validate against it freely.
pub struct LedgerState {
    current: Mutex<UTXOSet>,
    pool: TransactionPool,
    validator: TransactionValidator,
}

impl LedgerState {
    pub fn new(genesis: UTXOSet, validator: TransactionValidator) -> LedgerState {
        LedgerState {
            current: Mutex::new(genesis),
            pool: TransactionPool::with_validator(validator.clone()),
            validator,
        }
    }

    fn lock(&self) -> MutexGuard<'_, UTXOSet> {
        // the snapshot is replaced in a single assignment, never left half-built
        self.current.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            log::error!("Ledger state lock poisoned, continuing with last snapshot");
            poisoned.into_inner()
        })
    }

    pub fn snapshot(&self) -> UTXOSet {
        self.lock().clone()
    }

    pub fn pool(&self) -> &TransactionPool {
        &self.pool
    }

    /// Admit a relayed or locally built transaction against the current snapshot
    pub fn submit(&self, transaction: Transaction) -> Result<(), Rejection> {
        let current = self.lock();
        self.pool.admit(transaction, &current)
    }

    /// Confirm the transactions of block `block_index`. Nothing changes unless the
    /// whole batch is valid. Returns the new snapshot.
    pub fn apply_batch(
        &self,
        transactions: &[Transaction],
        block_index: u64,
    ) -> Result<UTXOSet, Rejection> {
        let mut current = self.lock();
        let next = self
            .validator
            .process_batch(transactions, &current, block_index)?;
        *current = next.clone();
        let evicted = self.pool.reconcile(&next);
        log::info!(
            "Applied block {block_index}: {} txs, {} unspent outputs, {evicted} evicted",
            transactions.len(),
            next.len()
        );
        Ok(next)
    }
}
