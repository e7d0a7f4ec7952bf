use crate::core::{OutPoint, Transaction, TransactionValidator};
use crate::error::Rejection;
use crate::storage::UTXOSet;
use std::collections::HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Transactions seen but not yet confirmed, in arrival order.
///
/// No output is referenced by more than one pending input across the whole pool.
/// `admit` and `reconcile` both take the write lock, so that rule holds under
/// concurrent callers.
pub struct TransactionPool {
    inner: RwLock<Vec<Transaction>>,
    validator: TransactionValidator,
}

impl Default for TransactionPool {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionPool {
    pub fn new() -> TransactionPool {
        Self::with_validator(TransactionValidator::default())
    }

    pub fn with_validator(validator: TransactionValidator) -> TransactionPool {
        TransactionPool {
            inner: RwLock::new(vec![]),
            validator,
        }
    }

    // The pool vector is only pushed to after every check passed and only
    // filtered in place, so a poisoned lock still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Transaction>> {
        self.inner.read().unwrap_or_else(|poisoned: PoisonError<_>| {
            log::error!("Transaction pool lock poisoned, continuing with inner state");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Transaction>> {
        self.inner.write().unwrap_or_else(|poisoned: PoisonError<_>| {
            log::error!("Transaction pool lock poisoned, continuing with inner state");
            poisoned.into_inner()
        })
    }

    /// Validate `transaction` against `utxo_set` and append it if none of its
    /// inputs is already pending. Identical resubmissions are caught by the
    /// input conflict, not by id.
    pub fn admit(&self, transaction: Transaction, utxo_set: &UTXOSet) -> Result<(), Rejection> {
        self.validator.validate_transaction(&transaction, utxo_set)?;

        let mut pool = self.write();
        let mut pending = pool
            .iter()
            .flat_map(|tx| tx.out_points())
            .collect::<HashSet<_>>();
        // insert as we go so an input repeated inside the transaction also conflicts
        if let Some(conflict) = transaction.out_points().find(|op| !pending.insert(op.clone())) {
            log::warn!(
                "Transaction {} spends {conflict} which is already pending",
                transaction.get_id()
            );
            return Err(Rejection::DuplicateSpendInPool {
                source_tx_id: conflict.source_tx_id,
                output_index: conflict.output_index,
            });
        }

        log::debug!("Adding transaction {} to the pool", transaction.get_id());
        pool.push(transaction);
        Ok(())
    }

    /// Drop every pending transaction with an input missing from `utxo_set`.
    /// Survivors keep their relative order. Returns how many were dropped.
    pub fn reconcile(&self, utxo_set: &UTXOSet) -> usize {
        let mut pool = self.write();
        let before = pool.len();
        pool.retain(|tx| {
            let satisfiable = tx.out_points().all(|op| utxo_set.contains(&op));
            if !satisfiable {
                log::info!("Removing transaction {} from the pool", tx.get_id());
            }
            satisfiable
        });
        before - pool.len()
    }

    /// Every output referenced by a pending input
    pub fn pending_inputs(&self) -> Vec<OutPoint> {
        self.read()
            .iter()
            .flat_map(|tx| tx.out_points())
            .collect()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.read().clone()
    }

    pub fn contains(&self, txid: &str) -> bool {
        self.read().iter().any(|tx| tx.get_id() == txid)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn clear(&self) {
        self.write().clear();
    }
}
