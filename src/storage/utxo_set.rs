use crate::core::{OutPoint, Transaction, TxIn, UnspentTxOut};
use crate::error::{LedgerError, Result};
use indexmap::IndexMap;
use std::sync::Arc;

/// Immutable snapshot of every currently spendable output.
///
/// Cloning is cheap: snapshots share their entries. `apply` never touches the
/// receiver, it builds the next snapshot, so readers can keep validating against
/// an old one while a new one is produced. Entries keep insertion order so that
/// wallet-side selection walks them deterministically.
#[derive(Debug, Clone, Default)]
pub struct UTXOSet {
    entries: Arc<IndexMap<OutPoint, UnspentTxOut>>,
}

impl PartialEq for UTXOSet {
    // Equality is as a mapping; order is ignored
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(key, utxo)| other.entries.get(key) == Some(utxo))
    }
}

impl Eq for UTXOSet {}

impl UTXOSet {
    pub fn new() -> UTXOSet {
        UTXOSet::default()
    }

    /// Build a snapshot from existing outputs. A repeated key keeps the last entry.
    pub fn from_unspent<I>(unspent: I) -> UTXOSet
    where
        I: IntoIterator<Item = UnspentTxOut>,
    {
        let entries = unspent
            .into_iter()
            .map(|utxo| (utxo.out_point(), utxo))
            .collect::<IndexMap<_, _>>();
        UTXOSet {
            entries: Arc::new(entries),
        }
    }

    pub fn find(&self, source_tx_id: &str, output_index: u64) -> Option<&UnspentTxOut> {
        self.entries.get(&OutPoint::new(source_tx_id, output_index))
    }

    pub fn contains(&self, out_point: &OutPoint) -> bool {
        self.entries.contains_key(out_point)
    }

    /// Amount of every referenced output, in input order
    pub fn amounts_for(&self, ins: &[TxIn]) -> Result<Vec<u64>> {
        ins.iter()
            .map(|tx_in| {
                self.find(tx_in.get_source_tx_id(), tx_in.get_output_index())
                    .map(UnspentTxOut::get_amount)
                    .ok_or_else(|| LedgerError::UnknownReference {
                        source_tx_id: tx_in.get_source_tx_id().to_string(),
                        output_index: tx_in.get_output_index(),
                    })
            })
            .collect()
    }

    /// Next snapshot after confirming `transactions`: surviving entries in their
    /// previous order, then one entry per output of every transaction in batch order.
    /// The batch must already be validated.
    pub fn apply(&self, transactions: &[Transaction]) -> UTXOSet {
        let consumed = transactions
            .iter()
            .flat_map(|tx| tx.out_points())
            .collect::<std::collections::HashSet<_>>();

        let mut next = self
            .entries
            .iter()
            .filter(|(key, _)| !consumed.contains(*key))
            .map(|(key, utxo)| (key.clone(), utxo.clone()))
            .collect::<IndexMap<_, _>>();

        for tx in transactions {
            for (idx, out) in tx.get_outs().iter().enumerate() {
                let utxo =
                    UnspentTxOut::new(tx.get_id(), idx as u64, out.get_address(), out.get_amount());
                next.insert(utxo.out_point(), utxo);
            }
        }

        log::debug!(
            "UTXO set advanced by {} transactions: {} -> {} entries",
            transactions.len(),
            self.entries.len(),
            next.len()
        );
        UTXOSet {
            entries: Arc::new(next),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnspentTxOut> {
        self.entries.values()
    }

    /// Outputs locked to `address`, in snapshot order
    pub fn owned_by<'a>(&'a self, address: &'a str) -> impl Iterator<Item = &'a UnspentTxOut> {
        self.entries
            .values()
            .filter(move |utxo| utxo.get_address() == address)
    }

    pub fn balance_of(&self, address: &str) -> u64 {
        self.owned_by(address)
            .fold(0u64, |acc, utxo| acc.saturating_add(utxo.get_amount()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TxOut;

    fn addr(c: char) -> String {
        c.to_string().repeat(128)
    }

    fn base() -> UTXOSet {
        UTXOSet::from_unspent(vec![
            UnspentTxOut::new("T1", 0, &addr('a'), 50),
            UnspentTxOut::new("T1", 1, &addr('b'), 10),
            UnspentTxOut::new("T2", 0, &addr('a'), 5),
        ])
    }

    #[test]
    fn test_find_present_and_absent() {
        let set = base();
        assert_eq!(set.find("T1", 1).unwrap().get_amount(), 10);
        assert!(set.find("T1", 2).is_none());
        assert!(set.find("T9", 0).is_none());
    }

    #[test]
    fn test_amounts_for() {
        let set = base();
        let amounts = set
            .amounts_for(&[TxIn::new("T2", 0), TxIn::new("T1", 0)])
            .unwrap();
        assert_eq!(amounts, vec![5, 50]);

        let err = set.amounts_for(&[TxIn::new("T1", 0), TxIn::new("T3", 0)]);
        assert_eq!(
            err,
            Err(LedgerError::UnknownReference {
                source_tx_id: "T3".to_string(),
                output_index: 0
            })
        );
    }

    #[test]
    fn test_apply_consumes_and_creates() {
        let set = base();
        let tx = Transaction::new(
            vec![TxIn::new("T1", 0)],
            vec![TxOut::new(&addr('c'), 30), TxOut::new(&addr('a'), 20)],
        );
        let next = set.apply(std::slice::from_ref(&tx));

        assert!(next.find("T1", 0).is_none());
        assert_eq!(next.find(tx.get_id(), 0).unwrap().get_amount(), 30);
        assert_eq!(next.find(tx.get_id(), 1).unwrap().get_address(), addr('a'));
        assert_eq!(next.len(), 4);

        // the base snapshot is untouched
        assert_eq!(set.len(), 3);
        assert!(set.find("T1", 0).is_some());
    }

    #[test]
    fn test_apply_keeps_order() {
        let set = base();
        let tx = Transaction::new(vec![TxIn::new("T1", 1)], vec![TxOut::new(&addr('d'), 10)]);
        let next = set.apply(&[tx.clone()]);
        let keys = next.iter().map(UnspentTxOut::out_point).collect::<Vec<_>>();
        assert_eq!(
            keys,
            vec![
                OutPoint::new("T1", 0),
                OutPoint::new("T2", 0),
                OutPoint::new(tx.get_id(), 0)
            ]
        );
    }

    #[test]
    fn test_apply_disjoint_batches_commute() {
        let set = base();
        let a = Transaction::new(vec![TxIn::new("T1", 0)], vec![TxOut::new(&addr('c'), 50)]);
        let b = Transaction::new(vec![TxIn::new("T2", 0)], vec![TxOut::new(&addr('d'), 5)]);

        let ab = set.apply(&[a.clone()]).apply(&[b.clone()]);
        let ba = set.apply(&[b]).apply(&[a]);
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_balance_and_ownership() {
        let set = base();
        assert_eq!(set.balance_of(&addr('a')), 55);
        assert_eq!(set.owned_by(&addr('a')).count(), 2);
        assert_eq!(set.balance_of(&addr('z')), 0);
    }
}
