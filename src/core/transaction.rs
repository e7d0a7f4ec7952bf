// Transactions, their inputs and outputs, and the content hash that identifies them.
// Value lives in unspent outputs; a transaction consumes some and creates new ones.

use crate::core::COINBASE_AMOUNT;
use crate::error::Result;
use crate::utils::{deserialize, from_json, serialize, sha256_hex, to_json};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity key of an output: the transaction that created it and its position there
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutPoint {
    pub source_tx_id: String,
    pub output_index: u64,
}

impl OutPoint {
    pub fn new(source_tx_id: &str, output_index: u64) -> OutPoint {
        OutPoint {
            source_tx_id: source_tx_id.to_string(),
            output_index,
        }
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source_tx_id, self.output_index)
    }
}

// A spendable output recorded in the UTXO set
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
#[serde(rename_all = "camelCase")]
pub struct UnspentTxOut {
    source_tx_id: String,
    output_index: u64,
    address: String,
    amount: u64,
}

impl UnspentTxOut {
    pub fn new(source_tx_id: &str, output_index: u64, address: &str, amount: u64) -> UnspentTxOut {
        UnspentTxOut {
            source_tx_id: source_tx_id.to_string(),
            output_index,
            address: address.to_string(),
            amount,
        }
    }

    pub fn get_source_tx_id(&self) -> &str {
        self.source_tx_id.as_str()
    }

    pub fn get_output_index(&self) -> u64 {
        self.output_index
    }

    pub fn get_address(&self) -> &str {
        self.address.as_str()
    }

    pub fn get_amount(&self) -> u64 {
        self.amount
    }

    pub fn out_point(&self) -> OutPoint {
        OutPoint::new(&self.source_tx_id, self.output_index)
    }
}

// "I want to spend output #output_index of transaction source_tx_id"
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    bincode::Encode,
    bincode::Decode,
)]
#[serde(rename_all = "camelCase")]
pub struct TxIn {
    source_tx_id: String,
    output_index: u64,
    signature: String, // empty until signed
}

impl TxIn {
    pub fn new(source_tx_id: &str, output_index: u64) -> TxIn {
        TxIn {
            source_tx_id: source_tx_id.to_string(),
            output_index,
            signature: String::new(),
        }
    }

    pub fn get_source_tx_id(&self) -> &str {
        self.source_tx_id.as_str()
    }

    pub fn get_output_index(&self) -> u64 {
        self.output_index
    }

    pub fn get_signature(&self) -> &str {
        self.signature.as_str()
    }

    pub fn out_point(&self) -> OutPoint {
        OutPoint::new(&self.source_tx_id, self.output_index)
    }
}

// "Pay amount to whoever holds the private key behind address"
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct TxOut {
    address: String,
    amount: u64,
}

impl TxOut {
    pub fn new(address: &str, amount: u64) -> TxOut {
        TxOut {
            address: address.to_string(),
            amount,
        }
    }

    pub fn get_address(&self) -> &str {
        self.address.as_str()
    }

    pub fn get_amount(&self) -> u64 {
        self.amount
    }
}

/// Content hash of a transaction: SHA-256 over, in order, every input's
/// `source_tx_id` and `output_index` followed by every output's `address` and `amount`.
/// Signatures are not part of the content.
pub fn compute_id(ins: &[TxIn], outs: &[TxOut]) -> String {
    let mut content = String::new();
    for tx_in in ins {
        content.push_str(&tx_in.source_tx_id);
        content.push_str(&tx_in.output_index.to_string());
    }
    for tx_out in outs {
        content.push_str(&tx_out.address);
        content.push_str(&tx_out.amount.to_string());
    }
    sha256_hex(content.as_bytes())
}

#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct Transaction {
    id: String,
    ins: Vec<TxIn>,
    outs: Vec<TxOut>,
}

impl Transaction {
    /// Build a transaction whose id is the content hash of `ins` and `outs`
    pub fn new(ins: Vec<TxIn>, outs: Vec<TxOut>) -> Transaction {
        let id = compute_id(&ins, &outs);
        Transaction { id, ins, outs }
    }

    /// Reassemble a transaction as received, keeping whatever id it claims.
    /// Validation decides whether that id is honest.
    pub fn from_parts(id: &str, ins: Vec<TxIn>, outs: Vec<TxOut>) -> Transaction {
        Transaction {
            id: id.to_string(),
            ins,
            outs,
        }
    }

    /// The minting transaction of block `block_index`: its single input carries
    /// the block height instead of a real reference.
    pub fn coinbase(address: &str, block_index: u64) -> Transaction {
        let tx_in = TxIn::new("", block_index);
        Transaction::new(vec![tx_in], vec![TxOut::new(address, COINBASE_AMOUNT)])
    }

    pub fn get_id(&self) -> &str {
        self.id.as_str()
    }

    pub fn get_ins(&self) -> &[TxIn] {
        self.ins.as_slice()
    }

    pub fn get_outs(&self) -> &[TxOut] {
        self.outs.as_slice()
    }

    pub fn out_points(&self) -> impl Iterator<Item = OutPoint> + '_ {
        self.ins.iter().map(TxIn::out_point)
    }

    pub fn has_valid_id(&self) -> bool {
        compute_id(&self.ins, &self.outs) == self.id
    }

    // Signatures do not feed the id, so setting one never invalidates it
    pub(crate) fn set_signature(&mut self, input_index: usize, signature: String) {
        if let Some(tx_in) = self.ins.get_mut(input_index) {
            tx_in.signature = signature;
        }
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Transaction> {
        deserialize(bytes)
    }

    pub fn to_json(&self) -> Result<String> {
        to_json(self)
    }

    pub fn from_json(json: &str) -> Result<Transaction> {
        from_json(json)
    }
}
