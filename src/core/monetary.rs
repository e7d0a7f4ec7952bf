/// Monetary constants of the ledger
///
/// Amounts are whole units stored as `u64`. There are no fees: every
/// non-minting transaction moves exactly the value it consumes.

/// Value minted by the coinbase transaction of every block
pub const COINBASE_AMOUNT: u64 = 50;
