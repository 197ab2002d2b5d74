//! Chain access for ancestry lookups and scenario building
//!
//! Covenant verification is pure; the ledger only supplies raw ancestor
//! transactions (for backtrace witnesses) and tracks which outputs are
//! spendable together with their state commitments.

pub mod memory;

pub use memory::{LedgerStats, MemoryLedger};

use crate::errors::LedgerResult;
use crate::types::StateHash;
use bitcoin::{Network, OutPoint, Script, TxOut, Txid};
use serde::{Deserialize, Serialize};

/// Unspent output with its committed state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub outpoint: OutPoint,
    pub output: TxOut,
    pub state_hash: StateHash,
}

/// Read access to a chain
pub trait ChainSource {
    /// Consensus-encoded bytes of a known transaction
    fn get_raw_transaction(&self, txid: &Txid) -> LedgerResult<Vec<u8>>;

    /// Unspent outputs locked by `script_pubkey`
    fn get_utxos(&self, script_pubkey: &Script) -> Vec<Utxo>;

    fn network(&self) -> Network;
}
