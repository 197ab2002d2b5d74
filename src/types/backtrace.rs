//! Backtrace witness
//!
//! The parent and grandparent transactions of the UTXO being spent, in
//! consensus encoding, plus the index of the parent input the UTXO descends
//! from.

use crate::errors::{LedgerError, LedgerResult};
use crate::ledger::ChainSource;
use bitcoin::consensus::{deserialize, serialize};
use bitcoin::{OutPoint, Transaction};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktraceInfo {
    #[serde(with = "crate::shared::hex_serde")]
    pub prev_tx_preimage: Vec<u8>,
    pub prev_input_index: u32,
    #[serde(with = "crate::shared::hex_serde")]
    pub prev_prev_tx_preimage: Vec<u8>,
}

impl BacktraceInfo {
    pub fn from_transactions(
        prev_tx: &Transaction,
        prev_input_index: u32,
        prev_prev_tx: &Transaction,
    ) -> Self {
        Self {
            prev_tx_preimage: serialize(prev_tx),
            prev_input_index,
            prev_prev_tx_preimage: serialize(prev_prev_tx),
        }
    }

    /// Fetch both ancestor transactions of `outpoint` from a chain source
    pub fn resolve(
        chain: &dyn ChainSource,
        outpoint: &OutPoint,
        prev_input_index: u32,
    ) -> LedgerResult<Self> {
        let prev_raw = chain.get_raw_transaction(&outpoint.txid)?;
        let prev_tx: Transaction = deserialize(&prev_raw)
            .map_err(|e| LedgerError::DeserialisationFailed(e.to_string()))?;

        let input = prev_tx
            .input
            .get(prev_input_index as usize)
            .ok_or_else(|| LedgerError::MissingOutput {
                outpoint: format!("{}:input{}", outpoint.txid, prev_input_index),
            })?;
        let prev_prev_txid = input.previous_output.txid;
        debug!(
            "Resolving backtrace for {}: parent input {} spends {}",
            outpoint, prev_input_index, input.previous_output
        );

        let prev_prev_raw = chain.get_raw_transaction(&prev_prev_txid)?;

        Ok(Self {
            prev_tx_preimage: prev_raw,
            prev_input_index,
            prev_prev_tx_preimage: prev_prev_raw,
        })
    }
}
