//! Two-hop provenance verification
//!
//! Proves that the UTXO being spent descends from the protocol's genesis
//! commitment without walking the chain. Sound because every covenant output
//! was itself produced by a transaction that re-validated its own ancestry, so
//! checking the parent and grandparent is equivalent to a full walk.

use crate::errors::{VerifyError, VerifyResult};
use crate::types::{BacktraceInfo, ScriptHash};
use bitcoin::consensus::deserialize;
use bitcoin::{OutPoint, Transaction};
use serde::Serialize;
use tracing::debug;

/// How the chain of the verified UTXO terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Ancestry {
    /// The parent spent the genesis outpoint directly
    Genesis,
    /// The grandparent output sits on an allowed ancestor script
    Ancestor(ScriptHash),
}

/// Stateless backtrace checker
pub struct BacktraceVerifier;

impl BacktraceVerifier {
    /// Verify the ancestry of `outpoint`
    ///
    /// # Arguments
    ///
    /// * `info` - Parent and grandparent preimages plus the parent input index
    /// * `outpoint` - The outpoint being spent
    /// * `genesis` - Genesis outpoint for covenants that start at a genesis spend
    /// * `allowed_ancestors` - Script hashes a grandparent output may carry
    pub fn verify(
        info: &BacktraceInfo,
        outpoint: &OutPoint,
        genesis: Option<&OutPoint>,
        allowed_ancestors: &[ScriptHash],
    ) -> VerifyResult<Ancestry> {
        let prev_tx = decode_tx(&info.prev_tx_preimage, "prev tx")?;
        let prev_txid = prev_tx.compute_txid();
        if prev_txid != outpoint.txid {
            return Err(VerifyError::backtrace(format!(
                "prev tx id {} does not match outpoint {}",
                prev_txid, outpoint
            )));
        }
        if outpoint.vout as usize >= prev_tx.output.len() {
            return Err(VerifyError::backtrace(format!(
                "prev tx has no output {}",
                outpoint.vout
            )));
        }

        let input = prev_tx
            .input
            .get(info.prev_input_index as usize)
            .ok_or_else(|| {
                VerifyError::backtrace(format!(
                    "prev tx has no input {}",
                    info.prev_input_index
                ))
            })?;
        let ancestor_outpoint = input.previous_output;

        if genesis == Some(&ancestor_outpoint) {
            debug!("Backtrace of {} terminates at genesis", outpoint);
            return Ok(Ancestry::Genesis);
        }

        let prev_prev_tx = decode_tx(&info.prev_prev_tx_preimage, "prev prev tx")?;
        let prev_prev_txid = prev_prev_tx.compute_txid();
        if prev_prev_txid != ancestor_outpoint.txid {
            return Err(VerifyError::backtrace(format!(
                "prev prev tx id {} does not match ancestor outpoint {}",
                prev_prev_txid, ancestor_outpoint
            )));
        }

        let ancestor_output = prev_prev_tx
            .output
            .get(ancestor_outpoint.vout as usize)
            .ok_or_else(|| {
                VerifyError::backtrace(format!(
                    "prev prev tx has no output {}",
                    ancestor_outpoint.vout
                ))
            })?;
        let ancestor_hash = ScriptHash::of_script(&ancestor_output.script_pubkey);

        if !allowed_ancestors.contains(&ancestor_hash) {
            return Err(VerifyError::backtrace(format!(
                "ancestor script {} is not an allowed ancestor",
                ancestor_hash
            )));
        }

        debug!(
            "Backtrace of {} verified through ancestor {}",
            outpoint, ancestor_outpoint
        );
        Ok(Ancestry::Ancestor(ancestor_hash))
    }
}

fn decode_tx(bytes: &[u8], what: &str) -> VerifyResult<Transaction> {
    deserialize(bytes)
        .map_err(|e| VerifyError::backtrace(format!("{} preimage is invalid: {}", what, e)))
}
