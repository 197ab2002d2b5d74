//! Transaction context seen by the covenants
//!
//! A covenant never sees a bare transaction: it sees every input with the
//! locking script and state commitment of the output being spent, every output
//! with its committed state hash, and the digest all signatures commit to.

use super::common::{ScriptHash, StateHash};
use crate::errors::{VerifyError, VerifyResult};
use bitcoin::{OutPoint, ScriptBuf};
use serde::{Deserialize, Serialize};

/// A spent output as seen from the spending transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputContext {
    pub outpoint: OutPoint,
    pub script_pubkey: ScriptBuf,
    pub satoshis: u64,
    #[serde(default)]
    pub state_hash: StateHash,
}

impl InputContext {
    pub fn script_hash(&self) -> ScriptHash {
        ScriptHash::of_script(&self.script_pubkey)
    }
}

/// A produced output with its committed state hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputContext {
    pub script_pubkey: ScriptBuf,
    pub satoshis: u64,
    #[serde(default)]
    pub state_hash: StateHash,
}

impl OutputContext {
    pub fn script_hash(&self) -> ScriptHash {
        ScriptHash::of_script(&self.script_pubkey)
    }
}

/// The spending transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxContext {
    pub inputs: Vec<InputContext>,
    pub outputs: Vec<OutputContext>,
    /// Digest every signature in the unlock witnesses commits to
    #[serde(with = "sighash_hex")]
    pub sighash: [u8; 32],
}

impl TxContext {
    pub fn input(&self, index: usize) -> VerifyResult<&InputContext> {
        self.inputs.get(index).ok_or_else(|| {
            VerifyError::parameter(format!(
                "input index {} out of range ({} inputs)",
                index,
                self.inputs.len()
            ))
        })
    }

    pub fn output(&self, index: usize) -> VerifyResult<&OutputContext> {
        self.outputs.get(index).ok_or_else(|| {
            VerifyError::parameter(format!(
                "output index {} out of range ({} outputs)",
                index,
                self.outputs.len()
            ))
        })
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }
}

mod sighash_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        crate::shared::hex_serde::decode_array32(&s).map_err(serde::de::Error::custom)
    }
}
