//! Guard covenant types
//!
//! The guard is the per-transaction conservation checker. Its state and
//! unlock witness are fixed-capacity arrays: the capacity variant is chosen
//! once when the guard UTXO is created and never resized afterwards.
//!
//! ## Variants
//!
//! | Variant | Inputs (N) | Outputs (M) | Token types (K) |
//! |---|---|---|---|
//! | `Inputs6Types2` | 6 | 6 | 2 |
//! | `Inputs6Types4` | 6 | 6 | 4 |
//! | `Inputs12Types2` | 12 | 12 | 2 |
//! | `Inputs12Types4` | 12 | 12 | 4 |

use super::common::{OwnerAddr, ScriptHash, SignatureProof, StateHash};
use super::token::TokenState;
use crate::codec::StateCodec;
use crate::errors::{VerifyError, VerifyResult};
use bitcoin::{Script, ScriptBuf};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index value marking an input that is not a token input
pub const NO_TOKEN_INDEX: i8 = -1;

/// Fixed-capacity guard variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GuardVariant {
    Inputs6Types2,
    Inputs6Types4,
    Inputs12Types2,
    Inputs12Types4,
}

impl GuardVariant {
    /// All variants, smallest first
    pub const ALL: [GuardVariant; 4] = [
        GuardVariant::Inputs6Types2,
        GuardVariant::Inputs6Types4,
        GuardVariant::Inputs12Types2,
        GuardVariant::Inputs12Types4,
    ];

    pub const fn input_capacity(&self) -> usize {
        match self {
            Self::Inputs6Types2 | Self::Inputs6Types4 => 6,
            Self::Inputs12Types2 | Self::Inputs12Types4 => 12,
        }
    }

    pub const fn output_capacity(&self) -> usize {
        self.input_capacity()
    }

    pub const fn type_capacity(&self) -> usize {
        match self {
            Self::Inputs6Types2 | Self::Inputs12Types2 => 2,
            Self::Inputs6Types4 | Self::Inputs12Types4 => 4,
        }
    }

    /// Variant with exactly these input and type capacities
    pub fn from_capacities(inputs: usize, types: usize) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.input_capacity() == inputs && v.type_capacity() == types)
    }

    /// Smallest variant that fits a transaction shape
    pub fn select(input_count: usize, output_count: usize, type_count: usize) -> VerifyResult<Self> {
        Self::ALL
            .into_iter()
            .find(|v| {
                input_count <= v.input_capacity()
                    && output_count <= v.output_capacity()
                    && type_count <= v.type_capacity()
            })
            .ok_or_else(|| {
                VerifyError::capacity(format!(
                    "no guard variant fits {} inputs, {} outputs, {} token types",
                    input_count, output_count, type_count
                ))
            })
    }
}

impl fmt::Display for GuardVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "guard_{}x{}_t{}",
            self.input_capacity(),
            self.output_capacity(),
            self.type_capacity()
        )
    }
}

/// Committed state of a guard UTXO
///
/// Deserialization runs [`GuardState::validate_shape`], so a decoded state
/// always matches one variant and carries a P2PKH deployer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GuardStateFields")]
pub struct GuardState {
    /// Token script hash per type slot; `None` for unpopulated slots
    pub token_script_hashes: Vec<Option<ScriptHash>>,
    /// Type slot per transaction input, `-1` for non-token inputs
    pub token_script_indexes: Vec<i8>,
    /// P2PKH script of the party allowed to spend the guard
    pub deployer_addr: ScriptBuf,
}

#[derive(Deserialize)]
struct GuardStateFields {
    token_script_hashes: Vec<Option<ScriptHash>>,
    token_script_indexes: Vec<i8>,
    deployer_addr: ScriptBuf,
}

impl TryFrom<GuardStateFields> for GuardState {
    type Error = VerifyError;

    fn try_from(fields: GuardStateFields) -> Result<Self, Self::Error> {
        let state = GuardState {
            token_script_hashes: fields.token_script_hashes,
            token_script_indexes: fields.token_script_indexes,
            deployer_addr: fields.deployer_addr,
        };
        state.validate_shape()?;
        Ok(state)
    }
}

impl GuardState {
    /// Build a guard state for `variant`, padding both arrays to capacity
    pub fn new(
        variant: GuardVariant,
        mut token_script_hashes: Vec<Option<ScriptHash>>,
        mut token_script_indexes: Vec<i8>,
        deployer_addr: ScriptBuf,
    ) -> VerifyResult<Self> {
        if token_script_hashes.len() > variant.type_capacity() {
            return Err(VerifyError::capacity(format!(
                "{} token types exceed {} capacity",
                token_script_hashes.len(),
                variant
            )));
        }
        if token_script_indexes.len() > variant.input_capacity() {
            return Err(VerifyError::capacity(format!(
                "{} inputs exceed {} capacity",
                token_script_indexes.len(),
                variant
            )));
        }
        token_script_hashes.resize(variant.type_capacity(), None);
        token_script_indexes.resize(variant.input_capacity(), NO_TOKEN_INDEX);

        let state = Self {
            token_script_hashes,
            token_script_indexes,
            deployer_addr,
        };
        state.validate_shape()?;
        Ok(state)
    }

    /// Check array lengths, index domain and deployer script
    ///
    /// Slot uniqueness is left to the guard verifier, which rejects
    /// duplicated slots when the guard is spent.
    pub fn validate_shape(&self) -> VerifyResult<GuardVariant> {
        let variant = GuardVariant::from_capacities(
            self.token_script_indexes.len(),
            self.token_script_hashes.len(),
        )
        .ok_or_else(|| {
            VerifyError::capacity(format!(
                "no guard variant with {} inputs and {} token types",
                self.token_script_indexes.len(),
                self.token_script_hashes.len()
            ))
        })?;

        for (i, &index) in self.token_script_indexes.iter().enumerate() {
            if index == NO_TOKEN_INDEX {
                continue;
            }
            if index < NO_TOKEN_INDEX || index as usize >= variant.type_capacity() {
                return Err(VerifyError::parameter(format!(
                    "token script index {} of input {} is out of range",
                    index, i
                )));
            }
            if self.token_script_hashes[index as usize].is_none() {
                return Err(VerifyError::parameter(format!(
                    "input {} refers to unpopulated token slot {}",
                    i, index
                )));
            }
        }

        if !self.deployer_addr.is_p2pkh() {
            return Err(VerifyError::parameter("deployer address must be a P2PKH script"));
        }

        Ok(variant)
    }

    /// Type slot of the token input at `input_index`, if any
    pub fn slot_of_input(&self, input_index: usize) -> Option<usize> {
        match self.token_script_indexes.get(input_index) {
            Some(&index) if index >= 0 => Some(index as usize),
            _ => None,
        }
    }

    /// Script hash populated at `slot`
    pub fn script_hash_at(&self, slot: usize) -> Option<&ScriptHash> {
        self.token_script_hashes.get(slot).and_then(|h| h.as_ref())
    }

    pub fn populated_slots(&self) -> impl Iterator<Item = (usize, &ScriptHash)> {
        self.token_script_hashes
            .iter()
            .enumerate()
            .filter_map(|(slot, hash)| hash.as_ref().map(|h| (slot, h)))
    }
}

/// Witness-declared description of one transaction output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardOutput {
    /// Token owner for token outputs, output script hash otherwise
    #[serde(with = "crate::shared::hex_serde")]
    pub owner_or_script_hash: Vec<u8>,
    pub amount: u64,
    /// Type slot of a token output, `-1` for other outputs
    pub token_index: i8,
    pub satoshis: u64,
    pub next_state_hash: StateHash,
}

impl GuardOutput {
    /// Declare a token output of type `slot`
    pub fn token(owner: &OwnerAddr, amount: u64, slot: usize, satoshis: u64) -> Self {
        let state = TokenState::new(owner.clone(), amount);
        Self {
            owner_or_script_hash: owner.to_bytes(),
            amount,
            token_index: slot as i8,
            satoshis,
            next_state_hash: state.state_hash(),
        }
    }

    /// Declare a non-token output
    pub fn plain(script_pubkey: &Script, satoshis: u64, state_hash: StateHash) -> Self {
        Self {
            owner_or_script_hash: ScriptHash::of_script(script_pubkey).0.to_vec(),
            amount: 0,
            token_index: NO_TOKEN_INDEX,
            satoshis,
            next_state_hash: state_hash,
        }
    }

    pub fn is_token(&self) -> bool {
        self.token_index != NO_TOKEN_INDEX
    }
}

/// Unlock witness of a guard spend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardWitness {
    /// Claimed input total per type slot
    pub token_amounts: Vec<u64>,
    /// Burned amount per type slot
    pub token_burn_amounts: Vec<u64>,
    /// One entry per transaction output
    pub outputs: Vec<GuardOutput>,
    /// Spent token state per transaction input, `None` for non-token inputs
    pub input_token_states: Vec<Option<TokenState>>,
    pub deployer: SignatureProof,
}
