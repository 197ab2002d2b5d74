//! Guard variant registry
//!
//! Every guard variant has a constant locking script and therefore a constant
//! script hash. The table is computed once on first use and never mutated;
//! token spends consult it to recognise a legitimate guard input.

use super::CovenantKind;
use crate::types::{GuardVariant, ScriptHash};
use bitcoin::opcodes::all::{OP_2DROP, OP_DROP, OP_PUSHNUM_1};
use bitcoin::script::Builder;
use bitcoin::ScriptBuf;
use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    pub static ref GUARD_REGISTRY: GuardRegistry = GuardRegistry::build();
}

/// Immutable lookup between guard variants and their script hashes
#[derive(Debug)]
pub struct GuardRegistry {
    by_variant: HashMap<GuardVariant, ScriptHash>,
    by_hash: HashMap<ScriptHash, GuardVariant>,
}

impl GuardRegistry {
    fn build() -> Self {
        let mut by_variant = HashMap::new();
        let mut by_hash = HashMap::new();
        for variant in GuardVariant::ALL {
            let hash = ScriptHash::of_script(&Self::locking_script(variant));
            by_variant.insert(variant, hash);
            by_hash.insert(hash, variant);
        }
        Self {
            by_variant,
            by_hash,
        }
    }

    /// Locking script of a guard variant: `<kind> <version> <N> <M> <K>`
    /// dropped, then `OP_1`
    pub fn locking_script(variant: GuardVariant) -> ScriptBuf {
        Builder::new()
            .push_int(CovenantKind::Guard as i64)
            .push_int(super::TEMPLATE_VERSION)
            .push_int(variant.input_capacity() as i64)
            .push_int(variant.output_capacity() as i64)
            .push_int(variant.type_capacity() as i64)
            .push_opcode(OP_2DROP)
            .push_opcode(OP_2DROP)
            .push_opcode(OP_DROP)
            .push_opcode(OP_PUSHNUM_1)
            .into_script()
    }

    /// Script hash of a variant
    pub fn script_hash(&self, variant: GuardVariant) -> ScriptHash {
        // Every variant is inserted in build()
        self.by_variant
            .get(&variant)
            .copied()
            .unwrap_or_else(|| ScriptHash::of_script(&Self::locking_script(variant)))
    }

    /// Variant a script hash belongs to, if it is a guard at all
    pub fn variant_of(&self, hash: &ScriptHash) -> Option<GuardVariant> {
        self.by_hash.get(hash).copied()
    }

    pub fn contains(&self, hash: &ScriptHash) -> bool {
        self.by_hash.contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.by_variant.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_variant.is_empty()
    }
}
