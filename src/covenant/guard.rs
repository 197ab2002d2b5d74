//! Guard verification
//!
//! The guard aggregates every token input of a transaction and checks, per
//! token type slot, that `Σinputs = Σoutputs + Σburn`. It also binds the
//! witness-declared outputs to the real transaction outputs so no token can
//! leave the transaction undeclared.
//!
//! ## Check order
//!
//! 1. Guard identity: registry script hash for the state's capacity, state commitment
//! 2. Capacity: inputs ≤ N, outputs ≤ M, witness array shapes
//! 3. Slot uniqueness
//! 4. Deployer signature
//! 5. Input accounting against the spent token states
//! 6. Output count and output binding
//! 7. Conservation

use super::registry::GUARD_REGISTRY;
use super::{CovenantVerifier, InputOutcome};
use crate::codec::StateCodec;
use crate::errors::{VerifyError, VerifyResult};
use crate::types::{
    GuardState, GuardVariant, GuardWitness, OwnerAddr, ScriptHash, TokenState, TxContext,
    NO_TOKEN_INDEX,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Message of the conservation rejection
pub const CONSERVATION_MESSAGE: &str =
    "sum input tokens is invalid, should be equal to sum output tokens plus sum burn tokens";

/// Committed guard state plus its unlock witness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardSpend {
    pub state: GuardState,
    pub witness: GuardWitness,
}

/// Per-slot totals of a verified guard spend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeTotals {
    pub slot: usize,
    pub token_script_hash: ScriptHash,
    pub input: u64,
    pub output: u64,
    pub burn: u64,
}

/// Result of a verified guard spend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardSummary {
    pub variant: GuardVariant,
    pub types: Vec<TypeTotals>,
}

/// Stateless guard verifier
pub struct GuardVerifier;

impl CovenantVerifier for GuardVerifier {
    type Spend = GuardSpend;

    fn verify(
        &self,
        ctx: &TxContext,
        input_index: usize,
        spend: &GuardSpend,
    ) -> VerifyResult<InputOutcome> {
        Self::verify_spend(&spend.state, &spend.witness, ctx, input_index).map(InputOutcome::Guard)
    }
}

impl GuardVerifier {
    /// Verify the guard input at `guard_input_index`
    pub fn verify_spend(
        state: &GuardState,
        witness: &GuardWitness,
        ctx: &TxContext,
        guard_input_index: usize,
    ) -> VerifyResult<GuardSummary> {
        let variant = state.validate_shape()?;
        debug!(
            "Verifying {} guard at input {} ({} inputs, {} outputs)",
            variant,
            guard_input_index,
            ctx.input_count(),
            ctx.output_count()
        );

        Self::check_identity(state, variant, ctx, guard_input_index)?;
        Self::check_capacity(variant, witness, ctx)?;
        Self::check_unique_slots(state)?;
        Self::check_deployer(state, witness, ctx)?;

        let input_sums = Self::sum_inputs(state, witness, ctx)?;
        for (slot, (&claimed, &actual)) in witness.token_amounts.iter().zip(&input_sums).enumerate()
        {
            if claimed != actual {
                return Err(VerifyError::state(format!(
                    "token amount of slot {} is {} but spent inputs hold {}",
                    slot, claimed, actual
                )));
            }
        }

        let output_sums = Self::bind_outputs(state, witness, ctx)?;
        let types = Self::check_conservation(state, witness, &output_sums)?;

        debug!("Guard at input {} verified: {} token types", guard_input_index, types.len());
        Ok(GuardSummary { variant, types })
    }

    fn check_identity(
        state: &GuardState,
        variant: GuardVariant,
        ctx: &TxContext,
        guard_input_index: usize,
    ) -> VerifyResult<()> {
        let input = ctx.input(guard_input_index)?;
        if input.script_hash() != GUARD_REGISTRY.script_hash(variant) {
            return Err(VerifyError::state(format!(
                "guard script does not match {} state capacity",
                variant
            )));
        }
        if input.state_hash != state.state_hash() {
            return Err(VerifyError::state("guard state hash is invalid"));
        }
        if state.slot_of_input(guard_input_index).is_some() {
            return Err(VerifyError::state("guard input is marked as a token input"));
        }
        Ok(())
    }

    fn check_capacity(
        variant: GuardVariant,
        witness: &GuardWitness,
        ctx: &TxContext,
    ) -> VerifyResult<()> {
        if ctx.input_count() > variant.input_capacity() {
            return Err(VerifyError::capacity(format!(
                "{} inputs exceed {} capacity",
                ctx.input_count(),
                variant
            )));
        }
        if ctx.output_count() > variant.output_capacity() {
            return Err(VerifyError::capacity(format!(
                "{} outputs exceed {} capacity",
                ctx.output_count(),
                variant
            )));
        }
        if witness.outputs.len() > variant.output_capacity() {
            return Err(VerifyError::capacity(format!(
                "{} declared outputs exceed {} capacity",
                witness.outputs.len(),
                variant
            )));
        }
        if witness.input_token_states.len() > variant.input_capacity() {
            return Err(VerifyError::capacity(format!(
                "{} input token states exceed {} capacity",
                witness.input_token_states.len(),
                variant
            )));
        }
        let k = variant.type_capacity();
        if witness.token_amounts.len() != k || witness.token_burn_amounts.len() != k {
            return Err(VerifyError::parameter(format!(
                "token amount arrays must have exactly {} entries",
                k
            )));
        }
        Ok(())
    }

    fn check_unique_slots(state: &GuardState) -> VerifyResult<()> {
        let mut seen = HashSet::new();
        for (slot, hash) in state.populated_slots() {
            if !seen.insert(hash) {
                return Err(VerifyError::DuplicateTypeSlot(format!(
                    "token script hash {} is registered twice (slot {})",
                    hash, slot
                )));
            }
        }
        Ok(())
    }

    fn check_deployer(
        state: &GuardState,
        witness: &GuardWitness,
        ctx: &TxContext,
    ) -> VerifyResult<()> {
        let deployer = OwnerAddr::P2pkh(state.deployer_addr.clone());
        if !deployer.matches_pubkey(&witness.deployer.pubkey) {
            return Err(VerifyError::authorization(
                "deployer address is not match to the pubkey",
            ));
        }
        if !witness.deployer.verify(&ctx.sighash) {
            return Err(VerifyError::authorization("deployer signature is invalid"));
        }
        Ok(())
    }

    /// Sum the spent token states per slot, checking each against its input
    fn sum_inputs(
        state: &GuardState,
        witness: &GuardWitness,
        ctx: &TxContext,
    ) -> VerifyResult<Vec<u64>> {
        let mut sums = vec![0u64; state.token_script_hashes.len()];

        for (i, &index) in state.token_script_indexes.iter().enumerate() {
            if index == NO_TOKEN_INDEX {
                continue;
            }
            let slot = index as usize;
            let input = ctx.inputs.get(i).ok_or_else(|| {
                VerifyError::state(format!("token input {} is missing from the transaction", i))
            })?;

            let expected_script = state
                .script_hash_at(slot)
                .ok_or_else(|| VerifyError::parameter(format!("slot {} is not populated", slot)))?;
            if input.script_hash() != *expected_script {
                return Err(VerifyError::state(format!(
                    "input {} script does not match token slot {}",
                    i, slot
                )));
            }

            let token_state = witness
                .input_token_states
                .get(i)
                .and_then(|s| s.as_ref())
                .ok_or_else(|| {
                    VerifyError::state(format!("token state of input {} is missing", i))
                })?;
            if token_state.state_hash() != input.state_hash {
                return Err(VerifyError::state(format!(
                    "token state of input {} does not match its commitment",
                    i
                )));
            }

            sums[slot] = sums[slot]
                .checked_add(token_state.amount)
                .ok_or_else(|| VerifyError::conservation("input token amount overflow"))?;
        }

        // Any token-script input not registered in the guard would escape accounting
        for (i, input) in ctx.inputs.iter().enumerate() {
            let hash = input.script_hash();
            let registered = state.slot_of_input(i).is_some();
            if !registered && state.populated_slots().any(|(_, h)| *h == hash) {
                return Err(VerifyError::state(format!(
                    "token input {} is not registered in the guard",
                    i
                )));
            }
        }

        Ok(sums)
    }

    /// Check every declared output against the real one; returns output sums per slot
    fn bind_outputs(
        state: &GuardState,
        witness: &GuardWitness,
        ctx: &TxContext,
    ) -> VerifyResult<Vec<u64>> {
        if witness.outputs.len() != ctx.output_count() {
            return Err(VerifyError::state(format!(
                "output count mismatch: declared {}, transaction has {}",
                witness.outputs.len(),
                ctx.output_count()
            )));
        }

        let type_capacity = state.token_script_hashes.len();
        let mut sums = vec![0u64; type_capacity];

        for (j, (declared, actual)) in witness.outputs.iter().zip(&ctx.outputs).enumerate() {
            if declared.satoshis != actual.satoshis {
                return Err(VerifyError::state(format!(
                    "output {} satoshis mismatch",
                    j
                )));
            }
            if declared.next_state_hash != actual.state_hash {
                return Err(VerifyError::state(format!(
                    "output {} state hash mismatch",
                    j
                )));
            }

            if !declared.is_token() {
                if declared.amount != 0 {
                    return Err(VerifyError::parameter(format!(
                        "non-token output {} declares a token amount",
                        j
                    )));
                }
                let script_hash = actual.script_hash();
                if declared.owner_or_script_hash.as_slice() != script_hash.as_bytes() {
                    return Err(VerifyError::state(format!(
                        "output {} script hash mismatch",
                        j
                    )));
                }
                if state.populated_slots().any(|(_, h)| *h == script_hash) {
                    return Err(VerifyError::state(format!(
                        "output {} carries a token script but is not declared as a token output",
                        j
                    )));
                }
                continue;
            }

            if declared.token_index < NO_TOKEN_INDEX || declared.token_index as usize >= type_capacity
            {
                return Err(VerifyError::parameter(format!(
                    "output {} token index {} is out of range",
                    j, declared.token_index
                )));
            }
            let slot = declared.token_index as usize;
            let token_script = state.script_hash_at(slot).ok_or_else(|| {
                VerifyError::parameter(format!("output {} refers to empty slot {}", j, slot))
            })?;
            if actual.script_hash() != *token_script {
                return Err(VerifyError::state(format!(
                    "output {} script is not the token script of slot {}",
                    j, slot
                )));
            }
            if declared.amount == 0 {
                return Err(VerifyError::parameter(format!(
                    "token output {} amount must be positive",
                    j
                )));
            }
            let owner = OwnerAddr::from_bytes(&declared.owner_or_script_hash).ok_or_else(|| {
                VerifyError::parameter(format!("token output {} owner address is invalid", j))
            })?;
            let expected = TokenState::new(owner, declared.amount).state_hash();
            if declared.next_state_hash != expected {
                return Err(VerifyError::state(format!(
                    "token output {} state does not match declared owner and amount",
                    j
                )));
            }

            sums[slot] = sums[slot]
                .checked_add(declared.amount)
                .ok_or_else(|| VerifyError::conservation("output token amount overflow"))?;
        }

        Ok(sums)
    }

    fn check_conservation(
        state: &GuardState,
        witness: &GuardWitness,
        output_sums: &[u64],
    ) -> VerifyResult<Vec<TypeTotals>> {
        let mut totals = Vec::new();

        for (slot, hash) in state.token_script_hashes.iter().enumerate() {
            let input = witness.token_amounts[slot];
            let burn = witness.token_burn_amounts[slot];
            let output = output_sums[slot];

            let Some(hash) = hash else {
                if input != 0 || burn != 0 {
                    return Err(VerifyError::parameter(format!(
                        "empty slot {} carries token amounts",
                        slot
                    )));
                }
                continue;
            };

            let outgoing = output
                .checked_add(burn)
                .ok_or_else(|| VerifyError::conservation(CONSERVATION_MESSAGE))?;
            if input != outgoing {
                debug!(
                    "Slot {}: input {} != output {} + burn {}",
                    slot, input, output, burn
                );
                return Err(VerifyError::conservation(CONSERVATION_MESSAGE));
            }

            totals.push(TypeTotals {
                slot,
                token_script_hash: *hash,
                input,
                output,
                burn,
            });
        }

        Ok(totals)
    }
}
