//! Admin covenant
//!
//! A long-lived anchor whose owner can co-sign admin token spends (freeze)
//! or hand the anchor to a new owner. The admin UTXO always recreates itself
//! at output 0.

use super::backtrace::BacktraceVerifier;
use super::{check_authorizing_index, covenant_script, CovenantKind, CovenantVerifier, InputOutcome};
use crate::codec::StateCodec;
use crate::errors::{VerifyError, VerifyResult};
use crate::types::{AdminState, BacktraceInfo, OwnerAddr, ScriptHash, SignatureProof, TxContext};
use bitcoin::consensus::serialize;
use bitcoin::{OutPoint, ScriptBuf};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Admin entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum AdminMethod {
    /// Keep state unchanged; the admin input authorizes co-spent admin token spends
    Freeze,
    TransferOwnership { new_owner: OwnerAddr },
}

impl AdminMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Freeze => "freeze",
            Self::TransferOwnership { .. } => "transfer_ownership",
        }
    }
}

/// Proof of control over the admin owner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerAuth {
    /// For a P2PKH owner
    #[serde(default)]
    pub signature: Option<SignatureProof>,
    /// For a contract owner: index of the co-spent owner contract input
    #[serde(default)]
    pub contract_input_index: Option<i64>,
}

/// Unlock witness of an admin spend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSpend {
    pub state: AdminState,
    pub method: AdminMethod,
    pub auth: OwnerAuth,
    pub output_satoshis: u64,
    pub backtrace: BacktraceInfo,
}

/// Admin covenant bound to its genesis outpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AdminParams", into = "AdminParams")]
pub struct AdminContract {
    genesis_outpoint: OutPoint,
    script: ScriptBuf,
    script_hash: ScriptHash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AdminParams {
    genesis_outpoint: OutPoint,
}

impl TryFrom<AdminParams> for AdminContract {
    type Error = VerifyError;

    fn try_from(params: AdminParams) -> Result<Self, Self::Error> {
        AdminContract::new(params.genesis_outpoint)
    }
}

impl From<AdminContract> for AdminParams {
    fn from(contract: AdminContract) -> Self {
        Self {
            genesis_outpoint: contract.genesis_outpoint,
        }
    }
}

impl AdminContract {
    pub fn new(genesis_outpoint: OutPoint) -> VerifyResult<Self> {
        let script = covenant_script(CovenantKind::Admin, &[&serialize(&genesis_outpoint)])?;
        let script_hash = ScriptHash::of_script(&script);
        Ok(Self {
            genesis_outpoint,
            script,
            script_hash,
        })
    }

    pub fn genesis_outpoint(&self) -> &OutPoint {
        &self.genesis_outpoint
    }

    pub fn script(&self) -> &ScriptBuf {
        &self.script
    }

    pub fn script_hash(&self) -> ScriptHash {
        self.script_hash
    }

    /// Verify the admin input at `input_index`
    pub fn verify_spend(
        &self,
        ctx: &TxContext,
        input_index: usize,
        spend: &AdminSpend,
    ) -> VerifyResult<()> {
        let input = ctx.input(input_index)?;
        if input.script_hash() != self.script_hash {
            return Err(VerifyError::state("admin script is invalid"));
        }
        if input.state_hash != spend.state.state_hash() {
            return Err(VerifyError::state("admin state hash is invalid"));
        }

        BacktraceVerifier::verify(
            &spend.backtrace,
            &input.outpoint,
            Some(&self.genesis_outpoint),
            &[self.script_hash],
        )?;

        Self::check_owner(ctx, input_index, spend.state.owner_address(), &spend.auth)?;

        let next_state = match &spend.method {
            AdminMethod::Freeze => spend.state.clone(),
            AdminMethod::TransferOwnership { new_owner } => {
                spend.state.with_owner(new_owner.clone())
            }
        };

        let output = ctx.output(0)?;
        if output.script_hash() != self.script_hash {
            return Err(VerifyError::state("admin output script is invalid"));
        }
        if output.satoshis != spend.output_satoshis {
            return Err(VerifyError::state("admin output satoshis mismatch"));
        }
        if output.state_hash != next_state.state_hash() {
            return Err(VerifyError::state("admin output state hash is invalid"));
        }

        debug!(
            "Admin {} verified at input {}",
            spend.method.name(),
            input_index
        );
        Ok(())
    }

    fn check_owner(
        ctx: &TxContext,
        input_index: usize,
        owner: &OwnerAddr,
        auth: &OwnerAuth,
    ) -> VerifyResult<()> {
        match owner {
            OwnerAddr::P2pkh(_) => {
                let proof = auth.signature.as_ref().ok_or_else(|| {
                    VerifyError::authorization("owner signature is required")
                })?;
                if !owner.matches_pubkey(&proof.pubkey) {
                    return Err(VerifyError::authorization(
                        "owner address is not match to the pubkey",
                    ));
                }
                if !proof.verify(&ctx.sighash) {
                    return Err(VerifyError::authorization("owner signature is invalid"));
                }
            }
            OwnerAddr::Contract(hash) => {
                let index = auth.contract_input_index.ok_or_else(|| {
                    VerifyError::authorization("owner contract input is required")
                })?;
                let index = check_authorizing_index(ctx, input_index, None, index)?;
                if ctx.inputs[index].script_hash() != *hash {
                    return Err(VerifyError::authorization(
                        "spend script does not match the owner contract",
                    ));
                }
            }
        }
        Ok(())
    }
}

impl CovenantVerifier for AdminContract {
    type Spend = AdminSpend;

    fn verify(
        &self,
        ctx: &TxContext,
        input_index: usize,
        spend: &AdminSpend,
    ) -> VerifyResult<InputOutcome> {
        self.verify_spend(ctx, input_index, spend)?;
        Ok(InputOutcome::Admin {
            method: spend.method.name(),
        })
    }
}
