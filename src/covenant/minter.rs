//! Open minter state machine
//!
//! A minter UTXO is replaced on every mint by up to two child minters that
//! split the remaining mint count, plus exactly one token output. The first
//! spend of a minter with a configured premine pays the whole premine to the
//! preminer instead of a regular `limit`-sized mint.

use super::backtrace::BacktraceVerifier;
use super::{covenant_script, CovenantKind, CovenantVerifier, InputOutcome};
use crate::codec::StateCodec;
use crate::errors::{VerifyError, VerifyResult};
use crate::types::{
    BacktraceInfo, MinterConfig, OpenMinterState, OwnerAddr, ScriptHash, SignatureProof,
    TokenState, TxContext, MAX_NEXT_MINTERS,
};
use bitcoin::consensus::serialize;
use bitcoin::ScriptBuf;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Unlock witness of a minter spend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintSpend {
    pub state: OpenMinterState,
    /// Token state of the minted output
    pub token_mint: TokenState,
    /// Remaining counts of the child minters, in output order
    pub next_remaining_counts: Vec<u64>,
    #[serde(default)]
    pub preminer: Option<SignatureProof>,
    pub minter_satoshis: u64,
    pub token_satoshis: u64,
    pub backtrace: BacktraceInfo,
}

/// Open minter covenant for one token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MinterConfig", into = "MinterConfig")]
pub struct OpenMinter {
    config: MinterConfig,
    script: ScriptBuf,
    script_hash: ScriptHash,
}

impl TryFrom<MinterConfig> for OpenMinter {
    type Error = VerifyError;

    fn try_from(config: MinterConfig) -> Result<Self, Self::Error> {
        OpenMinter::new(config)
    }
}

impl From<OpenMinter> for MinterConfig {
    fn from(minter: OpenMinter) -> Self {
        minter.config
    }
}

impl OpenMinter {
    pub fn new(config: MinterConfig) -> VerifyResult<Self> {
        config.validate()?;
        let script = covenant_script(
            CovenantKind::OpenMinter,
            &[
                &serialize(&config.genesis_outpoint),
                &config.total_mint_count.to_be_bytes(),
                &config.premine_count.to_be_bytes(),
                &config.limit.to_be_bytes(),
                config.preminer_addr.as_bytes(),
            ],
        )?;
        let script_hash = ScriptHash::of_script(&script);
        Ok(Self {
            config,
            script,
            script_hash,
        })
    }

    pub fn config(&self) -> &MinterConfig {
        &self.config
    }

    pub fn script(&self) -> &ScriptBuf {
        &self.script
    }

    pub fn script_hash(&self) -> ScriptHash {
        self.script_hash
    }

    /// Verify the minter input at `input_index`
    pub fn verify_mint(
        &self,
        ctx: &TxContext,
        input_index: usize,
        spend: &MintSpend,
    ) -> VerifyResult<bool> {
        let state = &spend.state;
        let input = ctx.input(input_index)?;
        if input.script_hash() != self.script_hash {
            return Err(VerifyError::state("minter script is invalid"));
        }
        if input.state_hash != state.state_hash() {
            return Err(VerifyError::state("minter state hash is invalid"));
        }

        BacktraceVerifier::verify(
            &spend.backtrace,
            &input.outpoint,
            Some(&self.config.genesis_outpoint),
            &[self.script_hash],
        )?;

        if spend.next_remaining_counts.len() > MAX_NEXT_MINTERS {
            return Err(VerifyError::capacity(format!(
                "{} next minters exceed the limit of {}",
                spend.next_remaining_counts.len(),
                MAX_NEXT_MINTERS
            )));
        }
        let sum_next = spend
            .next_remaining_counts
            .iter()
            .try_fold(0u64, |acc, &count| acc.checked_add(count))
            .ok_or_else(|| VerifyError::parameter("sumNextRemainingCount overflows"))?;

        let premine = self.config.has_pending_premine(state);
        if premine {
            self.check_premine(ctx, spend, sum_next)?;
        } else {
            self.check_regular_mint(spend, sum_next)?;
        }

        self.check_outputs(ctx, spend)?;

        debug!(
            "Mint of {} verified at input {} (premine: {}, next counts: {:?})",
            spend.token_mint.amount, input_index, premine, spend.next_remaining_counts
        );
        Ok(premine)
    }

    fn check_premine(&self, ctx: &TxContext, spend: &MintSpend, sum_next: u64) -> VerifyResult<()> {
        let proof = spend
            .preminer
            .as_ref()
            .ok_or_else(|| VerifyError::authorization("premine requires a preminer signature"))?;
        let preminer = OwnerAddr::P2pkh(self.config.preminer_addr.clone());
        if !preminer.matches_pubkey(&proof.pubkey) {
            return Err(VerifyError::authorization(
                "preminer address is not match to the pubkey",
            ));
        }
        if !proof.verify(&ctx.sighash) {
            return Err(VerifyError::authorization("preminer signature is invalid"));
        }
        if spend.token_mint.amount != self.config.premine_amount() {
            return Err(VerifyError::parameter("token amount is not equal to premine"));
        }
        if sum_next != spend.state.remaining_count {
            return Err(VerifyError::parameter(
                "sumNextRemainingCount is not equal to remainingCount",
            ));
        }
        Ok(())
    }

    fn check_regular_mint(&self, spend: &MintSpend, sum_next: u64) -> VerifyResult<()> {
        let remaining = spend.state.remaining_count;
        if remaining == 0 {
            return Err(VerifyError::parameter("minter has no remaining mints"));
        }
        if spend.token_mint.amount != self.config.limit {
            return Err(VerifyError::parameter("token amount is not equal to limit"));
        }
        if sum_next != remaining - 1 {
            return Err(VerifyError::parameter(
                "sumNextRemainingCount is not equal to remainingCount - 1",
            ));
        }
        Ok(())
    }

    /// Minter children, then the token output, then an optional change output
    fn check_outputs(&self, ctx: &TxContext, spend: &MintSpend) -> VerifyResult<()> {
        let invalid = || VerifyError::parameter("outputs are invalid");
        let mut outputs = ctx.outputs.iter();

        for &count in spend.next_remaining_counts.iter().filter(|&&c| c > 0) {
            let output = outputs.next().ok_or_else(invalid)?;
            if output.script_hash() != self.script_hash
                || output.satoshis != spend.minter_satoshis
                || output.state_hash != spend.state.next(count).state_hash()
            {
                return Err(invalid());
            }
        }

        let token = outputs.next().ok_or_else(invalid)?;
        if token.script_hash() != spend.state.token_script_hash
            || token.satoshis != spend.token_satoshis
            || token.state_hash != spend.token_mint.state_hash()
        {
            return Err(invalid());
        }

        if let Some(change) = outputs.next() {
            let hash = change.script_hash();
            if !change.state_hash.is_none()
                || hash == self.script_hash
                || hash == spend.state.token_script_hash
            {
                return Err(invalid());
            }
        }

        if outputs.next().is_some() {
            return Err(invalid());
        }
        Ok(())
    }
}

impl CovenantVerifier for OpenMinter {
    type Spend = MintSpend;

    fn verify(
        &self,
        ctx: &TxContext,
        input_index: usize,
        spend: &MintSpend,
    ) -> VerifyResult<InputOutcome> {
        let premine = self.verify_mint(ctx, input_index, spend)?;
        Ok(InputOutcome::Mint {
            amount: spend.token_mint.amount,
            premine,
            next_remaining_counts: spend.next_remaining_counts.clone(),
        })
    }
}
