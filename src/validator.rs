//! Whole-transaction validation
//!
//! Runs the covenant of every input against the same transaction context.
//! A transaction is accepted only when every input verifies; the first
//! rejection aborts validation and no partial report is returned.

use crate::covenant::{
    is_covenant_script, AdminContract, AdminSpend, CovenantVerifier, GuardSpend, GuardSummary,
    GuardVerifier, InputOutcome, MintSpend, OpenMinter, TokenContract, TokenSpend, GUARD_REGISTRY,
};
use crate::errors::{VerifyError, VerifyResult};
use crate::types::TxContext;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Covenant and unlock witness for one transaction input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputSpend {
    Token {
        contract: TokenContract,
        spend: TokenSpend,
    },
    Guard {
        spend: GuardSpend,
    },
    Minter {
        minter: OpenMinter,
        spend: MintSpend,
    },
    Admin {
        contract: AdminContract,
        spend: AdminSpend,
    },
    /// Input outside the protocol, authorized by its own script
    Plain,
}

impl InputSpend {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Token { .. } => "token",
            Self::Guard { .. } => "guard",
            Self::Minter { .. } => "minter",
            Self::Admin { .. } => "admin",
            Self::Plain => "plain",
        }
    }
}

/// A transaction context with one spend per input, as read from disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionBundle {
    pub context: TxContext,
    pub spends: Vec<InputSpend>,
}

/// Outcome of an accepted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub input_count: usize,
    pub output_count: usize,
    pub outcomes: Vec<InputOutcome>,
}

impl ValidationReport {
    /// Summary of the guard input, if the transaction moved tokens
    pub fn guard(&self) -> Option<&GuardSummary> {
        self.outcomes.iter().find_map(|outcome| match outcome {
            InputOutcome::Guard(summary) => Some(summary),
            _ => None,
        })
    }

    /// Total token amount spent through token inputs
    pub fn token_input_total(&self) -> u64 {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                InputOutcome::Token { amount, .. } => Some(*amount),
                _ => None,
            })
            .fold(0u64, u64::saturating_add)
    }

    /// Total token amount minted by minter inputs
    pub fn minted_total(&self) -> u64 {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                InputOutcome::Mint { amount, .. } => Some(*amount),
                _ => None,
            })
            .fold(0u64, u64::saturating_add)
    }
}

/// Stateless transaction validator
pub struct TransactionValidator;

impl TransactionValidator {
    pub fn validate_bundle(bundle: &TransactionBundle) -> VerifyResult<ValidationReport> {
        Self::validate(&bundle.context, &bundle.spends)
    }

    /// Validate every input of `ctx` with its matching spend
    pub fn validate(ctx: &TxContext, spends: &[InputSpend]) -> VerifyResult<ValidationReport> {
        info!(
            "Validating transaction: {} inputs, {} outputs",
            ctx.input_count(),
            ctx.output_count()
        );

        let result = Self::check_structure(ctx, spends).and_then(|_| Self::run_covenants(ctx, spends));
        match &result {
            Ok(report) => info!(
                "Transaction accepted: {} token inputs ({} tokens), {} minted",
                report
                    .outcomes
                    .iter()
                    .filter(|o| matches!(o, InputOutcome::Token { .. }))
                    .count(),
                report.token_input_total(),
                report.minted_total()
            ),
            Err(e) => warn!("Transaction rejected: {}", e),
        }
        result
    }

    fn check_structure(ctx: &TxContext, spends: &[InputSpend]) -> VerifyResult<()> {
        if spends.len() != ctx.input_count() {
            return Err(VerifyError::state(format!(
                "{} spends supplied for {} inputs",
                spends.len(),
                ctx.input_count()
            )));
        }

        let guards: Vec<usize> = spends
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s, InputSpend::Guard { .. }))
            .map(|(i, _)| i)
            .collect();
        let has_tokens = spends.iter().any(|s| matches!(s, InputSpend::Token { .. }));

        if has_tokens && guards.len() != 1 {
            return Err(VerifyError::state(format!(
                "token spends require exactly one guard input, found {}",
                guards.len()
            )));
        }
        if guards.len() > 1 {
            return Err(VerifyError::state("more than one guard input"));
        }

        for (i, spend) in spends.iter().enumerate() {
            match spend {
                InputSpend::Token { spend, .. } if Some(&spend.guard_input_index) != guards.first() => {
                    return Err(VerifyError::state(format!(
                        "token input {} references input {} which is not the guard",
                        i, spend.guard_input_index
                    )));
                }
                InputSpend::Plain => {
                    let input = &ctx.inputs[i];
                    if GUARD_REGISTRY.contains(&input.script_hash()) {
                        return Err(VerifyError::state(format!(
                            "guard input {} has no guard spend",
                            i
                        )));
                    }
                    if is_covenant_script(&input.script_pubkey) {
                        return Err(VerifyError::state(format!(
                            "covenant input {} has no covenant spend",
                            i
                        )));
                    }
                    if !input.state_hash.is_none() {
                        return Err(VerifyError::state(format!(
                            "plain input {} carries a state commitment",
                            i
                        )));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn run_covenants(ctx: &TxContext, spends: &[InputSpend]) -> VerifyResult<ValidationReport> {
        let mut outcomes = Vec::with_capacity(spends.len());
        for (i, spend) in spends.iter().enumerate() {
            debug!("Verifying input {} as {}", i, spend.kind());
            let outcome = match spend {
                InputSpend::Token { contract, spend } => contract.verify(ctx, i, spend)?,
                InputSpend::Guard { spend } => GuardVerifier.verify(ctx, i, spend)?,
                InputSpend::Minter { minter, spend } => minter.verify(ctx, i, spend)?,
                InputSpend::Admin { contract, spend } => contract.verify(ctx, i, spend)?,
                InputSpend::Plain => InputOutcome::Plain,
            };
            outcomes.push(outcome);
        }

        Ok(ValidationReport {
            input_count: ctx.input_count(),
            output_count: ctx.output_count(),
            outcomes,
        })
    }
}
