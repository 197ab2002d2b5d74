//! Covenant verifiers
//!
//! Each covenant is identified by the SHA256 of its locking script. The
//! scripts built here are deterministic templates over the covenant's
//! constructor parameters; the spending rules themselves are enforced by the
//! verifiers in the submodules:
//!
//! - `guard`: multi-type conservation and output binding
//! - `token`: ownership authorization for token spends
//! - `minter`: open-mint supply allocation
//! - `admin`: freeze / transfer-ownership anchor
//! - `backtrace`: two-hop provenance check shared by all of the above
//! - `registry`: static guard variant identities

pub mod admin;
pub mod backtrace;
pub mod guard;
pub mod minter;
pub mod registry;
pub mod token;

pub use admin::{AdminContract, AdminMethod, AdminSpend, OwnerAuth};
pub use backtrace::{Ancestry, BacktraceVerifier};
pub use guard::{GuardSpend, GuardSummary, GuardVerifier, TypeTotals};
pub use minter::{MintSpend, OpenMinter};
pub use registry::{GuardRegistry, GUARD_REGISTRY};
pub use token::{SpendRequest, SpendType, TokenContract, TokenSpend, TokenUnlockArgs};

use crate::errors::{VerifyError, VerifyResult};
use crate::types::{OwnerAddr, TxContext};
use bitcoin::opcodes::all::{OP_DROP, OP_PUSHNUM_1};
use bitcoin::script::{Builder, PushBytes};
use bitcoin::{Script, ScriptBuf};
use serde::Serialize;

/// Template tag of each covenant family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum CovenantKind {
    Guard = 1,
    Token = 2,
    OpenMinter = 3,
    Admin = 4,
}

impl CovenantKind {
    pub const ALL: [CovenantKind; 4] = [
        CovenantKind::Guard,
        CovenantKind::Token,
        CovenantKind::OpenMinter,
        CovenantKind::Admin,
    ];
}

/// Template version; bumping it changes every covenant identity
const TEMPLATE_VERSION: i64 = 1;

/// Opcode byte of a small-integer push (1..=16)
fn pushnum_byte(n: i64) -> u8 {
    OP_PUSHNUM_1.to_u8() + (n as u8) - 1
}

/// Covenant family of a locking script built from the covenant template
///
/// Matches the `<kind> <version>` prefix and the `OP_DROP OP_1` tail shared
/// by every covenant script, token, minter, admin and guard alike.
pub fn covenant_kind_of(script: &Script) -> Option<CovenantKind> {
    let bytes = script.as_bytes();
    let [kind, version, ..] = bytes else {
        return None;
    };
    if *version != pushnum_byte(TEMPLATE_VERSION)
        || !bytes.ends_with(&[OP_DROP.to_u8(), OP_PUSHNUM_1.to_u8()])
    {
        return None;
    }
    CovenantKind::ALL
        .into_iter()
        .find(|k| pushnum_byte(*k as i64) == *kind)
}

/// True when `script` is locked by one of the covenant templates
pub fn is_covenant_script(script: &Script) -> bool {
    covenant_kind_of(script).is_some()
}

/// Build the locking script template for a covenant
///
/// Layout: `<kind> <version> <param>... OP_DROP × (2 + params) OP_1`.
pub(crate) fn covenant_script(kind: CovenantKind, params: &[&[u8]]) -> VerifyResult<ScriptBuf> {
    let mut builder = Builder::new()
        .push_int(kind as i64)
        .push_int(TEMPLATE_VERSION);
    for param in params {
        let push: &PushBytes = (*param).try_into().map_err(|_| {
            VerifyError::parameter(format!("covenant parameter of {} bytes is too large", param.len()))
        })?;
        builder = builder.push_slice(push);
    }
    for _ in 0..params.len() + 2 {
        builder = builder.push_opcode(OP_DROP);
    }
    Ok(builder.push_opcode(OP_PUSHNUM_1).into_script())
}

/// What a successfully verified input contributed to the transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputOutcome {
    Token {
        owner: OwnerAddr,
        amount: u64,
        spend_type: SpendType,
    },
    Guard(GuardSummary),
    Mint {
        amount: u64,
        premine: bool,
        next_remaining_counts: Vec<u64>,
    },
    Admin {
        method: &'static str,
    },
    Plain,
}

/// A covenant that can verify one of its inputs inside a transaction
pub trait CovenantVerifier {
    /// Unlock witness supplied by the spender
    type Spend;

    fn verify(
        &self,
        ctx: &TxContext,
        input_index: usize,
        spend: &Self::Spend,
    ) -> VerifyResult<InputOutcome>;
}

/// Check the index of a co-spent authorizing input
///
/// The index must be in range and must not point at the verifying input
/// itself or at `excluded` (the guard, for token spends).
pub(crate) fn check_authorizing_index(
    ctx: &TxContext,
    self_index: usize,
    excluded: Option<usize>,
    index: i64,
) -> VerifyResult<usize> {
    if index < 0 || index as u64 >= ctx.input_count() as u64 {
        return Err(VerifyError::parameter(format!(
            "spendScriptInputIndex {} is out of range",
            index
        )));
    }
    let index = index as usize;
    if index == self_index {
        return Err(VerifyError::authorization("cannot reference self"));
    }
    if Some(index) == excluded {
        return Err(VerifyError::authorization("cannot reference guard"));
    }
    Ok(index)
}
