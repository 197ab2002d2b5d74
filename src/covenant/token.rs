//! Token ownership authorization
//!
//! A token input never checks amounts; conservation is the guard's job. The
//! token only proves that the spender is entitled to move it and that a
//! legitimate guard is present in the same transaction to account for it.

use super::backtrace::BacktraceVerifier;
use super::registry::GUARD_REGISTRY;
use super::{check_authorizing_index, covenant_script, CovenantKind, CovenantVerifier, InputOutcome};
use crate::codec::StateCodec;
use crate::errors::{VerifyError, VerifyResult};
use crate::types::{
    BacktraceInfo, GuardState, OwnerAddr, ScriptHash, SignatureProof, TokenState, TxContext,
};
use bitcoin::ScriptBuf;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Path by which a token input is authorized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendType {
    User = 0,
    Contract = 1,
    Admin = 2,
}

impl TryFrom<u8> for SpendType {
    type Error = VerifyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::User),
            1 => Ok(Self::Contract),
            2 => Ok(Self::Admin),
            _ => Err(VerifyError::parameter("invalid spendType")),
        }
    }
}

/// Raw unlock arguments as they appear in the witness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUnlockArgs {
    pub spend_type: u8,
    #[serde(default)]
    pub user: Option<SignatureProof>,
    #[serde(default)]
    pub spend_script_input_index: i64,
}

impl TokenUnlockArgs {
    pub fn user(proof: SignatureProof) -> Self {
        Self {
            spend_type: SpendType::User as u8,
            user: Some(proof),
            spend_script_input_index: -1,
        }
    }

    pub fn contract(input_index: i64) -> Self {
        Self {
            spend_type: SpendType::Contract as u8,
            user: None,
            spend_script_input_index: input_index,
        }
    }

    pub fn admin(input_index: i64) -> Self {
        Self {
            spend_type: SpendType::Admin as u8,
            user: None,
            spend_script_input_index: input_index,
        }
    }

    /// Interpret the raw arguments
    pub fn request(&self) -> VerifyResult<SpendRequest> {
        match SpendType::try_from(self.spend_type)? {
            SpendType::User => {
                let proof = self.user.clone().ok_or_else(|| {
                    VerifyError::authorization("user spend requires a signature")
                })?;
                Ok(SpendRequest::User(proof))
            }
            SpendType::Contract => Ok(SpendRequest::Contract(self.spend_script_input_index)),
            SpendType::Admin => Ok(SpendRequest::Admin(self.spend_script_input_index)),
        }
    }
}

/// Decoded unlock request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpendRequest {
    User(SignatureProof),
    Contract(i64),
    Admin(i64),
}

impl SpendRequest {
    pub fn spend_type(&self) -> SpendType {
        match self {
            Self::User(_) => SpendType::User,
            Self::Contract(_) => SpendType::Contract,
            Self::Admin(_) => SpendType::Admin,
        }
    }
}

/// Everything a token input's unlock witness carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpend {
    pub state: TokenState,
    pub args: TokenUnlockArgs,
    pub guard_input_index: usize,
    pub guard_state: GuardState,
    pub backtrace: BacktraceInfo,
}

/// Token covenant bound to its minter and optional admin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TokenContractParams", into = "TokenContractParams")]
pub struct TokenContract {
    minter_script_hash: ScriptHash,
    admin_script_hash: Option<ScriptHash>,
    script: ScriptBuf,
    script_hash: ScriptHash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenContractParams {
    minter_script_hash: ScriptHash,
    has_admin: bool,
    #[serde(with = "crate::shared::hex_serde", default)]
    admin_script_hash: Vec<u8>,
}

impl TryFrom<TokenContractParams> for TokenContract {
    type Error = VerifyError;

    fn try_from(params: TokenContractParams) -> Result<Self, Self::Error> {
        TokenContract::new(
            params.minter_script_hash,
            params.has_admin,
            &params.admin_script_hash,
        )
    }
}

impl From<TokenContract> for TokenContractParams {
    fn from(contract: TokenContract) -> Self {
        Self {
            minter_script_hash: contract.minter_script_hash,
            has_admin: contract.admin_script_hash.is_some(),
            admin_script_hash: contract
                .admin_script_hash
                .map(|h| h.0.to_vec())
                .unwrap_or_default(),
        }
    }
}

impl TokenContract {
    /// Bind a token to its minter and, optionally, an admin covenant
    ///
    /// `admin_script_hash` must be 32 bytes when `has_admin` is set and
    /// empty otherwise.
    pub fn new(
        minter_script_hash: ScriptHash,
        has_admin: bool,
        admin_script_hash: &[u8],
    ) -> VerifyResult<Self> {
        let admin_script_hash = match (has_admin, admin_script_hash.len()) {
            (true, 32) => ScriptHash::from_slice(admin_script_hash),
            (false, 0) => None,
            (true, len) => {
                return Err(VerifyError::parameter(format!(
                    "admin script hash must be 32 bytes, got {}",
                    len
                )))
            }
            (false, _) => {
                return Err(VerifyError::parameter(
                    "admin script hash must be empty when the token has no admin",
                ))
            }
        };

        let has_admin_flag = [u8::from(has_admin)];
        let admin_param: &[u8] = match &admin_script_hash {
            Some(hash) => hash.as_bytes(),
            None => &[],
        };
        let script = covenant_script(
            CovenantKind::Token,
            &[minter_script_hash.as_bytes(), &has_admin_flag, admin_param],
        )?;
        let script_hash = ScriptHash::of_script(&script);

        Ok(Self {
            minter_script_hash,
            admin_script_hash,
            script,
            script_hash,
        })
    }

    pub fn script(&self) -> &ScriptBuf {
        &self.script
    }

    pub fn script_hash(&self) -> ScriptHash {
        self.script_hash
    }

    pub fn minter_script_hash(&self) -> ScriptHash {
        self.minter_script_hash
    }

    pub fn admin_script_hash(&self) -> Option<ScriptHash> {
        self.admin_script_hash
    }

    /// Verify the token input at `input_index`
    pub fn verify_spend(
        &self,
        ctx: &TxContext,
        input_index: usize,
        spend: &TokenSpend,
    ) -> VerifyResult<SpendRequest> {
        let input = ctx.input(input_index)?;
        if input.script_hash() != self.script_hash {
            return Err(VerifyError::state("token script is invalid"));
        }
        if input.state_hash != spend.state.state_hash() {
            return Err(VerifyError::state("token state hash is invalid"));
        }

        self.check_guard(ctx, input_index, spend)?;

        BacktraceVerifier::verify(
            &spend.backtrace,
            &input.outpoint,
            None,
            &[self.script_hash, self.minter_script_hash],
        )?;

        let request = spend.args.request()?;
        match &request {
            SpendRequest::User(proof) => {
                if !spend.state.owner.matches_pubkey(&proof.pubkey) {
                    return Err(VerifyError::authorization(
                        "owner address is not match to the pubkey",
                    ));
                }
                if !proof.verify(&ctx.sighash) {
                    return Err(VerifyError::authorization("user signature is invalid"));
                }
            }
            SpendRequest::Contract(index) => {
                let index =
                    check_authorizing_index(ctx, input_index, Some(spend.guard_input_index), *index)?;
                let owner = spend.state.owner.contract_hash().ok_or_else(|| {
                    VerifyError::authorization("token owner is not a contract")
                })?;
                if ctx.inputs[index].script_hash() != *owner {
                    return Err(VerifyError::authorization(
                        "spend script does not match the owner contract",
                    ));
                }
            }
            SpendRequest::Admin(index) => {
                let admin = self.admin_script_hash.ok_or_else(|| {
                    VerifyError::authorization("token has no admin")
                })?;
                let index =
                    check_authorizing_index(ctx, input_index, Some(spend.guard_input_index), *index)?;
                if ctx.inputs[index].script_hash() != admin {
                    return Err(VerifyError::authorization(
                        "spend script does not match the admin contract",
                    ));
                }
            }
        }

        debug!(
            "Token input {} authorized via {:?} spend",
            input_index,
            request.spend_type()
        );
        Ok(request)
    }

    fn check_guard(&self, ctx: &TxContext, input_index: usize, spend: &TokenSpend) -> VerifyResult<()> {
        if spend.guard_input_index == input_index {
            return Err(VerifyError::parameter("guard input cannot be the token itself"));
        }
        let guard = ctx.input(spend.guard_input_index)?;
        if !GUARD_REGISTRY.contains(&guard.script_hash()) {
            return Err(VerifyError::authorization("guard script hash is invalid"));
        }
        if guard.state_hash != spend.guard_state.state_hash() {
            return Err(VerifyError::state("guard state hash is invalid"));
        }
        let registered = spend
            .guard_state
            .slot_of_input(input_index)
            .and_then(|slot| spend.guard_state.script_hash_at(slot));
        if registered != Some(&self.script_hash) {
            return Err(VerifyError::authorization("token is not registered in guard"));
        }
        Ok(())
    }
}

impl CovenantVerifier for TokenContract {
    type Spend = TokenSpend;

    fn verify(
        &self,
        ctx: &TxContext,
        input_index: usize,
        spend: &TokenSpend,
    ) -> VerifyResult<InputOutcome> {
        let request = self.verify_spend(ctx, input_index, spend)?;
        Ok(InputOutcome::Token {
            owner: spend.state.owner.clone(),
            amount: spend.state.amount,
            spend_type: request.spend_type(),
        })
    }
}

/// Owner address helper for contract-owned tokens
impl From<&TokenContract> for OwnerAddr {
    fn from(contract: &TokenContract) -> Self {
        OwnerAddr::Contract(contract.script_hash)
    }
}
