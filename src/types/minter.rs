//! Open minter types
//!
//! An open minter hands out a bounded supply in fixed-size mints. Its state
//! only tracks how many mints remain; every derived quantity comes from the
//! immutable `MinterConfig` baked into the minter's locking script.

use super::common::ScriptHash;
use crate::errors::{VerifyError, VerifyResult};
use bitcoin::{OutPoint, ScriptBuf};
use serde::{Deserialize, Serialize};

/// Maximum number of minter outputs a single mint may fork into
pub const MAX_NEXT_MINTERS: usize = 2;

/// Committed state of an open minter UTXO
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpenMinterState {
    pub token_script_hash: ScriptHash,
    pub has_minted_before: bool,
    pub remaining_count: u64,
}

impl OpenMinterState {
    /// State of a child minter produced by a mint
    pub fn next(&self, remaining_count: u64) -> Self {
        Self {
            token_script_hash: self.token_script_hash,
            has_minted_before: true,
            remaining_count,
        }
    }

    pub fn phase(&self) -> MinterPhase {
        if !self.has_minted_before {
            MinterPhase::Unminted
        } else if self.remaining_count > 0 {
            MinterPhase::Minting {
                remaining: self.remaining_count,
            }
        } else {
            MinterPhase::Exhausted
        }
    }
}

/// Lifecycle phase of a minter UTXO
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinterPhase {
    /// Deployed, nothing minted yet (premine pending if configured)
    Unminted,
    /// Regular mints available
    Minting { remaining: u64 },
    /// No mints left; the UTXO cannot be replaced
    Exhausted,
}

/// Immutable open-minter parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinterConfig {
    pub genesis_outpoint: OutPoint,
    pub total_mint_count: u64,
    pub premine_count: u64,
    pub limit: u64,
    /// P2PKH script allowed to take the premine; empty when there is none
    pub preminer_addr: ScriptBuf,
}

impl MinterConfig {
    pub fn new(
        genesis_outpoint: OutPoint,
        total_mint_count: u64,
        premine_count: u64,
        limit: u64,
        preminer_addr: ScriptBuf,
    ) -> VerifyResult<Self> {
        let config = Self {
            genesis_outpoint,
            total_mint_count,
            premine_count,
            limit,
            preminer_addr,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> VerifyResult<()> {
        if self.limit == 0 {
            return Err(VerifyError::parameter("limit must be greater than zero"));
        }
        if self.premine_count > self.total_mint_count {
            return Err(VerifyError::parameter(
                "premineCount must not exceed totalMintCount",
            ));
        }
        self.total_mint_count.checked_mul(self.limit).ok_or_else(|| {
            VerifyError::parameter("totalMintCount * limit overflows the token amount")
        })?;
        if self.premine_count > 0 && !self.preminer_addr.is_p2pkh() {
            return Err(VerifyError::parameter(
                "preminer address must be a P2PKH script",
            ));
        }
        Ok(())
    }

    /// Amount minted by the premine; never stored, always derived
    pub fn premine_amount(&self) -> u64 {
        // validate() guarantees total_mint_count * limit fits
        self.premine_count.saturating_mul(self.limit)
    }

    /// Maximum supply the minter family can ever issue
    pub fn max_supply(&self) -> u64 {
        self.total_mint_count.saturating_mul(self.limit)
    }

    /// State of the minter output created at deployment
    pub fn initial_state(&self, token_script_hash: ScriptHash) -> OpenMinterState {
        OpenMinterState {
            token_script_hash,
            has_minted_before: false,
            remaining_count: self.total_mint_count.saturating_sub(self.premine_count),
        }
    }

    pub fn has_pending_premine(&self, state: &OpenMinterState) -> bool {
        self.premine_count > 0 && !state.has_minted_before
    }
}

/// Split the post-mint remaining count across up to `forks` child minters
///
/// Earlier children get the larger share. Zero counts are kept so callers can
/// see how many children carry supply; the minter skips them on output.
pub fn split_remaining(remaining_after_mint: u64, forks: usize) -> Vec<u64> {
    let forks = forks.clamp(1, MAX_NEXT_MINTERS) as u64;
    let base = remaining_after_mint / forks;
    let extra = remaining_after_mint % forks;
    (0..forks)
        .map(|i| base + u64::from(i < extra))
        .collect()
}
