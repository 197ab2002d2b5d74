//! Token state types
//!
//! A token UTXO commits to its owner and amount. The token's *type* is not
//! part of the state: it is the script hash of the token covenant the output
//! sits on.

use super::common::OwnerAddr;
use bitcoin::OutPoint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Committed state of a token UTXO
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenState {
    pub owner: OwnerAddr,
    pub amount: u64,
}

impl TokenState {
    pub fn new(owner: OwnerAddr, amount: u64) -> Self {
        Self { owner, amount }
    }
}

/// Token identifier: the genesis outpoint consumed when the minter was deployed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub OutPoint);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.0.txid, self.0.vout)
    }
}
