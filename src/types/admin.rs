//! Admin covenant state

use super::common::OwnerAddr;
use crate::errors::{VerifyError, VerifyResult};
use serde::{Deserialize, Serialize};

/// Longest tag an admin state may carry
pub const MAX_ADMIN_TAG_LEN: usize = 32;

/// Committed state of an admin UTXO
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AdminStateFields")]
pub struct AdminState {
    #[serde(with = "crate::shared::hex_serde")]
    tag: Vec<u8>,
    owner_address: OwnerAddr,
}

#[derive(Deserialize)]
struct AdminStateFields {
    #[serde(with = "crate::shared::hex_serde")]
    tag: Vec<u8>,
    owner_address: OwnerAddr,
}

impl TryFrom<AdminStateFields> for AdminState {
    type Error = VerifyError;

    fn try_from(fields: AdminStateFields) -> Result<Self, Self::Error> {
        AdminState::new(fields.tag, fields.owner_address)
    }
}

impl AdminState {
    pub fn new(tag: Vec<u8>, owner_address: OwnerAddr) -> VerifyResult<Self> {
        if tag.len() > MAX_ADMIN_TAG_LEN {
            return Err(VerifyError::parameter(format!(
                "admin tag is {} bytes, at most {} allowed",
                tag.len(),
                MAX_ADMIN_TAG_LEN
            )));
        }
        Ok(Self { tag, owner_address })
    }

    pub fn tag(&self) -> &[u8] {
        &self.tag
    }

    pub fn owner_address(&self) -> &OwnerAddr {
        &self.owner_address
    }

    /// Same tag, new owner
    pub fn with_owner(&self, owner_address: OwnerAddr) -> Self {
        Self {
            tag: self.tag.clone(),
            owner_address,
        }
    }
}
