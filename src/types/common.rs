//! Common types shared across all covenants
//!
//! This module contains the fundamental value types used throughout the
//! verifiers: 32-byte script and state hashes, owner addresses, and the
//! signature proofs supplied in unlock witnesses.

use crate::crypto;
use bitcoin::secp256k1::ecdsa::Signature;
use bitcoin::{Address, Network, PublicKey, Script, ScriptBuf};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Length of a contract script hash
pub const SCRIPT_HASH_LEN: usize = 32;

/// Length of a P2PKH locking script
pub const P2PKH_SCRIPT_LEN: usize = 25;

macro_rules! hash_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            pub fn from_slice(bytes: &[u8]) -> Option<Self> {
                bytes.try_into().ok().map(Self)
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                crate::shared::hex_serde::decode_array32(&s)
                    .map(Self)
                    .map_err(serde::de::Error::custom)
            }
        }
    };
}

hash_newtype!(
    /// SHA256 of a locking script - the identity of a covenant
    ScriptHash
);

hash_newtype!(
    /// SHA256 of a serialized state - the commitment stored beside an output
    StateHash
);

impl ScriptHash {
    pub fn of_script(script: &Script) -> Self {
        Self(crypto::sha256(script.as_bytes()))
    }
}

impl StateHash {
    /// Marker for outputs that carry no committed state
    pub const NONE: StateHash = StateHash([0u8; 32]);

    pub fn of_bytes(data: &[u8]) -> Self {
        Self(crypto::sha256(data))
    }

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

/// Owner of a token or admin UTXO
///
/// Either a 25-byte P2PKH locking script (a user) or the 32-byte script hash
/// of a contract that must be co-spent to authorize the UTXO.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OwnerAddr {
    P2pkh(ScriptBuf),
    Contract(ScriptHash),
}

impl OwnerAddr {
    /// Parse raw owner bytes, accepting only a P2PKH script or a 32-byte hash
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes.len() {
            P2PKH_SCRIPT_LEN => {
                let script = ScriptBuf::from_bytes(bytes.to_vec());
                script.is_p2pkh().then_some(Self::P2pkh(script))
            }
            SCRIPT_HASH_LEN => ScriptHash::from_slice(bytes).map(Self::Contract),
            _ => None,
        }
    }

    pub fn from_pubkey(pubkey: &PublicKey) -> Self {
        Self::P2pkh(crypto::p2pkh_script(pubkey))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::P2pkh(script) => script.to_bytes(),
            Self::Contract(hash) => hash.0.to_vec(),
        }
    }

    /// True when the P2PKH script derived from `pubkey` equals this owner
    pub fn matches_pubkey(&self, pubkey: &PublicKey) -> bool {
        match self {
            Self::P2pkh(script) => *script == crypto::p2pkh_script(pubkey),
            Self::Contract(_) => false,
        }
    }

    pub fn contract_hash(&self) -> Option<&ScriptHash> {
        match self {
            Self::Contract(hash) => Some(hash),
            Self::P2pkh(_) => None,
        }
    }

    /// Human-readable form: a base58 address for users, hex for contracts
    pub fn display(&self, network: Network) -> String {
        match self {
            Self::P2pkh(script) => Address::from_script(script, network)
                .map(|addr| addr.to_string())
                .unwrap_or_else(|_| hex::encode(script.as_bytes())),
            Self::Contract(hash) => format!("contract:{}", hash),
        }
    }
}

impl Serialize for OwnerAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.to_bytes()))
    }
}

impl<'de> Deserialize<'de> for OwnerAddr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s.trim()).map_err(serde::de::Error::custom)?;
        Self::from_bytes(&bytes).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "owner must be a 25-byte P2PKH script or a 32-byte script hash, got {} bytes",
                bytes.len()
            ))
        })
    }
}

/// Public key and ECDSA signature over the transaction digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureProof {
    pub pubkey: PublicKey,
    pub signature: Signature,
}

impl SignatureProof {
    pub fn verify(&self, sighash: &[u8; 32]) -> bool {
        crypto::verify_signature(sighash, &self.signature, &self.pubkey)
    }
}
