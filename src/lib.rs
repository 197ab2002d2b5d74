//! Covenant Token Verifier
//!
//! Verification rules for fungible tokens whose ownership and amounts are
//! committed beside UTXOs: guard conservation, owner authorization, two-hop
//! backtrace provenance, open-mint supply and admin ownership.

pub mod cli;
pub mod codec;
pub mod config;
pub mod covenant;
pub mod crypto;
pub mod errors;
pub mod ledger;
pub mod report;
pub mod shared;
pub mod types;
pub mod validator;
