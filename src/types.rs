//! Covenant Token Verifier - Type System
//!
//! - `common`: Shared value types (ScriptHash, StateHash, OwnerAddr, SignatureProof)
//! - `context`: The spending transaction as seen by the covenants
//! - `token`: Token state and token identifiers
//! - `guard`: Guard variants, guard state and guard unlock witness
//! - `minter`: Open minter state and configuration
//! - `admin`: Admin state
//! - `backtrace`: Ancestor preimages for provenance checks

mod common;
mod context;

pub mod admin;
pub mod backtrace;
pub mod guard;
pub mod minter;
pub mod token;

pub use common::*;
pub use context::*;

pub use admin::AdminState;
pub use backtrace::BacktraceInfo;
pub use guard::{GuardOutput, GuardState, GuardVariant, GuardWitness, NO_TOKEN_INDEX};
pub use minter::{MinterConfig, MinterPhase, OpenMinterState, MAX_NEXT_MINTERS};
pub use token::{TokenId, TokenState};
