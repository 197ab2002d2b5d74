//! Shared helpers used across the covenant modules.
//!
//! Pure, verifier-agnostic utilities: serde adapters for the hex
//! representations used in transaction bundles.

pub mod hex_serde;
