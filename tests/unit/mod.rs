//! Unit Tests Module
//!
//! Component-level tests that exercise a single covenant or codec against
//! hand-built transaction contexts, without a ledger.
