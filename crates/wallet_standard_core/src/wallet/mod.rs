//! Wallet capability contract.
//!
//! Traits and value types every registered wallet implements, metadata shape
//! checks, and a reference wallet built on pluggable key and prompt
//! collaborators.

pub mod contract;
pub mod standard;
pub mod types;
pub mod validate;
