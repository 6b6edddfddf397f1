//! Discovery registry and its well-known global binding.
//!
//! Wallet providers register into the registry; applications enumerate it and
//! subscribe to later registrations. The registry is never on the signing path.

pub mod global;
pub mod wallets;
