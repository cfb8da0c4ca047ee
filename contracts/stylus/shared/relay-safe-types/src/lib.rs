//! Shared action model, hashing and authorization core for the relay-safe account.
//!
//! Everything in this crate is host-agnostic. The Stylus contract binds the traits in
//! [`host`] to EVM hostios (storage, `RawCall`, the `ecrecover` precompile); the off-chain
//! tooling binds them to k256 and an in-memory ledger. Both sides run the same code, so a
//! fingerprint computed off-chain is the fingerprint the contract checks.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod action;
pub mod errors;
pub mod executor;
pub mod hashing;
pub mod host;
pub mod registry;
pub mod signatures;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testing;

pub use action::{Action, CallType, RefundAsset};
pub use errors::{AuthError, EstimateError, ExecutionError, RegistryError, SignatureError};
pub use executor::{estimate_gas, exec_and_reimburse, ExecutionReceipt};
pub use host::{AuthContext, ExecutionHost, MessageStore};
pub use signatures::{decode_signatures, encode_signatures, SignatureEntry, SIGNATURE_LEN};
pub use verifier::{check_signatures, verify};
