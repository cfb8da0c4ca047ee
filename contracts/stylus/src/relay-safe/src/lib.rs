//! Relayer-reimbursed threshold multisig account for Arbitrum Stylus.
//!
//! The authorization core (hashing, bundle decoding, threshold checks, reimbursement) lives
//! in `relay-safe-types`; this crate owns storage, the Solidity ABI and the host bindings.

#![cfg_attr(not(any(test, feature = "export-abi")), no_main)]
#![cfg_attr(not(any(test, feature = "export-abi")), no_std)]

extern crate alloc;

pub mod abi;
pub mod errors;
mod host;
pub mod safe;
pub mod utils;

pub use safe::RelaySafe;
