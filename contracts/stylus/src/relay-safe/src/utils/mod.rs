//! Host call helpers used by the account.
//!
//! These wrap raw EVM calls and keep return-data handling in one place.

pub mod calls;
pub mod crypto;
