//! Solidity-facing declarations: constants, interfaces consumed, events produced.

pub mod constants;
pub mod interfaces;
