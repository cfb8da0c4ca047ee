use stylus_sdk::alloy_primitives::{address, Address};

/// `ecrecover` precompile.
pub const ECRECOVER: Address = address!("0000000000000000000000000000000000000001");

/// Gas forwarded to the `ecrecover` precompile (it costs 3000).
pub const ECRECOVER_GAS: u64 = 50_000;
