//! Signature recovery through the EVM `ecrecover` precompile.

use stylus_sdk::{
    alloy_primitives::{Address, FixedBytes},
    call::RawCall,
};

use crate::abi::constants::{ECRECOVER, ECRECOVER_GAS};

/// Recover an EOA address from a 32-byte digest and `(v, r, s)`.
///
/// `v` is passed through unchanged: the precompile accepts 27/28 and returns nothing for any
/// other value, which surfaces here as an error.
pub fn ecrecover_address(
    digest: FixedBytes<32>,
    v: u8,
    r: FixedBytes<32>,
    s: FixedBytes<32>,
) -> Result<Address, ()> {
    let mut input = [0u8; 128];
    input[0..32].copy_from_slice(digest.as_slice());
    // Input: digest, v (right-aligned word), r, s.
    input[63] = v;
    input[64..96].copy_from_slice(r.as_slice());
    input[96..128].copy_from_slice(s.as_slice());

    let out = unsafe { RawCall::new_static().gas(ECRECOVER_GAS).call(ECRECOVER, &input) }
        .map_err(|_| ())?;
    if out.len() < 32 {
        return Err(());
    }
    // Output is a left-padded address word; empty on failure.
    let recovered = Address::from_slice(&out[12..32]);
    if recovered == Address::ZERO {
        return Err(());
    }
    Ok(recovered)
}
