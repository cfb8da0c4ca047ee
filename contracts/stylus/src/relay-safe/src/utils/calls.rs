//! Outbound calls: action dispatch, reimbursement transfers, delegate validation.

use alloy_sol_types::SolCall;
use stylus_sdk::{
    alloy_primitives::{Address, Bytes, U256},
    call::RawCall,
};

use relay_safe_types::CallType;

use crate::abi::interfaces::{IERC20, ISignatureValidator};

// Every call that can re-enter the account clears the storage cache first: pending writes
// (the nonce) are committed before the callee runs, and nothing cached survives past it.

/// Perform the action with a gas cap. A revert is reported as `false`.
pub fn dispatch(target: Address, value: U256, payload: &[u8], call_type: CallType, gas: u64) -> bool {
    let call = match call_type {
        CallType::Call => RawCall::new_with_value(value),
        CallType::DelegateCall => RawCall::new_delegate(),
    };
    unsafe { call.gas(gas).clear_storage_cache().call(target, payload) }.is_ok()
}

pub fn send_native(to: Address, amount: U256) -> bool {
    unsafe { RawCall::new_with_value(amount).clear_storage_cache().call(to, &[]) }.is_ok()
}

/// ERC-20 `transfer` that tolerates tokens returning nothing.
///
/// Success: the call did not revert and returned either no data or a non-zero word.
pub fn transfer_token(token: Address, to: Address, amount: U256) -> bool {
    let calldata = IERC20::transferCall { to, value: amount }.abi_encode();
    match unsafe { RawCall::new().clear_storage_cache().call(token, &calldata) } {
        Ok(out) => out.is_empty() || is_true_word(&out),
        Err(_) => false,
    }
}

/// `ISignatureValidator(validator).isValidSignature(data, signature)` as a static call.
/// The validator cannot write, so flushing is enough for it to read current state.
pub fn validator_accepts(validator: Address, data: &[u8], signature: &[u8]) -> bool {
    let calldata = ISignatureValidator::isValidSignatureCall {
        data: Bytes::copy_from_slice(data),
        signature: Bytes::copy_from_slice(signature),
    }
    .abi_encode();
    match unsafe { RawCall::new_static().flush_storage_cache().call(validator, &calldata) } {
        Ok(out) => is_true_word(&out),
        Err(_) => false,
    }
}

fn is_true_word(out: &[u8]) -> bool {
    out.len() == 32 && U256::from_be_slice(out) != U256::ZERO
}
