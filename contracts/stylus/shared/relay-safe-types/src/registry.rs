//! Pre-approved messages and the `isValidSignature` capability.

use alloy_primitives::{Address, B256};

use crate::{
    errors::RegistryError,
    hashing::message_hash,
    host::{AuthContext, MessageStore},
    verifier::verify,
};

/// Mark `message` as approved. Only the account itself may call this, so reaching it
/// already required a threshold-authorized action.
pub fn sign_message<H: AuthContext + MessageStore + ?Sized>(
    host: &mut H,
    caller: Address,
    message: &[u8],
) -> Result<B256, RegistryError> {
    if caller != host.account() {
        return Err(RegistryError::SelfCallOnly);
    }
    let hash = message_hash(host.domain_separator(), message);
    host.mark_message_signed(hash);
    Ok(hash)
}

/// Empty `signature`: report the pre-approval flag. Otherwise verify `signature` as a
/// threshold bundle over the message fingerprint, with `data` as the delegate payload.
pub fn is_valid_signature<H: AuthContext + MessageStore + ?Sized>(
    host: &H,
    data: &[u8],
    signature: &[u8],
) -> bool {
    let hash = message_hash(host.domain_separator(), data);
    if signature.is_empty() {
        host.is_message_signed(hash)
    } else {
        verify(host, hash, data, signature)
    }
}
