//! Threshold signature verification.

use alloy_primitives::{Address, B256};

use crate::{
    errors::AuthError,
    host::AuthContext,
    signatures::{decode_signatures, SignatureEntry},
};

impl SignatureEntry {
    /// Resolve the authorizing address of this slot.
    ///
    /// Delegate slots resolve to the validator once it accepts `data`; ECDSA slots resolve
    /// to whatever `data_hash` recovers to.
    pub fn authorize<C: AuthContext + ?Sized>(
        &self,
        ctx: &C,
        data_hash: B256,
        data: &[u8],
        slot: usize,
    ) -> Result<Address, AuthError> {
        match self {
            SignatureEntry::Contract { validator, signature } => {
                if !ctx.delegate_is_valid(*validator, data, signature) {
                    return Err(AuthError::DelegateRejected {
                        validator: *validator,
                    });
                }
                Ok(*validator)
            }
            SignatureEntry::Ecdsa { r, s, v } => ctx
                .recover_signer(data_hash, *v, *r, *s)
                .ok_or(AuthError::RecoveryFailed { slot }),
        }
    }
}

/// Check that the first `threshold` slots of `signatures` are valid authorizations by
/// distinct owners, sorted by strictly ascending address.
///
/// Slots beyond `threshold` are never inspected.
pub fn check_signatures<C: AuthContext + ?Sized>(
    ctx: &C,
    data_hash: B256,
    data: &[u8],
    signatures: &[u8],
) -> Result<(), AuthError> {
    let entries = decode_signatures(signatures, ctx.threshold())?;

    // Zero is never an owner, so starting here also rejects a zero signer.
    let mut last_owner = Address::ZERO;
    for (slot, entry) in entries.iter().enumerate() {
        let current = entry.authorize(ctx, data_hash, data, slot)?;
        if current <= last_owner {
            return Err(AuthError::SignerOutOfOrder { signer: current });
        }
        if !ctx.is_owner(current) {
            return Err(AuthError::NotAnOwner { signer: current });
        }
        last_owner = current;
    }
    Ok(())
}

pub fn verify<C: AuthContext + ?Sized>(
    ctx: &C,
    data_hash: B256,
    data: &[u8],
    signatures: &[u8],
) -> bool {
    check_signatures(ctx, data_hash, data, signatures).is_ok()
}
