//! secp256k1 owner keys.

use std::fmt;

use alloy_primitives::{keccak256, Address, B256};
use k256::ecdsa::{RecoveryId, SigningKey, VerifyingKey};
use relay_safe_types::SignatureEntry;

use crate::error::SignerError;

/// Ethereum address of a secp256k1 public key.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 SEC1 tag.
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

pub struct OwnerKey {
    key: SigningKey,
    address: Address,
}

impl OwnerKey {
    /// Exactly 32 bytes; shorter scalars are not left-padded.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignerError> {
        if bytes.len() != 32 {
            return Err(SignerError::InvalidKey);
        }
        let key = SigningKey::from_slice(bytes).map_err(|_| SignerError::InvalidKey)?;
        let address = address_of(key.verifying_key());
        Ok(Self { key, address })
    }

    /// Accepts an optional `0x` prefix and surrounding whitespace.
    pub fn from_hex(input: &str) -> Result<Self, SignerError> {
        let trimmed = input.trim();
        let raw = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        Self::from_bytes(&hex::decode(raw)?)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte fingerprint as-is (no personal-message prefix).
    ///
    /// The signature is low-s and `v` is 27 or 28, the form `ecrecover` expects.
    pub fn sign_digest(&self, digest: B256) -> Result<SignatureEntry, SignerError> {
        let (mut signature, mut recovery_id) = self.key.sign_prehash_recoverable(digest.as_slice())?;
        if let Some(normalized) = signature.normalize_s() {
            signature = normalized;
            recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
        }
        let bytes = signature.to_bytes();
        Ok(SignatureEntry::Ecdsa {
            r: B256::from_slice(&bytes[..32]),
            s: B256::from_slice(&bytes[32..]),
            v: 27 + recovery_id.to_byte(),
        })
    }
}

impl fmt::Debug for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnerKey").field("address", &self.address).finish_non_exhaustive()
    }
}
