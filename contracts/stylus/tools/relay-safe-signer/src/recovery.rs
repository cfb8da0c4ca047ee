//! Off-chain signer recovery and a standalone verifier for pre-validating bundles.

use std::collections::BTreeSet;

use alloy_primitives::{Address, B256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use relay_safe_types::{check_signatures, hashing, AuthContext, AuthError};

use crate::keys::address_of;

/// k256 counterpart of the `ecrecover` precompile.
///
/// Only `v` in {27, 28} recovers. Unlike the precompile, high-s signatures are rejected, so a
/// bundle that verifies here also verifies on-chain but not necessarily the reverse.
pub fn recover_address(digest: B256, v: u8, r: B256, s: B256) -> Option<Address> {
    let recovery_id = match v {
        27 | 28 => RecoveryId::from_byte(v - 27)?,
        _ => return None,
    };
    let mut bytes = [0u8; 64];
    bytes[..32].copy_from_slice(r.as_slice());
    bytes[32..].copy_from_slice(s.as_slice());
    let signature = Signature::from_slice(&bytes).ok()?;
    let key = VerifyingKey::recover_from_prehash(digest.as_slice(), &signature, recovery_id).ok()?;
    Some(address_of(&key))
}

/// Owner set and threshold of a deployed account, checked without a chain.
///
/// Delegate entries cannot be evaluated offline and always fail.
#[derive(Clone, Debug)]
pub struct OfflineVerifier {
    account: Address,
    domain_separator: B256,
    owners: BTreeSet<Address>,
    threshold: usize,
}

impl OfflineVerifier {
    pub fn new(
        chain_id: u64,
        account: Address,
        owners: impl IntoIterator<Item = Address>,
        threshold: usize,
    ) -> Self {
        Self {
            account,
            domain_separator: hashing::domain_separator(chain_id, account),
            owners: owners.into_iter().collect(),
            threshold,
        }
    }

    pub fn check(&self, data_hash: B256, data: &[u8], signatures: &[u8]) -> Result<(), AuthError> {
        check_signatures(self, data_hash, data, signatures)
    }
}

impl AuthContext for OfflineVerifier {
    fn account(&self) -> Address {
        self.account
    }

    fn domain_separator(&self) -> B256 {
        self.domain_separator
    }

    fn threshold(&self) -> usize {
        self.threshold
    }

    fn is_owner(&self, candidate: Address) -> bool {
        candidate != Address::ZERO && self.owners.contains(&candidate)
    }

    fn recover_signer(&self, digest: B256, v: u8, r: B256, s: B256) -> Option<Address> {
        recover_address(digest, v, r, s)
    }

    fn delegate_is_valid(&self, _validator: Address, _data: &[u8], _signature: &[u8]) -> bool {
        false
    }
}
