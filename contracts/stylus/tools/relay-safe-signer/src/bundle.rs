//! Signature bundle assembly.

use std::collections::BTreeMap;

use alloy_primitives::{Address, B256};
use relay_safe_types::{encode_signatures, SignatureEntry};

use crate::{error::SignerError, keys::OwnerKey};

/// Collects one entry per signer and encodes them in ascending signer order, which is the
/// only order the verifier accepts.
#[derive(Clone, Debug, Default)]
pub struct BundleBuilder {
    entries: BTreeMap<Address, SignatureEntry>,
}

impl BundleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, signer: Address, entry: SignatureEntry) -> Result<&mut Self, SignerError> {
        if self.entries.contains_key(&signer) {
            return Err(SignerError::DuplicateSigner(signer));
        }
        self.entries.insert(signer, entry);
        Ok(self)
    }

    pub fn sign(&mut self, key: &OwnerKey, digest: B256) -> Result<&mut Self, SignerError> {
        let entry = key.sign_digest(digest)?;
        self.add(key.address(), entry)
    }

    /// Delegate entry: `validator` must accept `signature` for the data being authorized.
    pub fn delegate(
        &mut self,
        validator: Address,
        signature: Vec<u8>,
    ) -> Result<&mut Self, SignerError> {
        self.add(validator, SignatureEntry::Contract { validator, signature })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn signers(&self) -> impl Iterator<Item = Address> + '_ {
        self.entries.keys().copied()
    }

    pub fn build(&self) -> Vec<u8> {
        let entries: Vec<SignatureEntry> = self.entries.values().cloned().collect();
        encode_signatures(&entries)
    }
}
