//! Packed signature bundle codec.
//!
//! Layout: `n` static slots of `r(32) || s(32) || v(1)`, followed by an optional dynamic
//! tail. A slot with `v == 0` is a delegate entry: the low 20 bytes of `r` name the
//! validator contract and `s` is the byte offset of `uint256 length || bytes` inside the
//! bundle.

use alloc::vec::Vec;

use alloy_primitives::{Address, B256, U256};

use crate::{errors::SignatureError, hashing::address_word};

pub const SIGNATURE_LEN: usize = 65;

/// One decoded authorization slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignatureEntry {
    /// secp256k1 signature over the fingerprint.
    Ecdsa { r: B256, s: B256, v: u8 },
    /// Validation delegated to another authorization contract.
    Contract { validator: Address, signature: Vec<u8> },
}

/// Decode exactly `count` slots. Anything after them (other than dynamic data referenced by
/// a delegate slot) is never looked at.
pub fn decode_signatures(bundle: &[u8], count: usize) -> Result<Vec<SignatureEntry>, SignatureError> {
    let static_len = count
        .checked_mul(SIGNATURE_LEN)
        .ok_or(SignatureError::Truncated)?;
    if bundle.len() < static_len {
        return Err(SignatureError::Truncated);
    }

    let mut entries = Vec::with_capacity(count);
    for slot in 0..count {
        let base = slot * SIGNATURE_LEN;
        let r = B256::from_slice(&bundle[base..base + 32]);
        let s = B256::from_slice(&bundle[base + 32..base + 64]);
        let v = bundle[base + 64];

        let entry = if v == 0 {
            let validator = Address::from_slice(&r[12..32]);
            let signature = read_dynamic(bundle, U256::from_be_bytes(s.0))?;
            SignatureEntry::Contract { validator, signature }
        } else {
            SignatureEntry::Ecdsa { r, s, v }
        };
        entries.push(entry);
    }
    Ok(entries)
}

/// Pack entries in the given order; delegate payloads go to the tail.
pub fn encode_signatures(entries: &[SignatureEntry]) -> Vec<u8> {
    let static_len = entries.len() * SIGNATURE_LEN;
    let mut head = Vec::with_capacity(static_len);
    let mut tail = Vec::new();

    for entry in entries {
        match entry {
            SignatureEntry::Ecdsa { r, s, v } => {
                head.extend_from_slice(r.as_slice());
                head.extend_from_slice(s.as_slice());
                head.push(*v);
            }
            SignatureEntry::Contract { validator, signature } => {
                let offset = static_len + tail.len();
                head.extend_from_slice(&address_word(*validator));
                head.extend_from_slice(&U256::from(offset).to_be_bytes::<32>());
                head.push(0);
                tail.extend_from_slice(&U256::from(signature.len()).to_be_bytes::<32>());
                tail.extend_from_slice(signature);
            }
        }
    }

    head.extend_from_slice(&tail);
    head
}

fn read_dynamic(bundle: &[u8], offset: U256) -> Result<Vec<u8>, SignatureError> {
    let start = to_index(offset, bundle.len())?;
    let data_start = start
        .checked_add(32)
        .filter(|end| *end <= bundle.len())
        .ok_or(SignatureError::OffsetOutOfBounds)?;
    let len = to_index(U256::from_be_slice(&bundle[start..data_start]), bundle.len())?;
    let data_end = data_start
        .checked_add(len)
        .filter(|end| *end <= bundle.len())
        .ok_or(SignatureError::OffsetOutOfBounds)?;
    Ok(bundle[data_start..data_end].to_vec())
}

fn to_index(value: U256, bound: usize) -> Result<usize, SignatureError> {
    if value > U256::from(bound) {
        return Err(SignatureError::OffsetOutOfBounds);
    }
    Ok(value.to::<usize>())
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn ecdsa(byte: u8) -> SignatureEntry {
        SignatureEntry::Ecdsa {
            r: B256::repeat_byte(byte),
            s: B256::repeat_byte(byte.wrapping_add(1)),
            v: 27,
        }
    }

    #[test]
    fn decodes_ecdsa_slots_in_order() {
        let entries = vec![ecdsa(1), ecdsa(2)];
        let bundle = encode_signatures(&entries);
        assert_eq!(bundle.len(), 2 * SIGNATURE_LEN);
        assert_eq!(decode_signatures(&bundle, 2), Ok(entries));
    }

    #[test]
    fn delegate_entry_points_into_tail() {
        let validator = Address::repeat_byte(0x33);
        let entries = vec![
            ecdsa(1),
            SignatureEntry::Contract { validator, signature: vec![9, 8, 7] },
        ];
        let bundle = encode_signatures(&entries);

        // Offset of the dynamic blob is stored in the second slot's `s`.
        let offset = U256::from_be_slice(&bundle[SIGNATURE_LEN + 32..SIGNATURE_LEN + 64]);
        assert_eq!(offset, U256::from(2 * SIGNATURE_LEN));
        assert_eq!(bundle[2 * SIGNATURE_LEN - 1], 0);
        assert_eq!(bundle.len(), 2 * SIGNATURE_LEN + 32 + 3);

        let decoded = decode_signatures(&bundle, 2).unwrap();
        assert_eq!(decoded, entries);
    }

    #[test]
    fn only_requested_slots_are_decoded() {
        let mut bundle = encode_signatures(&[ecdsa(1)]);
        bundle.extend_from_slice(&[0xff; 40]);
        assert_eq!(decode_signatures(&bundle, 1), Ok(vec![ecdsa(1)]));
    }

    #[test]
    fn short_bundle_is_truncated() {
        let bundle = encode_signatures(&[ecdsa(1)]);
        assert_eq!(decode_signatures(&bundle, 2), Err(SignatureError::Truncated));
        assert_eq!(decode_signatures(&bundle[..64], 1), Err(SignatureError::Truncated));
        assert_eq!(decode_signatures(&[], 0), Ok(vec![]));
    }

    #[test]
    fn delegate_offset_outside_bundle_is_rejected() {
        let mut slot = vec![0u8; SIGNATURE_LEN];
        slot[12..32].copy_from_slice(Address::repeat_byte(0x44).as_slice());
        slot[32..64].copy_from_slice(&U256::from(1_000u64).to_be_bytes::<32>());
        assert_eq!(decode_signatures(&slot, 1), Err(SignatureError::OffsetOutOfBounds));

        // Offset fits, declared length does not.
        let mut bundle = slot.clone();
        bundle[32..64].copy_from_slice(&U256::from(SIGNATURE_LEN).to_be_bytes::<32>());
        bundle.extend_from_slice(&U256::from(64u64).to_be_bytes::<32>());
        bundle.extend_from_slice(&[1u8; 10]);
        assert_eq!(decode_signatures(&bundle, 1), Err(SignatureError::OffsetOutOfBounds));

        // Huge offset does not overflow.
        let mut huge = slot;
        huge[32..64].copy_from_slice(&U256::MAX.to_be_bytes::<32>());
        assert_eq!(decode_signatures(&huge, 1), Err(SignatureError::OffsetOutOfBounds));
    }
}
