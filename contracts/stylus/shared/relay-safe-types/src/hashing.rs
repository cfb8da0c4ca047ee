//! EIP-712 fingerprints for actions and messages.
//!
//! Both fingerprints are two-stage: an ABI-encoded struct hash under a fixed type tag, then
//! `keccak256(0x19 || 0x01 || domainSeparator || structHash)`. Variable-length payloads are
//! hashed before they enter the struct so the encoding stays word-aligned and unambiguous.

use alloc::vec::Vec;

use alloy_primitives::{keccak256, Address, B256, U256};

use crate::action::Action;

pub const DOMAIN_TYPE: &[u8] = b"EIP712Domain(uint256 chainId,address verifyingContract)";

pub const SAFE_TX_TYPE: &[u8] = b"SafeTx(address to,uint256 value,bytes data,uint8 operation,uint256 safeTxGas,uint256 dataGas,uint256 gasPrice,address gasToken,uint256 nonce)";

pub const SAFE_MESSAGE_TYPE: &[u8] = b"SafeMessage(bytes message)";

/// EIP-191 version byte pair for structured data.
pub const EIP712_PREFIX: [u8; 2] = [0x19, 0x01];

/// Length of the pre-hash encoding returned by `encode_*_data`.
pub const ENCODED_LEN: usize = 2 + 32 + 32;

pub fn domain_type_hash() -> B256 {
    keccak256(DOMAIN_TYPE)
}

pub fn safe_tx_type_hash() -> B256 {
    keccak256(SAFE_TX_TYPE)
}

pub fn safe_message_type_hash() -> B256 {
    keccak256(SAFE_MESSAGE_TYPE)
}

/// Domain separator binding fingerprints to one account on one chain.
pub fn domain_separator(chain_id: u64, account: Address) -> B256 {
    let mut buf = Vec::with_capacity(32 * 3);
    buf.extend_from_slice(domain_type_hash().as_slice());
    buf.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
    buf.extend_from_slice(&address_word(account));
    keccak256(buf)
}

/// `keccak256(abi.encode(SAFE_TX_TYPEHASH, to, value, keccak256(data), operation, ...))`.
pub fn action_struct_hash(action: &Action, nonce: U256) -> B256 {
    let mut buf = Vec::with_capacity(32 * 10);
    buf.extend_from_slice(safe_tx_type_hash().as_slice());
    buf.extend_from_slice(&address_word(action.target));
    buf.extend_from_slice(&action.value.to_be_bytes::<32>());
    buf.extend_from_slice(keccak256(&action.payload).as_slice());
    buf.extend_from_slice(&u8_word(action.call_type as u8));
    buf.extend_from_slice(&action.gas_budget.to_be_bytes::<32>());
    buf.extend_from_slice(&action.data_allowance.to_be_bytes::<32>());
    buf.extend_from_slice(&action.gas_price.to_be_bytes::<32>());
    buf.extend_from_slice(&address_word(action.refund_asset.as_address()));
    buf.extend_from_slice(&nonce.to_be_bytes::<32>());
    keccak256(buf)
}

/// Pre-hash bytes signers commit to; also the `data` handed to delegate validators.
pub fn encode_action_data(domain: B256, action: &Action, nonce: U256) -> Vec<u8> {
    wrap(domain, action_struct_hash(action, nonce))
}

pub fn action_hash(domain: B256, action: &Action, nonce: U256) -> B256 {
    keccak256(encode_action_data(domain, action, nonce))
}

pub fn message_struct_hash(message: &[u8]) -> B256 {
    let mut buf = Vec::with_capacity(32 * 2);
    buf.extend_from_slice(safe_message_type_hash().as_slice());
    buf.extend_from_slice(keccak256(message).as_slice());
    keccak256(buf)
}

pub fn encode_message_data(domain: B256, message: &[u8]) -> Vec<u8> {
    wrap(domain, message_struct_hash(message))
}

pub fn message_hash(domain: B256, message: &[u8]) -> B256 {
    keccak256(encode_message_data(domain, message))
}

fn wrap(domain: B256, struct_hash: B256) -> Vec<u8> {
    let mut buf = Vec::with_capacity(ENCODED_LEN);
    buf.extend_from_slice(&EIP712_PREFIX);
    buf.extend_from_slice(domain.as_slice());
    buf.extend_from_slice(struct_hash.as_slice());
    buf
}

/// Address left-padded to a 32-byte ABI word.
pub(crate) fn address_word(address: Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..32].copy_from_slice(address.as_slice());
    word
}

fn u8_word(value: u8) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[31] = value;
    word
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::action::{CallType, RefundAsset};

    fn sample_action() -> Action {
        Action::call(Address::repeat_byte(0xaa), U256::from(7u64), vec![0xde, 0xad, 0xbe, 0xef])
            .with_refund(
                U256::from(100_000u64),
                U256::from(5_000u64),
                U256::from(3u64),
                RefundAsset::Token(Address::repeat_byte(0x77)),
            )
    }

    #[test]
    fn encoding_is_prefix_domain_struct() {
        let domain = domain_separator(42161, Address::repeat_byte(0x01));
        let action = sample_action();
        let encoded = encode_action_data(domain, &action, U256::from(3u64));

        assert_eq!(encoded.len(), ENCODED_LEN);
        assert_eq!(&encoded[0..2], &[0x19, 0x01]);
        assert_eq!(&encoded[2..34], domain.as_slice());
        assert_eq!(&encoded[34..66], action_struct_hash(&action, U256::from(3u64)).as_slice());
        assert_eq!(action_hash(domain, &action, U256::from(3u64)), keccak256(&encoded));
    }

    #[test]
    fn domain_separates_accounts_and_chains() {
        let account = Address::repeat_byte(0x01);
        let action = sample_action();
        let base = action_hash(domain_separator(1, account), &action, U256::ZERO);

        let other_chain = action_hash(domain_separator(2, account), &action, U256::ZERO);
        let other_account =
            action_hash(domain_separator(1, Address::repeat_byte(0x02)), &action, U256::ZERO);

        assert_ne!(base, other_chain);
        assert_ne!(base, other_account);
    }

    #[test]
    fn nonce_is_committed() {
        let domain = domain_separator(1, Address::repeat_byte(0x01));
        let action = sample_action();
        assert_ne!(
            action_hash(domain, &action, U256::ZERO),
            action_hash(domain, &action, U256::from(1u64))
        );
    }

    #[test]
    fn every_action_field_is_committed() {
        let domain = domain_separator(1, Address::repeat_byte(0x01));
        let base = sample_action();
        let base_hash = action_hash(domain, &base, U256::ZERO);

        let mut variants = vec![base.clone(); 8];
        variants[0].target = Address::repeat_byte(0xab);
        variants[1].value += U256::from(1u64);
        variants[2].payload.push(0);
        variants[3].call_type = CallType::DelegateCall;
        variants[4].gas_budget += U256::from(1u64);
        variants[5].data_allowance += U256::from(1u64);
        variants[6].gas_price += U256::from(1u64);
        variants[7].refund_asset = RefundAsset::Native;

        for variant in variants {
            assert_ne!(action_hash(domain, &variant, U256::ZERO), base_hash, "{variant:?}");
        }
    }

    #[test]
    fn message_and_action_tags_differ() {
        let domain = domain_separator(1, Address::repeat_byte(0x01));
        assert_ne!(safe_tx_type_hash(), safe_message_type_hash());

        let message = b"hello relay-safe";
        let hash = message_hash(domain, message);
        assert_eq!(hash, keccak256(encode_message_data(domain, message)));
        assert_ne!(hash, message_hash(domain, b"hello relay-safe!"));
        assert_ne!(
            hash,
            message_hash(domain_separator(1, Address::repeat_byte(0x02)), message)
        );
    }

    #[test]
    fn type_hashes_match_type_strings() {
        assert_eq!(
            safe_message_type_hash(),
            keccak256("SafeMessage(bytes message)")
        );
        assert_eq!(
            domain_type_hash(),
            keccak256("EIP712Domain(uint256 chainId,address verifyingContract)")
        );
    }
}
