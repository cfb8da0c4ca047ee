//! In-crate test host.
//!
//! "Signatures" here are not ECDSA: `r` carries the signer address and `s` the digest, so a
//! slot recovers only for the exact digest it was made for.

use alloc::{collections::BTreeMap, vec::Vec};
use core::cell::Cell;

use alloy_primitives::{Address, B256, U256};

use crate::{
    action::{CallType, RefundAsset},
    hashing::{address_word, domain_separator},
    host::{AuthContext, ExecutionHost, MessageStore},
    signatures::SignatureEntry,
};

pub(crate) fn mock_sign(signer: Address, digest: B256) -> SignatureEntry {
    SignatureEntry::Ecdsa {
        r: B256::from(address_word(signer)),
        s: digest,
        v: 27,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Dispatched {
    pub target: Address,
    pub value: U256,
    pub payload: Vec<u8>,
    pub call_type: CallType,
    pub gas: u64,
}

pub(crate) struct TestAccount {
    pub address: Address,
    pub owners: Vec<Address>,
    pub threshold: usize,
    pub delegates: Vec<(Address, Vec<u8>, Vec<u8>)>,
    pub nonce: U256,
    pub signed: Vec<B256>,
    pub gas: Cell<u64>,
    pub recover_cost: u64,
    pub dispatch_cost: u64,
    pub dispatch_succeeds: bool,
    pub dispatched: Vec<Dispatched>,
    pub origin: Address,
    pub native_balance: U256,
    pub token_balances: BTreeMap<Address, U256>,
    pub payments: Vec<(RefundAsset, Address, U256)>,
    pub failures: Vec<B256>,
}

impl TestAccount {
    pub fn new(owners: &[Address], threshold: usize) -> Self {
        Self {
            address: Address::repeat_byte(0x5a),
            owners: owners.to_vec(),
            threshold,
            delegates: Vec::new(),
            nonce: U256::ZERO,
            signed: Vec::new(),
            gas: Cell::new(1_000_000),
            recover_cost: 3_000,
            dispatch_cost: 40_000,
            dispatch_succeeds: true,
            dispatched: Vec::new(),
            origin: Address::repeat_byte(0xee),
            native_balance: U256::ZERO,
            token_balances: BTreeMap::new(),
            payments: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Register a delegate that accepts exactly `(data, signature)`.
    pub fn accept_delegate(&mut self, validator: Address, data: Vec<u8>, signature: Vec<u8>) {
        self.delegates.push((validator, data, signature));
    }

    fn burn(&self, amount: u64) {
        self.gas.set(self.gas.get().saturating_sub(amount));
    }
}

impl AuthContext for TestAccount {
    fn account(&self) -> Address {
        self.address
    }

    fn domain_separator(&self) -> B256 {
        domain_separator(1, self.address)
    }

    fn threshold(&self) -> usize {
        self.threshold
    }

    fn is_owner(&self, candidate: Address) -> bool {
        candidate != Address::ZERO && self.owners.contains(&candidate)
    }

    fn recover_signer(&self, digest: B256, v: u8, r: B256, s: B256) -> Option<Address> {
        self.burn(self.recover_cost);
        if v != 27 || s != digest || r[..12].iter().any(|b| *b != 0) {
            return None;
        }
        let signer = Address::from_slice(&r[12..32]);
        (signer != Address::ZERO).then_some(signer)
    }

    fn delegate_is_valid(&self, validator: Address, data: &[u8], signature: &[u8]) -> bool {
        self.delegates
            .iter()
            .any(|(v, d, s)| *v == validator && d.as_slice() == data && s.as_slice() == signature)
    }
}

impl MessageStore for TestAccount {
    fn is_message_signed(&self, hash: B256) -> bool {
        self.signed.contains(&hash)
    }

    fn mark_message_signed(&mut self, hash: B256) {
        self.signed.push(hash);
    }
}

impl ExecutionHost for TestAccount {
    fn nonce(&self) -> U256 {
        self.nonce
    }

    fn set_nonce(&mut self, nonce: U256) {
        self.nonce = nonce;
    }

    fn gas_left(&self) -> u64 {
        self.gas.get()
    }

    fn dispatch(
        &mut self,
        target: Address,
        value: U256,
        payload: &[u8],
        call_type: CallType,
        gas: u64,
    ) -> bool {
        self.dispatched.push(Dispatched {
            target,
            value,
            payload: payload.to_vec(),
            call_type,
            gas,
        });
        let within_limit = self.dispatch_cost <= gas;
        self.burn(self.dispatch_cost.min(gas));
        self.dispatch_succeeds && within_limit
    }

    fn submitter(&self) -> Address {
        self.origin
    }

    fn pay_native(&mut self, to: Address, amount: U256) -> bool {
        if self.native_balance < amount {
            return false;
        }
        self.native_balance -= amount;
        self.payments.push((RefundAsset::Native, to, amount));
        true
    }

    fn transfer_token(&mut self, token: Address, to: Address, amount: U256) -> bool {
        let balance = self.token_balances.entry(token).or_default();
        if *balance < amount {
            return false;
        }
        *balance -= amount;
        self.payments.push((RefundAsset::Token(token), to, amount));
        true
    }

    fn execution_failed(&mut self, fingerprint: B256) {
        self.failures.push(fingerprint);
    }
}
