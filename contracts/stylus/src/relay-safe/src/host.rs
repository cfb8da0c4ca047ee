//! Binds the shared authorization core to Stylus storage and hostios.

use stylus_sdk::{
    alloy_primitives::{Address, FixedBytes, U256},
    prelude::*,
    stylus_core::log,
};

use relay_safe_types::{hashing, AuthContext, CallType, ExecutionHost, MessageStore};

use crate::{
    abi::interfaces::ExecutionFailed,
    safe::RelaySafe,
    utils::{calls, crypto::ecrecover_address},
};

impl AuthContext for RelaySafe {
    fn account(&self) -> Address {
        self.vm().contract_address()
    }

    fn domain_separator(&self) -> FixedBytes<32> {
        hashing::domain_separator(self.vm().chain_id(), self.vm().contract_address())
    }

    fn threshold(&self) -> usize {
        self.threshold.get().saturating_to::<usize>()
    }

    fn is_owner(&self, candidate: Address) -> bool {
        candidate != Address::ZERO && self.owners.get(candidate)
    }

    fn recover_signer(
        &self,
        digest: FixedBytes<32>,
        v: u8,
        r: FixedBytes<32>,
        s: FixedBytes<32>,
    ) -> Option<Address> {
        ecrecover_address(digest, v, r, s).ok()
    }

    fn delegate_is_valid(&self, validator: Address, data: &[u8], signature: &[u8]) -> bool {
        calls::validator_accepts(validator, data, signature)
    }
}

impl MessageStore for RelaySafe {
    fn is_message_signed(&self, hash: FixedBytes<32>) -> bool {
        self.signed_messages.get(hash)
    }

    fn mark_message_signed(&mut self, hash: FixedBytes<32>) {
        self.signed_messages.insert(hash, true);
    }
}

impl ExecutionHost for RelaySafe {
    fn nonce(&self) -> U256 {
        self.nonce.get()
    }

    fn set_nonce(&mut self, nonce: U256) {
        self.nonce.set(nonce);
    }

    fn gas_left(&self) -> u64 {
        self.vm().evm_gas_left()
    }

    fn dispatch(
        &mut self,
        target: Address,
        value: U256,
        payload: &[u8],
        call_type: CallType,
        gas: u64,
    ) -> bool {
        calls::dispatch(target, value, payload, call_type, gas)
    }

    fn submitter(&self) -> Address {
        self.vm().tx_origin()
    }

    fn pay_native(&mut self, to: Address, amount: U256) -> bool {
        calls::send_native(to, amount)
    }

    fn transfer_token(&mut self, token: Address, to: Address, amount: U256) -> bool {
        calls::transfer_token(token, to, amount)
    }

    fn execution_failed(&mut self, fingerprint: FixedBytes<32>) {
        log(self.vm(), ExecutionFailed { txHash: fingerprint });
    }
}
