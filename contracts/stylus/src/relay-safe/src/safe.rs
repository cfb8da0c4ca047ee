//! Threshold multisig account with relayer reimbursement.
//!
//! Owners authorize actions off-chain by signing the EIP-712 fingerprint of the action at the
//! current nonce. Anyone holding a threshold bundle can submit it through
//! `execAndPayTransaction`; the account pays the submitter (`tx.origin`) for the gas it burned
//! when `gasPrice > 0`.
//!
//! Messages can be pre-approved by an authorized self-call to `signMessage`, after which
//! `isValidSignature(message, "")` reports them valid to any caller.

use alloc::{vec, vec::Vec};

use stylus_sdk::{
    abi::Bytes,
    alloy_primitives::{Address, FixedBytes, U256},
    prelude::*,
    stylus_core::log,
};

use relay_safe_types::{
    estimate_gas, exec_and_reimburse, hashing, registry, Action, AuthContext, CallType,
    RefundAsset,
};

use crate::{
    abi::interfaces::{MessageSigned, SafeSetup},
    errors::{
        AlreadyInitialized, DuplicateOwner, GasEstimate, InvalidOperation, InvalidOwner,
        InvalidThreshold, SafeError,
    },
};

sol_storage! {
    #[entrypoint]
    pub struct RelaySafe {
        /// Membership set used during verification.
        mapping(address => bool) owners;

        /// Insertion-ordered copy of the owner set for `getOwners`.
        address[] owner_list;

        /// Zero until `setup` has run.
        uint256 threshold;

        /// Next nonce an action must be signed under.
        uint256 nonce;

        mapping(bytes32 => bool) signed_messages;
    }
}

#[public]
impl RelaySafe {
    /// One-shot initialiser. Each owner must be non-zero and distinct, and
    /// `1 <= threshold <= owners.len()`.
    pub fn setup(&mut self, owners: Vec<Address>, threshold: U256) -> Result<(), SafeError> {
        if !self.threshold.get().is_zero() {
            return Err(SafeError::AlreadyInitialized(AlreadyInitialized {}));
        }
        let count = U256::from(owners.len());
        if threshold.is_zero() || threshold > count {
            return Err(SafeError::InvalidThreshold(InvalidThreshold {
                threshold,
                owners: count,
            }));
        }
        for owner in owners.iter().copied() {
            if owner == Address::ZERO || owner == self.vm().contract_address() {
                return Err(SafeError::InvalidOwner(InvalidOwner { owner }));
            }
            if self.owners.get(owner) {
                return Err(SafeError::DuplicateOwner(DuplicateOwner { owner }));
            }
            self.owners.insert(owner, true);
            self.owner_list.push(owner);
        }
        self.threshold.set(threshold);

        log(self.vm(), SafeSetup { owners, threshold });
        Ok(())
    }

    /// Verify, consume the nonce, dispatch and reimburse `tx.origin`.
    ///
    /// Returns whether the dispatched action succeeded. A failed action still consumes the
    /// nonce, emits `ExecutionFailed` and pays the submitter.
    #[allow(clippy::too_many_arguments)]
    pub fn exec_and_pay_transaction(
        &mut self,
        to: Address,
        value: U256,
        data: Bytes,
        operation: u8,
        safe_tx_gas: U256,
        data_gas: U256,
        gas_price: U256,
        gas_token: Address,
        signatures: Bytes,
    ) -> Result<bool, SafeError> {
        let action = build_action(
            to,
            value,
            data,
            operation,
            safe_tx_gas,
            data_gas,
            gas_price,
            gas_token,
        )?;
        let receipt = exec_and_reimburse(self, &action, &signatures)?;
        Ok(receipt.success)
    }

    /// Mark `data` as approved. Only reachable through an authorized self-call.
    pub fn sign_message(&mut self, data: Bytes) -> Result<(), SafeError> {
        let caller = self.vm().msg_sender();
        let message_hash = registry::sign_message(self, caller, &data)?;
        log(self.vm(), MessageSigned { messageHash: message_hash });
        Ok(())
    }

    /// Delegate authorization capability. An empty `signature` asks for the pre-approval flag.
    pub fn is_valid_signature(&self, data: Bytes, signature: Bytes) -> bool {
        registry::is_valid_signature(self, &data, &signature)
    }

    /// Gas probe: always reverts. `GasEstimate(requiredGas)` carries the measurement so none
    /// of the probe's effects persist.
    pub fn required_tx_gas(
        &mut self,
        to: Address,
        value: U256,
        data: Bytes,
        operation: u8,
    ) -> Result<(), SafeError> {
        let call_type = call_type_of(operation)?;
        let action = Action::call(to, value, data.0).with_call_type(call_type);
        let caller = self.vm().msg_sender();
        let required_gas = estimate_gas(self, caller, &action)?;
        Err(SafeError::GasEstimate(GasEstimate {
            requiredGas: U256::from(required_gas),
        }))
    }

    pub fn nonce(&self) -> U256 {
        self.nonce.get()
    }

    pub fn domain_separator(&self) -> FixedBytes<32> {
        AuthContext::domain_separator(self)
    }

    pub fn get_threshold(&self) -> U256 {
        self.threshold.get()
    }

    pub fn get_owners(&self) -> Vec<Address> {
        (0..self.owner_list.len())
            .filter_map(|i| self.owner_list.get(i))
            .collect()
    }

    pub fn is_owner(&self, owner: Address) -> bool {
        AuthContext::is_owner(self, owner)
    }

    pub fn signed_messages(&self, message_hash: FixedBytes<32>) -> bool {
        self.signed_messages.get(message_hash)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn get_transaction_hash(
        &self,
        to: Address,
        value: U256,
        data: Bytes,
        operation: u8,
        safe_tx_gas: U256,
        data_gas: U256,
        gas_price: U256,
        gas_token: Address,
        nonce: U256,
    ) -> Result<FixedBytes<32>, SafeError> {
        let action = build_action(
            to,
            value,
            data,
            operation,
            safe_tx_gas,
            data_gas,
            gas_price,
            gas_token,
        )?;
        Ok(hashing::action_hash(
            AuthContext::domain_separator(self),
            &action,
            nonce,
        ))
    }

    /// Pre-hash bytes whose keccak256 is `getTransactionHash`.
    #[allow(clippy::too_many_arguments)]
    pub fn encode_transaction_data(
        &self,
        to: Address,
        value: U256,
        data: Bytes,
        operation: u8,
        safe_tx_gas: U256,
        data_gas: U256,
        gas_price: U256,
        gas_token: Address,
        nonce: U256,
    ) -> Result<Bytes, SafeError> {
        let action = build_action(
            to,
            value,
            data,
            operation,
            safe_tx_gas,
            data_gas,
            gas_price,
            gas_token,
        )?;
        let encoded =
            hashing::encode_action_data(AuthContext::domain_separator(self), &action, nonce);
        Ok(Bytes(encoded))
    }

    pub fn get_message_hash(&self, message: Bytes) -> FixedBytes<32> {
        hashing::message_hash(AuthContext::domain_separator(self), &message)
    }

    /// Funds reimbursement in the native asset.
    #[receive]
    #[payable]
    pub fn receive(&mut self) -> Result<(), Vec<u8>> {
        Ok(())
    }
}

fn call_type_of(operation: u8) -> Result<CallType, SafeError> {
    CallType::try_from(operation)
        .map_err(|_| SafeError::InvalidOperation(InvalidOperation { operation }))
}

#[allow(clippy::too_many_arguments)]
fn build_action(
    to: Address,
    value: U256,
    data: Bytes,
    operation: u8,
    safe_tx_gas: U256,
    data_gas: U256,
    gas_price: U256,
    gas_token: Address,
) -> Result<Action, SafeError> {
    let call_type = call_type_of(operation)?;
    Ok(Action::call(to, value, data.0)
        .with_call_type(call_type)
        .with_refund(
            safe_tx_gas,
            data_gas,
            gas_price,
            RefundAsset::from(gas_token),
        ))
}
