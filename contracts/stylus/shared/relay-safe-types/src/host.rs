//! Host abstraction, implemented differently on-chain vs off-chain.

use alloy_primitives::{Address, B256, U256};

use crate::action::CallType;

/// Read-only account view needed to authorize a fingerprint.
pub trait AuthContext {
    /// Address of the account itself (the only permitted caller of self-call entry points).
    fn account(&self) -> Address;

    fn domain_separator(&self) -> B256;

    fn threshold(&self) -> usize;

    fn is_owner(&self, candidate: Address) -> bool;

    /// Recover the signer of `digest`, `None` when recovery fails.
    fn recover_signer(&self, digest: B256, v: u8, r: B256, s: B256) -> Option<Address>;

    /// Ask `validator` whether `signature` authorizes `data`. Trusted as-is.
    fn delegate_is_valid(&self, validator: Address, data: &[u8], signature: &[u8]) -> bool;
}

/// Append-only set of pre-approved message fingerprints.
pub trait MessageStore {
    fn is_message_signed(&self, hash: B256) -> bool;

    fn mark_message_signed(&mut self, hash: B256);
}

/// Everything `exec_and_reimburse` touches beyond authorization.
pub trait ExecutionHost: AuthContext {
    fn nonce(&self) -> U256;

    fn set_nonce(&mut self, nonce: U256);

    /// Remaining gas; never increases within one call.
    fn gas_left(&self) -> u64;

    /// Perform the action. Failure is reported, never propagated.
    fn dispatch(
        &mut self,
        target: Address,
        value: U256,
        payload: &[u8],
        call_type: CallType,
        gas: u64,
    ) -> bool;

    /// Original transaction submitter (`tx.origin`), who gets reimbursed.
    fn submitter(&self) -> Address;

    fn pay_native(&mut self, to: Address, amount: U256) -> bool;

    fn transfer_token(&mut self, token: Address, to: Address, amount: U256) -> bool;

    /// Notification for a dispatched action that failed (`ExecutionFailed`).
    fn execution_failed(&mut self, fingerprint: B256);
}
