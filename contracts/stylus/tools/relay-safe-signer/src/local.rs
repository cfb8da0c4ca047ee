//! In-memory relay-safe account.
//!
//! `LocalSafe` drives the shared execution core against a [`Ledger`] and a gas meter instead
//! of EVM hostios. Revert semantics follow the contract:
//! - a top-level call that returns `Err` leaves no trace (nonce, balances, events);
//! - a failed dispatch only undoes the changes made by that dispatch.
//!
//! Calls the account makes to itself reach its own `signMessage` and `requiredTxGas` entry
//! points; everything else goes to the [`Dispatch`] hook.

use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex},
};

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, SolCall};
use relay_safe_types::{
    estimate_gas, exec_and_reimburse, hashing, registry, Action, AuthContext, CallType,
    ExecutionHost, ExecutionReceipt, MessageStore,
};
use tracing::{debug, info, warn};

use crate::{error::SignerError, ledger::Ledger, recovery::recover_address};

/// Charged per signer recovery, matching the precompile's fee.
pub const ECRECOVER_GAS: u64 = 3_000;
/// Charged per delegate validator consultation.
pub const DELEGATE_CALL_GAS: u64 = 10_000;
/// Charged per reimbursement transfer, after consumption has been measured.
pub const TRANSFER_GAS: u64 = 9_000;
/// Charged for a self-call to `signMessage` (one fresh storage slot plus the log).
pub const SIGN_MESSAGE_GAS: u64 = 22_100;

sol! {
    /// Self-call entry points of the account, as exported by the contract.
    interface IRelaySafe {
        function signMessage(bytes data) external;
        function requiredTxGas(address to, uint256 value, bytes data, uint8 operation) external;
    }
}

/// Calldata for a self-call that pre-approves `message`.
pub fn sign_message_calldata(message: &[u8]) -> Vec<u8> {
    IRelaySafe::signMessageCall {
        data: message.to_vec().into(),
    }
    .abi_encode()
}

/// Call handed to a [`Dispatch`] implementation.
#[derive(Debug)]
pub struct DispatchRequest<'a> {
    /// Account the call is made from.
    pub account: Address,
    pub target: Address,
    pub value: U256,
    pub payload: &'a [u8],
    pub call_type: CallType,
    /// Gas cap for this call.
    pub gas: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchResult {
    pub success: bool,
    pub gas_used: u64,
}

impl DispatchResult {
    pub fn ok(gas_used: u64) -> Self {
        Self { success: true, gas_used }
    }

    pub fn failed(gas_used: u64) -> Self {
        Self { success: false, gas_used }
    }
}

/// Effects of dispatched actions. Native `value` has already been moved to the target
/// when this runs.
pub trait Dispatch: Send {
    fn dispatch(&mut self, ledger: &mut Ledger, request: &DispatchRequest<'_>) -> DispatchResult;
}

impl<F> Dispatch for F
where
    F: FnMut(&mut Ledger, &DispatchRequest<'_>) -> DispatchResult + Send,
{
    fn dispatch(&mut self, ledger: &mut Ledger, request: &DispatchRequest<'_>) -> DispatchResult {
        self(ledger, request)
    }
}

/// Treats every action as a plain transfer of its `value`.
#[derive(Clone, Copy, Debug)]
pub struct TransferDispatcher {
    pub gas_used: u64,
}

impl Default for TransferDispatcher {
    fn default() -> Self {
        Self { gas_used: 21_000 }
    }
}

impl Dispatch for TransferDispatcher {
    fn dispatch(&mut self, _ledger: &mut Ledger, _request: &DispatchRequest<'_>) -> DispatchResult {
        DispatchResult::ok(self.gas_used)
    }
}

/// Delegate authorization capability (`isValidSignature(data, signature)`).
pub trait DelegateValidator: Send + Sync {
    fn is_valid_signature(&self, data: &[u8], signature: &[u8]) -> bool;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SafeEvent {
    ExecutionFailed { tx_hash: B256 },
    MessageSigned { message_hash: B256 },
}

#[derive(Clone, Debug, Default)]
struct State {
    nonce: U256,
    ledger: Ledger,
    signed_messages: BTreeSet<B256>,
    events: Vec<SafeEvent>,
}

pub struct LocalSafe {
    address: Address,
    chain_id: u64,
    owners: Vec<Address>,
    threshold: usize,
    state: State,
    dispatcher: Box<dyn Dispatch>,
    validators: BTreeMap<Address, Arc<dyn DelegateValidator>>,
}

impl LocalSafe {
    /// Same configuration rules as the contract's `setup`.
    pub fn new(
        address: Address,
        chain_id: u64,
        owners: Vec<Address>,
        threshold: usize,
    ) -> Result<Self, SignerError> {
        if threshold == 0 || threshold > owners.len() {
            return Err(SignerError::InvalidThreshold {
                threshold,
                owners: owners.len(),
            });
        }
        let mut seen = BTreeSet::new();
        for owner in &owners {
            if *owner == Address::ZERO || *owner == address {
                return Err(SignerError::InvalidOwner(*owner));
            }
            if !seen.insert(*owner) {
                return Err(SignerError::DuplicateOwner(*owner));
            }
        }
        Ok(Self {
            address,
            chain_id,
            owners,
            threshold,
            state: State::default(),
            dispatcher: Box::new(TransferDispatcher::default()),
            validators: BTreeMap::new(),
        })
    }

    pub fn with_dispatcher(mut self, dispatcher: impl Dispatch + 'static) -> Self {
        self.dispatcher = Box::new(dispatcher);
        self
    }

    /// Make `validator` reachable as a delegate signer of this account.
    pub fn register_validator(
        &mut self,
        address: Address,
        validator: Arc<dyn DelegateValidator>,
    ) -> Result<(), SignerError> {
        if address == self.address {
            return Err(SignerError::SelfValidator);
        }
        self.validators.insert(address, validator);
        Ok(())
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owners(&self) -> &[Address] {
        &self.owners
    }

    pub fn nonce(&self) -> U256 {
        self.state.nonce
    }

    pub fn ledger(&self) -> &Ledger {
        &self.state.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.state.ledger
    }

    pub fn events(&self) -> &[SafeEvent] {
        &self.state.events
    }

    /// Fingerprint owners must sign for `action` to run next.
    pub fn action_hash(&self, action: &Action) -> B256 {
        hashing::action_hash(AuthContext::domain_separator(self), action, self.state.nonce)
    }

    /// Pre-hash bytes of `action` at the current nonce; delegate signers receive these.
    pub fn encode_action(&self, action: &Action) -> Vec<u8> {
        hashing::encode_action_data(AuthContext::domain_separator(self), action, self.state.nonce)
    }

    pub fn message_hash(&self, message: &[u8]) -> B256 {
        hashing::message_hash(AuthContext::domain_separator(self), message)
    }

    /// Submit `action` as `submitter` (`tx.origin`) with `gas_limit` available.
    pub fn exec(
        &mut self,
        submitter: Address,
        gas_limit: u64,
        action: &Action,
        signatures: &[u8],
    ) -> Result<ExecutionReceipt, SignerError> {
        let snapshot = self.state.clone();
        let mut session = Session::new(self, submitter, gas_limit);
        match exec_and_reimburse(&mut session, action, signatures) {
            Ok(receipt) => {
                info!(
                    account = %self.address,
                    nonce = %receipt.nonce,
                    success = receipt.success,
                    payment = %receipt.payment,
                    "action executed"
                );
                Ok(receipt)
            }
            Err(err) => {
                warn!(account = %self.address, ?err, "execution reverted");
                self.state = snapshot;
                Err(err.into())
            }
        }
    }

    /// Gas consumed by dispatching `action`. Nothing the probe does is kept.
    pub fn estimate_gas(
        &mut self,
        caller: Address,
        gas_limit: u64,
        action: &Action,
    ) -> Result<u64, SignerError> {
        let snapshot = self.state.clone();
        let mut session = Session::new(self, caller, gas_limit);
        let estimate = estimate_gas(&mut session, caller, action);
        self.state = snapshot;
        Ok(estimate?)
    }

    /// `signMessage` as reached from `caller`; only the account itself is accepted.
    pub fn sign_message(&mut self, caller: Address, message: &[u8]) -> Result<B256, SignerError> {
        let message_hash = registry::sign_message(self, caller, message)?;
        self.state.events.push(SafeEvent::MessageSigned { message_hash });
        debug!(account = %self.address, %message_hash, "message pre-approved");
        Ok(message_hash)
    }

    pub fn is_valid_signature(&self, data: &[u8], signature: &[u8]) -> bool {
        registry::is_valid_signature(self, data, signature)
    }
}

impl AuthContext for LocalSafe {
    fn account(&self) -> Address {
        self.address
    }

    fn domain_separator(&self) -> B256 {
        hashing::domain_separator(self.chain_id, self.address)
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

    fn delegate_is_valid(&self, validator: Address, data: &[u8], signature: &[u8]) -> bool {
        self.validators
            .get(&validator)
            .is_some_and(|v| v.is_valid_signature(data, signature))
    }
}

impl MessageStore for LocalSafe {
    fn is_message_signed(&self, hash: B256) -> bool {
        self.state.signed_messages.contains(&hash)
    }

    fn mark_message_signed(&mut self, hash: B256) {
        self.state.signed_messages.insert(hash);
    }
}

/// Monotonically decreasing gas counter, shared by `&self` host calls.
#[derive(Debug)]
struct GasMeter {
    left: Cell<u64>,
}

impl GasMeter {
    fn new(limit: u64) -> Self {
        Self { left: Cell::new(limit) }
    }

    fn left(&self) -> u64 {
        self.left.get()
    }

    fn charge(&self, amount: u64) {
        self.left.set(self.left.get().saturating_sub(amount));
    }
}

/// One top-level call against a `LocalSafe`.
struct Session<'a> {
    safe: &'a mut LocalSafe,
    meter: GasMeter,
    submitter: Address,
}

impl<'a> Session<'a> {
    fn new(safe: &'a mut LocalSafe, submitter: Address, gas_limit: u64) -> Self {
        Self {
            safe,
            meter: GasMeter::new(gas_limit),
            submitter,
        }
    }
}

impl Session<'_> {
    fn external_call(
        &mut self,
        target: Address,
        value: U256,
        payload: &[u8],
        call_type: CallType,
        gas: u64,
    ) -> bool {
        let safe = &mut *self.safe;
        let request = DispatchRequest {
            account: safe.address,
            target,
            value,
            payload,
            call_type,
            gas,
        };
        let result = safe.dispatcher.dispatch(&mut safe.state.ledger, &request);
        self.meter.charge(result.gas_used.min(gas));
        result.success && result.gas_used <= gas
    }

    /// The account calling one of its own entry points, with itself as `msg.sender`.
    fn self_call(&mut self, payload: &[u8], gas: u64) -> bool {
        let account = self.safe.address;
        if let Ok(call) = IRelaySafe::signMessageCall::abi_decode(payload, true) {
            if gas < SIGN_MESSAGE_GAS {
                self.meter.charge(gas);
                return false;
            }
            self.meter.charge(SIGN_MESSAGE_GAS);
            return self.safe.sign_message(account, &call.data).is_ok();
        }
        if let Ok(call) = IRelaySafe::requiredTxGasCall::abi_decode(payload, true) {
            // The probe always reverts; only the gas it burned survives.
            if let Ok(call_type) = CallType::try_from(call.operation) {
                let action = Action::call(call.to, call.value, call.data.to_vec())
                    .with_call_type(call_type);
                let required = estimate_gas(self, account, &action);
                debug!(%account, ?required, "gas probe reverted");
            }
            return false;
        }
        debug!(%account, "self-call without a matching entry point");
        false
    }
}

impl AuthContext for Session<'_> {
    fn account(&self) -> Address {
        self.safe.address
    }

    fn domain_separator(&self) -> B256 {
        AuthContext::domain_separator(&*self.safe)
    }

    fn threshold(&self) -> usize {
        self.safe.threshold
    }

    fn is_owner(&self, candidate: Address) -> bool {
        AuthContext::is_owner(&*self.safe, candidate)
    }

    fn recover_signer(&self, digest: B256, v: u8, r: B256, s: B256) -> Option<Address> {
        self.meter.charge(ECRECOVER_GAS);
        self.safe.recover_signer(digest, v, r, s)
    }

    fn delegate_is_valid(&self, validator: Address, data: &[u8], signature: &[u8]) -> bool {
        self.meter.charge(DELEGATE_CALL_GAS);
        self.safe.delegate_is_valid(validator, data, signature)
    }
}

impl ExecutionHost for Session<'_> {
    fn nonce(&self) -> U256 {
        self.safe.state.nonce
    }

    fn set_nonce(&mut self, nonce: U256) {
        debug!(account = %self.safe.address, %nonce, "nonce advanced");
        self.safe.state.nonce = nonce;
    }

    fn gas_left(&self) -> u64 {
        self.meter.left()
    }

    fn dispatch(
        &mut self,
        target: Address,
        value: U256,
        payload: &[u8],
        call_type: CallType,
        gas: u64,
    ) -> bool {
        let account = self.safe.address;
        let checkpoint = self.safe.state.clone();

        // Delegate calls run in the account's own context and carry no value.
        if call_type == CallType::Call
            && !value.is_zero()
            && !self.safe.state.ledger.transfer_native(account, target, value)
        {
            return false;
        }

        let success = if target == account && call_type == CallType::Call {
            self.self_call(payload, gas)
        } else {
            self.external_call(target, value, payload, call_type, gas)
        };
        if !success {
            self.safe.state = checkpoint;
        }
        success
    }

    fn submitter(&self) -> Address {
        self.submitter
    }

    fn pay_native(&mut self, to: Address, amount: U256) -> bool {
        self.meter.charge(TRANSFER_GAS);
        let from = self.safe.address;
        self.safe.state.ledger.transfer_native(from, to, amount)
    }

    fn transfer_token(&mut self, token: Address, to: Address, amount: U256) -> bool {
        self.meter.charge(TRANSFER_GAS);
        let from = self.safe.address;
        self.safe.state.ledger.transfer_token(token, from, to, amount)
    }

    fn execution_failed(&mut self, fingerprint: B256) {
        warn!(account = %self.safe.address, tx_hash = %fingerprint, "dispatched action failed");
        self.safe.state.events.push(SafeEvent::ExecutionFailed { tx_hash: fingerprint });
    }
}

thread_local! {
    /// Accounts whose lock the current thread holds.
    static HELD: RefCell<BTreeSet<Address>> = const { RefCell::new(BTreeSet::new()) };
}

/// Marks an account as held by this thread until dropped.
struct HeldAccount(Address);

impl HeldAccount {
    fn enter(address: Address) -> Option<Self> {
        HELD.with(|held| held.borrow_mut().insert(address))
            .then(|| HeldAccount(address))
    }
}

impl Drop for HeldAccount {
    fn drop(&mut self) {
        HELD.with(|held| held.borrow_mut().remove(&self.0));
    }
}

/// A `LocalSafe` behind a mutex, for hosts that submit from several threads.
///
/// Authorization, nonce increment, dispatch and payment run under one lock acquisition, so
/// two submissions for the same nonce cannot both verify. Re-entering an account from the
/// thread that already holds it fails with [`SignerError::Reentered`]; as a delegate
/// validator that reads as a rejection.
#[derive(Clone)]
pub struct SharedSafe {
    address: Address,
    inner: Arc<Mutex<LocalSafe>>,
}

impl SharedSafe {
    pub fn new(safe: LocalSafe) -> Self {
        Self {
            address: safe.address(),
            inner: Arc::new(Mutex::new(safe)),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn exec(
        &self,
        submitter: Address,
        gas_limit: u64,
        action: &Action,
        signatures: &[u8],
    ) -> Result<ExecutionReceipt, SignerError> {
        self.with(|safe| safe.exec(submitter, gas_limit, action, signatures))?
    }

    /// Run `f` with exclusive access to the account.
    pub fn with<R>(&self, f: impl FnOnce(&mut LocalSafe) -> R) -> Result<R, SignerError> {
        let _held =
            HeldAccount::enter(self.address).ok_or(SignerError::Reentered(self.address))?;
        let mut guard = self.inner.lock().map_err(|_| SignerError::Poisoned)?;
        Ok(f(&mut guard))
    }
}

impl DelegateValidator for SharedSafe {
    fn is_valid_signature(&self, data: &[u8], signature: &[u8]) -> bool {
        self.with(|safe| safe.is_valid_signature(data, signature))
            .unwrap_or(false)
    }
}
