use alloy_primitives::{Address, U256};

use crate::action::RefundAsset;

/// Errors while decoding a packed signature bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureError {
    /// Fewer than `threshold * 65` bytes of static signature data.
    Truncated,
    /// A delegate entry points outside the bundle.
    OffsetOutOfBounds,
}

/// Authorization failures. Any of them rejects the action outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    Malformed(SignatureError),
    /// A delegate authorization contract reported the signature as invalid.
    DelegateRejected { validator: Address },
    /// ECDSA recovery produced no address.
    RecoveryFailed { slot: usize },
    /// Signer is not strictly greater than the previous accepted signer.
    SignerOutOfOrder { signer: Address },
    NotAnOwner { signer: Address },
}

impl From<SignatureError> for AuthError {
    fn from(value: SignatureError) -> Self {
        AuthError::Malformed(value)
    }
}

/// Failures of `exec_and_reimburse`. Each one aborts the whole call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    Unauthorized(AuthError),
    /// Less gas left than the action's budget; nothing was dispatched.
    NotEnoughGas { required: U256, available: u64 },
    /// `(consumed + data_allowance) * gas_price` does not fit a U256.
    PaymentOverflow,
    PaymentFailed { asset: RefundAsset, amount: U256 },
}

impl From<AuthError> for ExecutionError {
    fn from(value: AuthError) -> Self {
        ExecutionError::Unauthorized(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateError {
    SelfCallOnly,
    /// The probed action failed, so there is no meaningful figure to report.
    ExecutionFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    SelfCallOnly,
}
