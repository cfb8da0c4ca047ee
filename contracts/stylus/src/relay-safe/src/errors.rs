//! Revert reasons of the account, ABI-encoded as Solidity custom errors.

use alloy_sol_types::sol;
use stylus_sdk::{alloy_primitives::U256, stylus_proc::SolidityError};

use relay_safe_types::{EstimateError, ExecutionError, RegistryError};

sol! {
    error InvalidSignatures();
    error NotEnoughGas(uint256 required, uint256 available);
    error PaymentOverflow();
    error PaymentFailed(address asset, uint256 amount);
    error SelfCallOnly();
    error InvalidOperation(uint8 operation);
    error AlreadyInitialized();
    error InvalidThreshold(uint256 threshold, uint256 owners);
    error InvalidOwner(address owner);
    error DuplicateOwner(address owner);
    /// Success channel of `requiredTxGas`: always reverted so nothing it did survives.
    error GasEstimate(uint256 requiredGas);
    error EstimateFailed();
}

#[derive(SolidityError)]
pub enum SafeError {
    InvalidSignatures(InvalidSignatures),
    NotEnoughGas(NotEnoughGas),
    PaymentOverflow(PaymentOverflow),
    PaymentFailed(PaymentFailed),
    SelfCallOnly(SelfCallOnly),
    InvalidOperation(InvalidOperation),
    AlreadyInitialized(AlreadyInitialized),
    InvalidThreshold(InvalidThreshold),
    InvalidOwner(InvalidOwner),
    DuplicateOwner(DuplicateOwner),
    GasEstimate(GasEstimate),
    EstimateFailed(EstimateFailed),
}

impl From<ExecutionError> for SafeError {
    fn from(value: ExecutionError) -> Self {
        match value {
            ExecutionError::Unauthorized(_) => SafeError::InvalidSignatures(InvalidSignatures {}),
            ExecutionError::NotEnoughGas { required, available } => {
                SafeError::NotEnoughGas(NotEnoughGas {
                    required,
                    available: U256::from(available),
                })
            }
            ExecutionError::PaymentOverflow => SafeError::PaymentOverflow(PaymentOverflow {}),
            ExecutionError::PaymentFailed { asset, amount } => SafeError::PaymentFailed(PaymentFailed {
                asset: asset.as_address(),
                amount,
            }),
        }
    }
}

impl From<EstimateError> for SafeError {
    fn from(value: EstimateError) -> Self {
        match value {
            EstimateError::SelfCallOnly => SafeError::SelfCallOnly(SelfCallOnly {}),
            EstimateError::ExecutionFailed => SafeError::EstimateFailed(EstimateFailed {}),
        }
    }
}

impl From<RegistryError> for SafeError {
    fn from(value: RegistryError) -> Self {
        match value {
            RegistryError::SelfCallOnly => SafeError::SelfCallOnly(SelfCallOnly {}),
        }
    }
}
