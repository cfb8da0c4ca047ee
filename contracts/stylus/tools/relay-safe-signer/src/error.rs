use alloy_primitives::Address;
use relay_safe_types::{EstimateError, ExecutionError, RegistryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignerError {
    #[error("invalid secret key")]
    InvalidKey,
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("signing failed: {0}")]
    Signing(#[from] k256::ecdsa::Error),
    #[error("{0} already contributed a signature")]
    DuplicateSigner(Address),
    #[error("account is already set up")]
    AlreadyInitialized,
    #[error("threshold {threshold} is invalid for {owners} owners")]
    InvalidThreshold { threshold: usize, owners: usize },
    #[error("invalid owner {0}")]
    InvalidOwner(Address),
    #[error("duplicate owner {0}")]
    DuplicateOwner(Address),
    #[error("an account cannot validate for itself")]
    SelfValidator,
    #[error("execution rejected: {0:?}")]
    Execution(ExecutionError),
    #[error("estimate failed: {0:?}")]
    Estimate(EstimateError),
    #[error("message registry: {0:?}")]
    Registry(RegistryError),
    #[error("{0} is already executing on this thread")]
    Reentered(Address),
    #[error("account lock poisoned")]
    Poisoned,
}

impl From<ExecutionError> for SignerError {
    fn from(value: ExecutionError) -> Self {
        SignerError::Execution(value)
    }
}

impl From<EstimateError> for SignerError {
    fn from(value: EstimateError) -> Self {
        SignerError::Estimate(value)
    }
}

impl From<RegistryError> for SignerError {
    fn from(value: RegistryError) -> Self {
        SignerError::Registry(value)
    }
}
