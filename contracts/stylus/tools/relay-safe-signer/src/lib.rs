//! Off-chain side of relay-safe: owner keys, signature bundles and a local simulator.
//!
//! The simulator runs the same authorization and execution core as the contract, so bundles
//! built here can be checked end to end before anything is submitted.

pub mod bundle;
pub mod error;
pub mod keys;
pub mod ledger;
pub mod local;
pub mod recovery;


pub use bundle::BundleBuilder;
pub use error::SignerError;
pub use keys::{address_of, OwnerKey};
pub use ledger::Ledger;
pub use local::{
    sign_message_calldata, DelegateValidator, Dispatch, DispatchRequest, DispatchResult,
    LocalSafe, SafeEvent, SharedSafe, TransferDispatcher,
};
pub use recovery::{recover_address, OfflineVerifier};
