//! Solidity ABI interfaces this account consumes and the events it emits.

use stylus_sdk::alloy_sol_types::sol;

sol! {
    /// Delegate authorization capability. Also implemented by `RelaySafe` itself, so
    /// accounts can authorize for each other.
    interface ISignatureValidator {
        function isValidSignature(bytes data, bytes signature) external view returns (bool isValid);
    }

    /// Minimal ERC-20 surface used to pay reimbursement in a token.
    interface IERC20 {
        function transfer(address to, uint256 value) external returns (bool);
    }

    /// A threshold-authorized action was dispatched and failed; the submitter was still paid.
    event ExecutionFailed(bytes32 txHash);

    event SafeSetup(address[] owners, uint256 threshold);

    event MessageSigned(bytes32 indexed messageHash);
}
