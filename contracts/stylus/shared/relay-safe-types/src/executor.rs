//! Relayer-reimbursed execution and the gas estimation probe.

use alloy_primitives::{keccak256, Address, B256, U256};

use crate::{
    action::{Action, RefundAsset},
    errors::{EstimateError, ExecutionError},
    hashing::encode_action_data,
    host::ExecutionHost,
    verifier::check_signatures,
};

/// Outcome of an authorized execution attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionReceipt {
    pub fingerprint: B256,
    /// Nonce the action was authorized under.
    pub nonce: U256,
    /// Whether the dispatched action itself succeeded.
    pub success: bool,
    /// Amount paid to the submitter, zero when `gas_price == 0`.
    pub payment: U256,
}

/// Authorize `action` under the current nonce, consume the nonce, dispatch, then reimburse
/// the submitter.
///
/// A failed dispatch is not an error: it is reported through `execution_failed` and the
/// submitter is still paid. Every `Err` is meant to abort the whole call, nonce and
/// dispatched effects included; the host is responsible for that rollback.
pub fn exec_and_reimburse<H: ExecutionHost + ?Sized>(
    host: &mut H,
    action: &Action,
    signatures: &[u8],
) -> Result<ExecutionReceipt, ExecutionError> {
    let start_gas = host.gas_left();

    let nonce = host.nonce();
    let encoded = encode_action_data(host.domain_separator(), action, nonce);
    let fingerprint = keccak256(&encoded);
    check_signatures(&*host, fingerprint, &encoded, signatures)?;

    // Consumed even if the dispatched action fails.
    host.set_nonce(nonce.saturating_add(U256::from(1u64)));

    let available = host.gas_left();
    if U256::from(available) < action.gas_budget {
        return Err(ExecutionError::NotEnoughGas {
            required: action.gas_budget,
            available,
        });
    }
    let gas = if action.forwards_all_gas() {
        available
    } else {
        action.gas_budget.to::<u64>()
    };

    let success = host.dispatch(
        action.target,
        action.value,
        &action.payload,
        action.call_type,
        gas,
    );
    if !success {
        host.execution_failed(fingerprint);
    }

    let payment = if action.is_reimbursed() {
        reimburse(host, action, start_gas)?
    } else {
        U256::ZERO
    };

    Ok(ExecutionReceipt {
        fingerprint,
        nonce,
        success,
        payment,
    })
}

fn reimburse<H: ExecutionHost + ?Sized>(
    host: &mut H,
    action: &Action,
    start_gas: u64,
) -> Result<U256, ExecutionError> {
    let consumed = U256::from(start_gas.saturating_sub(host.gas_left()));
    let amount = consumed
        .checked_add(action.data_allowance)
        .and_then(|gas| gas.checked_mul(action.gas_price))
        .ok_or(ExecutionError::PaymentOverflow)?;

    let receiver = host.submitter();
    let paid = match action.refund_asset {
        RefundAsset::Native => host.pay_native(receiver, amount),
        RefundAsset::Token(token) => host.transfer_token(token, receiver, amount),
    };
    if !paid {
        return Err(ExecutionError::PaymentFailed {
            asset: action.refund_asset,
            amount,
        });
    }
    Ok(amount)
}

/// Dispatch `action` with all remaining gas and report what it consumed.
///
/// Diagnostic only: on-chain callers must discard every effect of the dispatch.
pub fn estimate_gas<H: ExecutionHost + ?Sized>(
    host: &mut H,
    caller: Address,
    action: &Action,
) -> Result<u64, EstimateError> {
    if caller != host.account() {
        return Err(EstimateError::SelfCallOnly);
    }
    let start_gas = host.gas_left();
    let success = host.dispatch(
        action.target,
        action.value,
        &action.payload,
        action.call_type,
        start_gas,
    );
    if !success {
        return Err(EstimateError::ExecutionFailed);
    }
    Ok(start_gas.saturating_sub(host.gas_left()))
}
