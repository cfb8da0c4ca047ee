use alloc::vec::Vec;

use alloy_primitives::{Address, U256};

/// How the account reaches `target`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum CallType {
    #[default]
    Call = 0,
    DelegateCall = 1,
}

impl TryFrom<u8> for CallType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CallType::Call),
            1 => Ok(CallType::DelegateCall),
            _ => Err(()),
        }
    }
}

/// Asset the submitter is reimbursed in.
///
/// On the wire (hashing and ABI) `Native` is the zero address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RefundAsset {
    #[default]
    Native,
    Token(Address),
}

impl RefundAsset {
    pub fn as_address(&self) -> Address {
        match self {
            RefundAsset::Native => Address::ZERO,
            RefundAsset::Token(token) => *token,
        }
    }
}

impl From<Address> for RefundAsset {
    fn from(value: Address) -> Self {
        if value == Address::ZERO {
            RefundAsset::Native
        } else {
            RefundAsset::Token(value)
        }
    }
}

/// A proposed action awaiting threshold authorization.
///
/// Not persisted; it lives for one verification + execution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Action {
    pub target: Address,
    pub value: U256,
    pub payload: Vec<u8>,
    pub call_type: CallType,
    /// Gas the dispatched call may consume (`safeTxGas`).
    pub gas_budget: U256,
    /// Flat gas added to the measured consumption when reimbursing (`dataGas`).
    pub data_allowance: U256,
    /// Zero disables reimbursement.
    pub gas_price: U256,
    pub refund_asset: RefundAsset,
}

impl Action {
    /// Plain call with no gas budget and no reimbursement.
    pub fn call(target: Address, value: U256, payload: Vec<u8>) -> Self {
        Self {
            target,
            value,
            payload,
            ..Self::default()
        }
    }

    pub fn with_call_type(mut self, call_type: CallType) -> Self {
        self.call_type = call_type;
        self
    }

    pub fn with_refund(
        mut self,
        gas_budget: U256,
        data_allowance: U256,
        gas_price: U256,
        refund_asset: RefundAsset,
    ) -> Self {
        self.gas_budget = gas_budget;
        self.data_allowance = data_allowance;
        self.gas_price = gas_price;
        self.refund_asset = refund_asset;
        self
    }

    /// `gas_budget == 0 && gas_price == 0` forwards everything that is left.
    pub fn forwards_all_gas(&self) -> bool {
        self.gas_budget.is_zero() && self.gas_price.is_zero()
    }

    pub fn is_reimbursed(&self) -> bool {
        !self.gas_price.is_zero()
    }
}
