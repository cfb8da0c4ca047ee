//! In-memory balances for the simulator.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    native: BTreeMap<Address, U256>,
    tokens: BTreeMap<(Address, Address), U256>,
}

impl Ledger {
    pub fn native_balance(&self, holder: Address) -> U256 {
        self.native.get(&holder).copied().unwrap_or_default()
    }

    pub fn token_balance(&self, token: Address, holder: Address) -> U256 {
        self.tokens.get(&(token, holder)).copied().unwrap_or_default()
    }

    /// Refuses (returns `false`) a credit that would overflow the balance.
    pub fn credit_native(&mut self, holder: Address, amount: U256) -> bool {
        let Some(balance) = self.native_balance(holder).checked_add(amount) else {
            return false;
        };
        self.native.insert(holder, balance);
        true
    }

    pub fn credit_token(&mut self, token: Address, holder: Address, amount: U256) -> bool {
        let Some(balance) = self.token_balance(token, holder).checked_add(amount) else {
            return false;
        };
        self.tokens.insert((token, holder), balance);
        true
    }

    /// Moves `amount` or nothing.
    pub fn transfer_native(&mut self, from: Address, to: Address, amount: U256) -> bool {
        if from == to {
            return self.native_balance(from) >= amount;
        }
        let (Some(remaining), Some(credited)) = (
            self.native_balance(from).checked_sub(amount),
            self.native_balance(to).checked_add(amount),
        ) else {
            return false;
        };
        self.native.insert(from, remaining);
        self.native.insert(to, credited);
        true
    }

    pub fn transfer_token(&mut self, token: Address, from: Address, to: Address, amount: U256) -> bool {
        if from == to {
            return self.token_balance(token, from) >= amount;
        }
        let (Some(remaining), Some(credited)) = (
            self.token_balance(token, from).checked_sub(amount),
            self.token_balance(token, to).checked_add(amount),
        ) else {
            return false;
        };
        self.tokens.insert((token, from), remaining);
        self.tokens.insert((token, to), credited);
        true
    }

    pub fn total_native(&self) -> U256 {
        self.native.values().fold(U256::ZERO, |acc, v| acc.saturating_add(*v))
    }

    pub fn total_token(&self, token: Address) -> U256 {
        self.tokens
            .iter()
            .filter(|((t, _), _)| *t == token)
            .fold(U256::ZERO, |acc, (_, v)| acc.saturating_add(*v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overdraft_leaves_balances_untouched() {
        let (a, b) = (Address::repeat_byte(1), Address::repeat_byte(2));
        let mut ledger = Ledger::default();
        ledger.credit_native(a, U256::from(10));

        assert!(!ledger.transfer_native(a, b, U256::from(11)));
        assert_eq!(ledger.native_balance(a), U256::from(10));
        assert_eq!(ledger.native_balance(b), U256::ZERO);

        assert!(ledger.transfer_native(a, b, U256::from(4)));
        assert_eq!(ledger.native_balance(a), U256::from(6));
        assert_eq!(ledger.total_native(), U256::from(10));
    }

    #[test]
    fn tokens_are_tracked_per_contract() {
        let (t1, t2) = (Address::repeat_byte(0xa1), Address::repeat_byte(0xa2));
        let (a, b) = (Address::repeat_byte(1), Address::repeat_byte(2));
        let mut ledger = Ledger::default();
        ledger.credit_token(t1, a, U256::from(5));

        assert!(!ledger.transfer_token(t2, a, b, U256::from(1)));
        assert!(ledger.transfer_token(t1, a, b, U256::from(5)));
        assert_eq!(ledger.token_balance(t1, b), U256::from(5));
        assert_eq!(ledger.total_token(t1), U256::from(5));
        assert_eq!(ledger.total_token(t2), U256::ZERO);
    }

    #[test]
    fn credit_past_the_cap_is_refused() {
        let (a, b) = (Address::repeat_byte(1), Address::repeat_byte(2));
        let mut ledger = Ledger::default();
        assert!(ledger.credit_native(a, U256::MAX));
        assert!(!ledger.credit_native(a, U256::from(1)));
        assert_eq!(ledger.native_balance(a), U256::MAX);

        assert!(ledger.credit_native(b, U256::from(1)));
        assert!(!ledger.transfer_native(b, a, U256::from(1)));
        assert_eq!(ledger.native_balance(b), U256::from(1));
        assert_eq!(ledger.native_balance(a), U256::MAX);
    }

    #[test]
    fn transfer_to_self_keeps_the_balance() {
        let a = Address::repeat_byte(1);
        let mut ledger = Ledger::default();
        ledger.credit_native(a, U256::from(3));
        assert!(ledger.transfer_native(a, a, U256::from(3)));
        assert!(!ledger.transfer_native(a, a, U256::from(4)));
        assert_eq!(ledger.native_balance(a), U256::from(3));
    }
}
