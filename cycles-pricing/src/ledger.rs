use std::collections::HashMap;

use candid::{CandidType, Deserialize, Nat, Principal};
use thiserror::Error;

use crate::types::{AccountBalance, IcpE8s};

/// Error while trying to change an account balance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("balance of {available} e8s is less than the requested debit of {required} e8s")]
    InsufficientFunds {
        required: IcpE8s,
        available: IcpE8s,
    },

    #[error("unrecoverable error: {0}")]
    Fatal(String),
}

/// Interface for the storage of ICP payments and purchased cycles.
///
/// Implementations must leave the balance untouched when an operation returns an error.
pub trait Ledger {
    /// Decrease the `owner`'s ICP balance by `amount`. Returns the new balance.
    fn debit_icp(&mut self, owner: Principal, amount: IcpE8s) -> Result<IcpE8s, LedgerError>;

    /// Increase the `owner`'s ICP balance by `amount`. Returns the new balance.
    fn credit_icp(&mut self, owner: Principal, amount: IcpE8s) -> Result<IcpE8s, LedgerError>;

    /// Increase the `owner`'s cycles balance by `amount`. Returns the new balance.
    fn credit_cycles(&mut self, owner: Principal, amount: &Nat) -> Result<Nat, LedgerError>;
}

/// Ledger kept in the canister memory.
#[derive(CandidType, Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AccountLedger {
    accounts: HashMap<Principal, AccountBalance>,
}

impl AccountLedger {
    pub fn balance_of(&self, owner: &Principal) -> AccountBalance {
        self.accounts.get(owner).cloned().unwrap_or_default()
    }

    pub fn accounts_count(&self) -> usize {
        self.accounts.len()
    }
}

impl Ledger for AccountLedger {
    fn debit_icp(&mut self, owner: Principal, amount: IcpE8s) -> Result<IcpE8s, LedgerError> {
        let available = self
            .accounts
            .get(&owner)
            .map(|balance| balance.icp_e8s)
            .unwrap_or_default();

        let remaining =
            available
                .checked_sub(amount)
                .ok_or(LedgerError::InsufficientFunds {
                    required: amount,
                    available,
                })?;

        if let Some(balance) = self.accounts.get_mut(&owner) {
            balance.icp_e8s = remaining;
        }

        Ok(remaining)
    }

    fn credit_icp(&mut self, owner: Principal, amount: IcpE8s) -> Result<IcpE8s, LedgerError> {
        let entry = self.accounts.entry(owner).or_default();
        entry.icp_e8s = entry
            .icp_e8s
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Fatal(format!("ICP balance of {owner} overflows")))?;
        Ok(entry.icp_e8s)
    }

    fn credit_cycles(&mut self, owner: Principal, amount: &Nat) -> Result<Nat, LedgerError> {
        let entry = self.accounts.entry(owner).or_default();
        entry.cycles = Nat(&entry.cycles.0 + &amount.0);
        Ok(entry.cycles.clone())
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;

    use super::*;

    fn alice() -> Principal {
        Principal::from_slice(&[1; 29])
    }

    fn bob() -> Principal {
        Principal::from_slice(&[2; 29])
    }

    #[test]
    fn unknown_account_has_zero_balance() {
        let ledger = AccountLedger::default();
        assert_eq!(ledger.balance_of(&alice()), AccountBalance::default());
    }

    #[test]
    fn credit_and_debit_icp() {
        let mut ledger = AccountLedger::default();
        assert_eq!(ledger.credit_icp(alice(), 1_000), Ok(1_000));
        assert_eq!(ledger.credit_icp(alice(), 500), Ok(1_500));
        assert_eq!(ledger.debit_icp(alice(), 1_200), Ok(300));
        assert_eq!(ledger.balance_of(&alice()).icp_e8s, 300);
        assert_eq!(ledger.balance_of(&bob()).icp_e8s, 0);
    }

    #[test]
    fn debit_over_balance_fails_without_changes() {
        let mut ledger = AccountLedger::default();
        ledger.credit_icp(alice(), 100).unwrap();
        let before = ledger.clone();

        assert_eq!(
            ledger.debit_icp(alice(), 101),
            Err(LedgerError::InsufficientFunds {
                required: 101,
                available: 100
            })
        );
        assert_eq!(
            ledger.debit_icp(bob(), 1),
            Err(LedgerError::InsufficientFunds {
                required: 1,
                available: 0
            })
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn icp_overflow_is_fatal() {
        let mut ledger = AccountLedger::default();
        ledger.credit_icp(alice(), u64::MAX).unwrap();
        assert!(matches!(
            ledger.credit_icp(alice(), 1),
            Err(LedgerError::Fatal(_))
        ));
        assert_eq!(ledger.balance_of(&alice()).icp_e8s, u64::MAX);
    }

    #[test]
    fn cycles_accumulate() {
        let mut ledger = AccountLedger::default();
        ledger.credit_cycles(alice(), &Nat::from(u128::MAX)).unwrap();
        let total = ledger.credit_cycles(alice(), &Nat::from(1u64)).unwrap();
        assert_eq!(total, Nat(BigUint::from(u128::MAX) + 1u32));
        assert_eq!(ledger.accounts_count(), 1);
    }
}
