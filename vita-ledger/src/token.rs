//! Balances, allowances and transfers.

use tracing::debug;
use vita_common::{Address, Caller};

use crate::{LedgerError, MintingLedger};

impl MintingLedger {
    pub fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn transfer(
        &mut self,
        caller: &Caller,
        to: Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let from = caller.address();
        self.check_unreserved(from, to)?;
        self.move_balance(from, to, amount)
    }

    /// Set (not add to) the caller's allowance for `spender`.
    pub fn approve(&mut self, caller: &Caller, spender: Address, amount: u128) {
        self.allowances.insert((caller.address(), spender), amount);
        debug!(owner = %caller.address(), spender = %spender, amount, "approval");
    }

    pub fn transfer_from(
        &mut self,
        caller: &Caller,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        self.check_unreserved(from, to)?;
        let spender = caller.address();
        let allowance = self.allowance(&from, &spender);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: from,
                spender,
                allowance,
                needed: amount,
            });
        }
        self.move_balance(from, to, amount)?;
        if allowance != u128::MAX {
            self.allowances.insert((from, spender), allowance - amount);
        }
        Ok(())
    }

    /// `total_supply == Σ balances`.
    pub fn supply_is_consistent(&self) -> bool {
        self.balances
            .values()
            .try_fold(0u128, |acc, b| acc.checked_add(*b))
            .map(|sum| sum == self.total_supply)
            .unwrap_or(false)
    }

    /// The ledger identity's balance escrows echo yield and only moves through
    /// [`distribute_yield`](Self::distribute_yield) and
    /// [`claim_worker_yield`](Self::claim_worker_yield).
    fn check_unreserved(&self, from: Address, to: Address) -> Result<(), LedgerError> {
        match [from, to].into_iter().find(|a| *a == self.identity()) {
            Some(reserved) => Err(LedgerError::ReservedAccount(reserved)),
            None => Ok(()),
        }
    }

    pub(crate) fn move_balance(&mut self, from: Address, to: Address, amount: u128) -> Result<(), LedgerError> {
        if to.is_zero() {
            return Err(LedgerError::ZeroRecipient);
        }
        let balance = self.balance_of(&from);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance {
                account: from,
                balance,
                needed: amount,
            });
        }
        if from != to {
            let credited = self
                .balance_of(&to)
                .checked_add(amount)
                .ok_or(LedgerError::Overflow("recipient balance"))?;
            self.balances.insert(from, balance - amount);
            self.balances.insert(to, credited);
        }
        debug!(from = %from, to = %to, amount, "transfer");
        Ok(())
    }
}
