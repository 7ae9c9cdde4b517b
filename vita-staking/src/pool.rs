//! Worker stake positions over a wrapped collateral asset.

use std::collections::HashMap;

use serde::Serialize;
use tracing::info;
use vita_common::{mul_div, Address, Caller, Role, Timestamp, YieldSplit, PRECISION};

use crate::{split_yield, StakingError, WrappedAsset, YieldShares};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StakePosition {
    /// Underlying-value baseline; yield is measured above it.
    #[serde(with = "vita_common::u128_string")]
    pub principal: u128,
    #[serde(with = "vita_common::u128_string")]
    pub wrapped_balance: u128,
    /// Raw deposits, for total-staked accounting.
    #[serde(with = "vita_common::u128_string")]
    pub deposited: u128,
    pub staked_at: Timestamp,
    pub last_claim_at: Option<Timestamp>,
    pub active: bool,
}

/// `getWorkerStake` view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StakeView {
    #[serde(with = "vita_common::u128_string")]
    pub principal: u128,
    #[serde(with = "vita_common::u128_string")]
    pub wrapped_balance: u128,
    #[serde(with = "vita_common::u128_string")]
    pub current_value: u128,
    #[serde(with = "vita_common::u128_string")]
    pub accrued_yield: u128,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StakeReceipt {
    pub worker: Address,
    #[serde(with = "vita_common::u128_string")]
    pub deposited: u128,
    #[serde(with = "vita_common::u128_string")]
    pub wrapped_minted: u128,
    #[serde(with = "vita_common::u128_string")]
    pub rate: u128,
    #[serde(with = "vita_common::u128_string")]
    pub principal_after: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YieldClaim {
    pub worker: Address,
    /// Underlying actually withdrawn; equals `shares.total()`.
    #[serde(with = "vita_common::u128_string")]
    pub realized: u128,
    #[serde(with = "vita_common::u128_string")]
    pub wrapped_burned: u128,
    pub shares: YieldShares,
    #[serde(with = "vita_common::u128_string")]
    pub rate: u128,
    #[serde(with = "vita_common::u128_string")]
    pub principal_after: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnstakeReceipt {
    pub worker: Address,
    #[serde(with = "vita_common::u128_string")]
    pub principal_returned: u128,
    #[serde(with = "vita_common::u128_string")]
    pub wrapped_burned: u128,
    /// Yield realized by the final withdrawal, split like a claim.
    pub shares: YieldShares,
}

/// Narrow entry point the minting ledger uses to forward collateral.
pub trait StakeCreditor {
    fn credit_stake(
        &mut self,
        caller: &Caller,
        worker: Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<StakeReceipt, StakingError>;
}

#[derive(Debug)]
pub struct StakingPool<A: WrappedAsset> {
    asset: A,
    split: YieldSplit,
    positions: HashMap<Address, StakePosition>,
    total_staked: u128,
    treasury: u128,
    holder_pool: u128,
    paid_to_workers: u128,
}

impl<A: WrappedAsset> StakingPool<A> {
    pub fn new(asset: A, split: YieldSplit) -> Self {
        Self {
            asset,
            split,
            positions: HashMap::new(),
            total_staked: 0,
            treasury: 0,
            holder_pool: 0,
            paid_to_workers: 0,
        }
    }

    /// Credit `amount` of collateral to `worker`. Restricted to
    /// [`Role::StakeCreditor`].
    ///
    /// An active position is topped up: its principal becomes its current
    /// value plus the deposit.
    pub fn stake_for_worker(
        &mut self,
        caller: &Caller,
        worker: Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<StakeReceipt, StakingError> {
        caller.require(Role::StakeCreditor)?;
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }

        let rate = self.asset.current_rate();
        let existing = self.positions.get(&worker).filter(|p| p.active);
        let (carried_value, carried_wrapped, carried_deposit, staked_at) = match existing {
            Some(position) => (
                value_of(position.wrapped_balance, rate)?,
                position.wrapped_balance,
                position.deposited,
                position.staked_at,
            ),
            None => (0, 0, 0, now),
        };
        let principal_after = carried_value
            .checked_add(amount)
            .ok_or(StakingError::Overflow("principal"))?;
        let deposited = carried_deposit
            .checked_add(amount)
            .ok_or(StakingError::Overflow("deposited"))?;
        let total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(StakingError::Overflow("total staked"))?;

        let wrapped_minted = self.asset.deposit(amount)?;
        let wrapped_balance = carried_wrapped
            .checked_add(wrapped_minted)
            .ok_or(StakingError::Overflow("wrapped balance"))?;

        let position = self.positions.entry(worker).or_default();
        position.principal = principal_after;
        position.wrapped_balance = wrapped_balance;
        position.deposited = deposited;
        position.staked_at = staked_at;
        position.active = true;
        self.total_staked = total_staked;

        info!(worker = %worker, amount, wrapped_minted, rate, "stake credited");
        Ok(StakeReceipt {
            worker,
            deposited: amount,
            wrapped_minted,
            rate,
            principal_after,
        })
    }

    /// Realize accrued yield, split it, and reset the principal baseline.
    pub fn claim_yield(
        &mut self,
        caller: &Caller,
        worker: Address,
        now: Timestamp,
    ) -> Result<YieldClaim, StakingError> {
        require_owner(caller, worker)?;
        let position = self.active_position(worker)?.clone();
        let rate = self.asset.current_rate();

        let accrued = value_of(position.wrapped_balance, rate)?.saturating_sub(position.principal);
        let wrapped_burned = mul_div(accrued, PRECISION, rate).unwrap_or(0);
        if wrapped_burned == 0 {
            return Err(StakingError::NoYield(worker));
        }

        let realized = self.asset.withdraw(wrapped_burned)?;
        let shares = split_yield(realized, &self.split);

        let remaining = position.wrapped_balance - wrapped_burned;
        let principal_after = value_of(remaining, rate)?;
        if let Some(p) = self.positions.get_mut(&worker) {
            p.wrapped_balance = remaining;
            p.principal = principal_after;
            p.last_claim_at = Some(now);
        }
        self.book_shares(&shares);

        info!(
            worker = %worker,
            realized,
            worker_share = shares.worker,
            holder_share = shares.holders,
            protocol_share = shares.protocol,
            "yield claimed"
        );
        Ok(YieldClaim {
            worker,
            realized,
            wrapped_burned,
            shares,
            rate,
            principal_after,
        })
    }

    /// Withdraw the whole position in one unwrap, splitting any yield above
    /// the principal and returning the rest to the worker.
    pub fn unstake(
        &mut self,
        caller: &Caller,
        worker: Address,
        now: Timestamp,
    ) -> Result<UnstakeReceipt, StakingError> {
        require_owner(caller, worker)?;
        let position = self.active_position(worker)?.clone();
        let rate = self.asset.current_rate();
        let accrued = value_of(position.wrapped_balance, rate)?.saturating_sub(position.principal);

        let withdrawn = if position.wrapped_balance == 0 {
            0
        } else {
            self.asset.withdraw(position.wrapped_balance)?
        };
        let yield_part = accrued.min(withdrawn);
        let shares = split_yield(yield_part, &self.split);
        let principal_returned = withdrawn - yield_part;

        self.total_staked = self.total_staked.saturating_sub(position.deposited);
        if let Some(p) = self.positions.get_mut(&worker) {
            *p = StakePosition {
                staked_at: p.staked_at,
                last_claim_at: Some(now),
                ..StakePosition::default()
            };
        }
        self.book_shares(&shares);

        info!(worker = %worker, principal_returned, yield_part, "stake withdrawn");
        Ok(UnstakeReceipt {
            worker,
            principal_returned,
            wrapped_burned: position.wrapped_balance,
            shares,
        })
    }

    // === Views ===

    pub fn position(&self, worker: &Address) -> Option<&StakePosition> {
        self.positions.get(worker)
    }

    pub fn worker_stake(&self, worker: &Address) -> Option<StakeView> {
        let position = self.positions.get(worker)?;
        let current_value = self.worker_value(worker);
        Some(StakeView {
            principal: position.principal,
            wrapped_balance: position.wrapped_balance,
            current_value,
            accrued_yield: current_value.saturating_sub(position.principal),
            active: position.active,
        })
    }

    /// Underlying value of the worker's wrapped balance at the current rate.
    pub fn worker_value(&self, worker: &Address) -> u128 {
        self.positions
            .get(worker)
            .and_then(|p| mul_div(p.wrapped_balance, self.asset.current_rate(), PRECISION))
            .unwrap_or(0)
    }

    /// Accrued yield above the principal baseline.
    pub fn pending_yield(&self, worker: &Address) -> u128 {
        match self.positions.get(worker) {
            Some(p) if p.active => self.worker_value(worker).saturating_sub(p.principal),
            _ => 0,
        }
    }

    /// How `pending_yield` would split if claimed now.
    pub fn pending_shares(&self, worker: &Address) -> YieldShares {
        split_yield(self.pending_yield(worker), &self.split)
    }

    pub fn total_staked(&self) -> u128 {
        self.total_staked
    }

    pub fn current_rate(&self) -> u128 {
        self.asset.current_rate()
    }

    pub fn treasury_balance(&self) -> u128 {
        self.treasury
    }

    pub fn holder_pool_balance(&self) -> u128 {
        self.holder_pool
    }

    pub fn paid_to_workers(&self) -> u128 {
        self.paid_to_workers
    }

    pub fn split(&self) -> &YieldSplit {
        &self.split
    }

    pub fn asset(&self) -> &A {
        &self.asset
    }

    // === Internals ===

    fn active_position(&self, worker: Address) -> Result<&StakePosition, StakingError> {
        self.positions
            .get(&worker)
            .filter(|p| p.active)
            .ok_or(StakingError::NoActivePosition(worker))
    }

    fn book_shares(&mut self, shares: &YieldShares) {
        self.treasury = self.treasury.saturating_add(shares.protocol);
        self.holder_pool = self.holder_pool.saturating_add(shares.holders);
        self.paid_to_workers = self.paid_to_workers.saturating_add(shares.worker);
    }
}

impl<A: WrappedAsset> StakeCreditor for StakingPool<A> {
    fn credit_stake(
        &mut self,
        caller: &Caller,
        worker: Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<StakeReceipt, StakingError> {
        self.stake_for_worker(caller, worker, amount, now)
    }
}

fn value_of(wrapped: u128, rate: u128) -> Result<u128, StakingError> {
    mul_div(wrapped, rate, PRECISION).ok_or(StakingError::Overflow("position value"))
}

fn require_owner(caller: &Caller, worker: Address) -> Result<(), StakingError> {
    if caller.address() != worker {
        return Err(StakingError::NotPositionOwner {
            caller: caller.address(),
            worker,
        });
    }
    Ok(())
}
