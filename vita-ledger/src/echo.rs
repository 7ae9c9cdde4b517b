//! Per-mint echo records and the yield they attract.
//!
//! Anyone may send VITA yield to an echo. The amount is debited from the
//! sender and escrowed in the ledger identity's balance. The worker's
//! basis-point share accrues to their pending balance and is paid out of
//! escrow on claim; the rest stays escrowed as the holder pool.

use serde::{Deserialize, Serialize};
use tracing::info;
use vita_common::{bps_share, Address, Caller, Timestamp};

use crate::{LedgerError, MintingLedger};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EchoRecord {
    pub id: u64,
    pub worker: Address,
    #[serde(with = "vita_common::u128_string")]
    pub token_value: u128,
    pub pledged_hours: u64,
    pub skill_category: u8,
    pub vitality_score: u16,
    pub minted_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldDistribution {
    pub echo_id: u64,
    pub worker: Address,
    pub from: Address,
    #[serde(with = "vita_common::u128_string")]
    pub worker_share: u128,
    #[serde(with = "vita_common::u128_string")]
    pub holder_share: u128,
}

impl MintingLedger {
    pub fn echo(&self, echo_id: u64) -> Option<&EchoRecord> {
        usize::try_from(echo_id).ok().and_then(|i| self.echoes.get(i))
    }

    pub fn echo_count(&self) -> u64 {
        self.echoes.len() as u64
    }

    pub fn echoes_of<'a>(&'a self, worker: &'a Address) -> impl Iterator<Item = &'a EchoRecord> {
        self.echoes.iter().filter(move |e| e.worker == *worker)
    }

    pub fn distribute_yield(
        &mut self,
        caller: &Caller,
        echo_id: u64,
        amount: u128,
    ) -> Result<YieldDistribution, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let from = caller.address();
        let escrow = self.identity();
        if from == escrow {
            return Err(LedgerError::ReservedAccount(from));
        }
        let worker = self
            .echo(echo_id)
            .map(|e| e.worker)
            .ok_or(LedgerError::UnknownEcho(echo_id))?;

        let worker_share = bps_share(amount, self.worker_yield_bps);
        let holder_share = amount - worker_share;
        let pending = self
            .pending_worker_yield(&worker)
            .checked_add(worker_share)
            .ok_or(LedgerError::Overflow("pending worker yield"))?;
        let pool = self
            .holder_yield_pool
            .checked_add(holder_share)
            .ok_or(LedgerError::Overflow("holder yield pool"))?;

        self.move_balance(from, escrow, amount)?;
        self.pending_worker_yield.insert(worker, pending);
        self.holder_yield_pool = pool;

        info!(echo_id, worker = %worker, worker_share, holder_share, "echo yield distributed");
        Ok(YieldDistribution {
            echo_id,
            worker,
            from,
            worker_share,
            holder_share,
        })
    }

    /// Pay the caller's pending echo yield out of escrow.
    pub fn claim_worker_yield(&mut self, caller: &Caller) -> Result<u128, LedgerError> {
        let worker = caller.address();
        let amount = self.pending_worker_yield(&worker);
        if amount == 0 {
            return Err(LedgerError::NoPendingYield(worker));
        }
        self.move_balance(self.identity(), worker, amount)?;
        self.pending_worker_yield.remove(&worker);
        info!(worker = %worker, amount, "worker echo yield claimed");
        Ok(amount)
    }

    pub fn pending_worker_yield(&self, worker: &Address) -> u128 {
        self.pending_worker_yield.get(worker).copied().unwrap_or(0)
    }

    pub fn holder_yield_pool(&self) -> u128 {
        self.holder_yield_pool
    }
}
