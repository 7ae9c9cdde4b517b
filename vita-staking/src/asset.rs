//! Yield-bearing wrapped collateral.

use std::sync::{Arc, RwLock};

use tracing::info;
use vita_common::{mul_div, BPS_DENOMINATOR, PRECISION};

use crate::StakingError;

/// Collateral source that wraps deposits into an appreciating unit.
///
/// The pool treats `current_rate` as read-only; rate increases are the only
/// yield signal.
pub trait WrappedAsset: Send + Sync {
    /// Wrap `underlying`, returning the wrapped units minted at the current rate.
    fn deposit(&mut self, underlying: u128) -> Result<u128, StakingError>;

    /// Unwrap `wrapped` units, returning the underlying paid out.
    fn withdraw(&mut self, wrapped: u128) -> Result<u128, StakingError>;

    /// Underlying per wrapped unit, 18-decimal fixed point.
    fn current_rate(&self) -> u128;
}

#[derive(Debug)]
struct SimulatedState {
    rate: u128,
    total_wrapped: u128,
}

/// In-memory liquid-staking token starting at 1:1.
///
/// Clones share state, so a harness can keep a handle and raise the rate with
/// [`simulate_yield`](Self::simulate_yield) while the pool owns another.
#[derive(Debug, Clone)]
pub struct SimulatedWrappedAsset {
    state: Arc<RwLock<SimulatedState>>,
}

impl Default for SimulatedWrappedAsset {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedWrappedAsset {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(SimulatedState {
                rate: PRECISION,
                total_wrapped: 0,
            })),
        }
    }

    /// Raise the exchange rate by `bps` basis points. Returns the new rate.
    pub fn simulate_yield(&self, bps: u16) -> Result<u128, StakingError> {
        let mut state = self.write()?;
        let rate = mul_div(
            state.rate,
            BPS_DENOMINATOR + u128::from(bps),
            BPS_DENOMINATOR,
        )
        .ok_or(StakingError::Overflow("exchange rate"))?;
        info!(previous = state.rate, rate, bps, "simulated yield applied");
        state.rate = rate;
        Ok(rate)
    }

    pub fn total_wrapped(&self) -> u128 {
        self.state.read().map(|s| s.total_wrapped).unwrap_or(0)
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, SimulatedState>, StakingError> {
        self.state
            .write()
            .map_err(|_| StakingError::Asset("simulated asset state poisoned".into()))
    }
}

impl WrappedAsset for SimulatedWrappedAsset {
    fn deposit(&mut self, underlying: u128) -> Result<u128, StakingError> {
        if underlying == 0 {
            return Err(StakingError::ZeroAmount);
        }
        let mut state = self.write()?;
        let wrapped = mul_div(underlying, PRECISION, state.rate)
            .ok_or(StakingError::Overflow("wrap"))?;
        state.total_wrapped = state
            .total_wrapped
            .checked_add(wrapped)
            .ok_or(StakingError::Overflow("wrapped supply"))?;
        Ok(wrapped)
    }

    fn withdraw(&mut self, wrapped: u128) -> Result<u128, StakingError> {
        let mut state = self.write()?;
        if wrapped > state.total_wrapped {
            return Err(StakingError::InsufficientWrapped {
                requested: wrapped,
                outstanding: state.total_wrapped,
            });
        }
        let underlying = mul_div(wrapped, state.rate, PRECISION)
            .ok_or(StakingError::Overflow("unwrap"))?;
        state.total_wrapped -= wrapped;
        Ok(underlying)
    }

    fn current_rate(&self) -> u128 {
        self.state.read().map(|s| s.rate).unwrap_or(PRECISION)
    }
}
