//! vita-staking
//!
//! Collateral attached to a mint is wrapped into a yield-bearing unit at the
//! current exchange rate (`wrapped = deposit / rate`). The rate only rises,
//! so a position's underlying value (`wrapped × rate`) grows above its
//! principal; claiming realizes that growth and splits it between the
//! worker, token holders and the protocol treasury.

use serde::{Deserialize, Serialize};
use vita_common::{bps_share, YieldSplit};

pub mod asset;
pub mod error;
pub mod pool;

pub use asset::{SimulatedWrappedAsset, WrappedAsset};
pub use error::StakingError;
pub use pool::{
    StakeCreditor, StakePosition, StakeReceipt, StakeView, StakingPool, UnstakeReceipt, YieldClaim,
};

/// One realized yield amount divided by a [`YieldSplit`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldShares {
    #[serde(with = "vita_common::u128_string")]
    pub worker: u128,
    #[serde(with = "vita_common::u128_string")]
    pub holders: u128,
    #[serde(with = "vita_common::u128_string")]
    pub protocol: u128,
}

impl YieldShares {
    pub fn total(&self) -> u128 {
        self.worker + self.holders + self.protocol
    }
}

/// Worker and protocol shares round down; holders take the remainder so the
/// shares always sum to `amount`.
pub fn split_yield(amount: u128, split: &YieldSplit) -> YieldShares {
    let worker = bps_share(amount, split.worker_bps);
    let protocol = bps_share(amount, split.protocol_bps);
    YieldShares {
        worker,
        holders: amount - worker - protocol,
        protocol,
    }
}
