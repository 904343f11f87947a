//! # Decay Schedule
//!
//! Maps a mirror slot index to the reward paid for it. Earlier mirrors earn
//! more than later ones.
//!
//! ## Exponential decay
//!
//! ```text
//! reward(0) = ⌊total / limit⌋
//! reward(k) = max(⌊reward(k-1) · ρ⌋, 1)  ρ = retention_bps / 10_000
//!
//! total = 10_000, limit = 100, ρ = 0.95:
//!   slot:    0    1    2    3    4   ...  44  45  ...  99
//!   reward: 100   95   90   85   80  ...   1   1  ...   1
//! ```
//!
//! Every slot pays at least one unit and at most the per-slot average, so the
//! whole schedule sums to at most `total`. The sequence is strictly decreasing
//! until it reaches the one-unit floor. Pools smaller than `limit` cannot fund
//! every slot and pay nothing.

use lens_core::prelude::*;
use lens_core::BPS_DENOMINATOR;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default retention ratio: each slot keeps 95% of the previous reward
pub const DEFAULT_RETENTION_BPS: u32 = 9_500;

/// Strategy computing per-slot rewards
pub trait DecaySchedule: Send + Sync + fmt::Debug {
    /// Reward owed for 0-indexed `slot` of a pool of `total` split over `limit` mirrors.
    /// Zero for slots at or past `limit`, and when `total < limit`.
    fn reward_for_slot(&self, total: Amount, limit: u64, slot: u64) -> Amount;

    /// Full per-slot table
    fn preview(&self, total: Amount, limit: u64) -> Vec<Amount> {
        (0..limit)
            .map(|slot| self.reward_for_slot(total, limit, slot))
            .collect()
    }
}

/// Geometric decay with a fixed retention ratio per slot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExponentialDecay {
    retention_bps: u32,
}

impl Default for ExponentialDecay {
    fn default() -> Self {
        Self {
            retention_bps: DEFAULT_RETENTION_BPS,
        }
    }
}

impl ExponentialDecay {
    /// `retention_bps` must lie strictly between 0 and 10_000
    pub fn new(retention_bps: u32) -> Result<Self> {
        if retention_bps == 0 || retention_bps >= BPS_DENOMINATOR {
            return Err(ModuleError::InvalidConfiguration(format!(
                "retention must be between 1 and {} bps, got {}",
                BPS_DENOMINATOR - 1,
                retention_bps
            )));
        }
        Ok(Self { retention_bps })
    }

    pub fn retention_bps(&self) -> u32 {
        self.retention_bps
    }

    /// ⌊amount · retention_bps / 10_000⌋ without intermediate overflow
    fn retain(&self, amount: Amount) -> Amount {
        let denom = BPS_DENOMINATOR as u128;
        let bps = self.retention_bps as u128;
        (amount / denom) * bps + (amount % denom) * bps / denom
    }

    /// Reward of the slot after one paying `reward`, floored at one unit
    fn next(&self, reward: Amount) -> Amount {
        if reward == 0 {
            return 0;
        }
        self.retain(reward).max(1)
    }
}

impl DecaySchedule for ExponentialDecay {
    fn reward_for_slot(&self, total: Amount, limit: u64, slot: u64) -> Amount {
        if limit == 0 || slot >= limit {
            return 0;
        }

        let mut reward = total / limit as u128;
        for _ in 0..slot {
            if reward <= 1 {
                break;
            }
            reward = self.next(reward);
        }
        reward
    }

    fn preview(&self, total: Amount, limit: u64) -> Vec<Amount> {
        let mut table = Vec::with_capacity(limit.min(1 << 16) as usize);
        if limit == 0 {
            return table;
        }
        let mut reward = total / limit as u128;
        for _ in 0..limit {
            table.push(reward);
            reward = self.next(reward);
        }
        table
    }
}
