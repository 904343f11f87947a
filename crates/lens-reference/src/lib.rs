//! # Lens Reference Modules
//!
//! Reference modules gate comments and mirrors of a publication and may pay
//! out rewards while doing so.
//!
//! - [`LimitedRewardsReferenceModule`] - bounded mirror reward pool paid out on
//!   a [`DecaySchedule`], optionally follower-only
//! - [`FollowerOnlyReferenceModule`] - follower-only gate without rewards
//!
//! ## Reward Accounting
//!
//! Each rewarded publication owns a [`PublicationRewardLedger`]:
//!
//! | Invariant | Guarantee |
//! |-----------|-----------|
//! | Conservation | `amount_distributed ≤ total_reward` |
//! | Bounded slots | `mirrors_issued ≤ mirror_limit` |
//! | Monotonic | both counters only grow |
//! | Anti-repeat | one payout per acting profile |

pub mod decay;
pub mod follower;
pub mod follower_only;
pub mod ledger;
pub mod limited_rewards;

#[cfg(test)]
pub(crate) mod testing;

pub use decay::{DecaySchedule, ExponentialDecay, DEFAULT_RETENTION_BPS};
pub use follower::{ensure_follower, is_follower};
pub use follower_only::FollowerOnlyReferenceModule;
pub use ledger::{LedgerState, Payout, PublicationRewardLedger, RewardConfig, SkipReason};
pub use limited_rewards::LimitedRewardsReferenceModule;
