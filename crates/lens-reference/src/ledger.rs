//! # Publication Reward Ledger
//!
//! Per-publication accounting of a bounded mirror reward pool.
//!
//! ```text
//!   Active ──(mirrors_issued == mirror_limit)──────────► Exhausted
//!          ──(amount_distributed == total_reward)──────►
//! ```
//!
//! A payout is split in two steps so the caller can move funds in between:
//! [`PublicationRewardLedger::quote`] decides what the next mirror earns
//! without touching state, [`PublicationRewardLedger::commit`] records it once
//! the transfer went through.

use crate::decay::DecaySchedule;
use lens_core::abi::{self, AbiType, AbiValue};
use lens_core::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Decoded reward configuration `(uint256 amount, uint256 mirrorLimit, address currency, bool followerOnly)`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardConfig {
    pub total_reward: Amount,
    pub mirror_limit: u64,
    pub asset: Address,
    pub follower_only: bool,
}

impl RewardConfig {
    const LAYOUT: [AbiType; 4] = [AbiType::Uint, AbiType::Uint, AbiType::Address, AbiType::Bool];

    pub fn decode(data: &[u8]) -> Result<Self> {
        let values = abi::decode(&Self::LAYOUT, data)?;
        let config = match values.as_slice() {
            [AbiValue::Uint(total), AbiValue::Uint(limit), AbiValue::Address(asset), AbiValue::Bool(follower_only)] => {
                let mirror_limit = u64::try_from(*limit).map_err(|_| {
                    ModuleError::InvalidConfiguration(format!("mirror limit {} out of range", limit))
                })?;
                Self {
                    total_reward: *total,
                    mirror_limit,
                    asset: *asset,
                    follower_only: *follower_only,
                }
            }
            _ => {
                return Err(ModuleError::InvalidConfiguration(
                    "unexpected reward config layout".into(),
                ))
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn encode(&self) -> Vec<u8> {
        abi::encode(&[
            AbiValue::Uint(self.total_reward),
            AbiValue::Uint(self.mirror_limit as u128),
            AbiValue::Address(self.asset),
            AbiValue::Bool(self.follower_only),
        ])
    }

    /// Checks that do not need any collaborator
    pub fn validate(&self) -> Result<()> {
        if self.mirror_limit == 0 {
            return Err(ModuleError::InvalidConfiguration(
                "mirror limit must be positive".into(),
            ));
        }
        if self.total_reward == 0 {
            return Err(ModuleError::InvalidConfiguration(
                "reward amount must be positive".into(),
            ));
        }
        if self.total_reward < self.mirror_limit as u128 {
            return Err(ModuleError::InvalidConfiguration(format!(
                "reward amount {} cannot pay {} mirrors at least one unit each",
                self.total_reward, self.mirror_limit
            )));
        }
        if self.asset.is_zero() {
            return Err(ModuleError::InvalidConfiguration(
                "reward currency must not be the zero address".into(),
            ));
        }
        Ok(())
    }
}

/// Lifecycle of a ledger
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerState {
    Active,
    Exhausted,
}

/// Why a mirror earns nothing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Exhausted,
    AlreadyPaid,
}

/// Outcome of quoting a mirror against the ledger
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payout {
    /// Consume `slot` and pay `amount`
    Reward { slot: u64, amount: Amount },
    Skipped(SkipReason),
}

/// Reward pool of one publication
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationRewardLedger {
    /// Publication the pool is attached to
    pub publication: PublicationId,

    /// Account whose allowance funds the payouts
    pub funder: Address,

    /// Reward currency
    pub asset: Address,

    /// Size of the pool
    pub total_reward: Amount,

    /// Number of payout slots
    pub mirror_limit: u64,

    /// Whether comments and mirrors require following the publisher
    pub follower_only: bool,

    /// Payout slots consumed so far
    pub mirrors_issued: u64,

    /// Sum of all rewards transferred so far
    pub amount_distributed: Amount,

    /// Profiles that already consumed a slot
    pub paid_profiles: BTreeSet<ProfileId>,
}

impl PublicationRewardLedger {
    pub fn new(publication: PublicationId, funder: Address, config: RewardConfig) -> Self {
        Self {
            publication,
            funder,
            asset: config.asset,
            total_reward: config.total_reward,
            mirror_limit: config.mirror_limit,
            follower_only: config.follower_only,
            mirrors_issued: 0,
            amount_distributed: 0,
            paid_profiles: BTreeSet::new(),
        }
    }

    pub fn state(&self) -> LedgerState {
        if self.mirrors_issued >= self.mirror_limit || self.amount_distributed >= self.total_reward {
            LedgerState::Exhausted
        } else {
            LedgerState::Active
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.state() == LedgerState::Exhausted
    }

    /// Amount still available for payouts
    pub fn remaining(&self) -> Amount {
        self.total_reward.saturating_sub(self.amount_distributed)
    }

    pub fn has_been_paid(&self, profile: ProfileId) -> bool {
        self.paid_profiles.contains(&profile)
    }

    /// What a mirror from `actor_profile` would earn right now
    pub fn quote(&self, actor_profile: ProfileId, schedule: &dyn DecaySchedule) -> Payout {
        if self.is_exhausted() {
            return Payout::Skipped(SkipReason::Exhausted);
        }
        if self.has_been_paid(actor_profile) {
            return Payout::Skipped(SkipReason::AlreadyPaid);
        }

        let slot = self.mirrors_issued;
        let amount = schedule
            .reward_for_slot(self.total_reward, self.mirror_limit, slot)
            .min(self.remaining());
        Payout::Reward { slot, amount }
    }

    /// Record a payout previously returned by [`Self::quote`]
    pub(crate) fn commit(&mut self, actor_profile: ProfileId, amount: Amount) {
        self.mirrors_issued += 1;
        self.amount_distributed += amount;
        self.paid_profiles.insert(actor_profile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decay::ExponentialDecay;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn config(total: Amount, limit: u64) -> RewardConfig {
        RewardConfig {
            total_reward: total,
            mirror_limit: limit,
            asset: Address::derive("currency"),
            follower_only: false,
        }
    }

    fn ledger(total: Amount, limit: u64) -> PublicationRewardLedger {
        PublicationRewardLedger::new(
            PublicationId::new(ProfileId(1), PubId(1)),
            Address::derive("publisher"),
            config(total, limit),
        )
    }

    /// Quote and commit in one go, returning the amount paid
    fn mirror(ledger: &mut PublicationRewardLedger, profile: u64, decay: &ExponentialDecay) -> Amount {
        match ledger.quote(ProfileId(profile), decay) {
            Payout::Reward { amount, .. } => {
                ledger.commit(ProfileId(profile), amount);
                amount
            }
            Payout::Skipped(_) => 0,
        }
    }

    #[test]
    fn test_config_roundtrip() {
        let cfg = config(10_000, 100);
        assert_eq!(RewardConfig::decode(&cfg.encode()).unwrap(), cfg);
    }

    #[test]
    fn test_config_rejects_degenerate_values() {
        assert!(RewardConfig::decode(&config(10_000, 0).encode()).is_err());
        assert!(RewardConfig::decode(&config(0, 100).encode()).is_err());

        let mut zero_asset = config(10_000, 100);
        zero_asset.asset = Address::ZERO;
        assert!(RewardConfig::decode(&zero_asset.encode()).is_err());
    }

    #[test]
    fn test_config_rejects_huge_limit() {
        let data = abi::encode(&[
            AbiValue::Uint(10_000),
            AbiValue::Uint(u64::MAX as u128 + 1),
            AbiValue::Address(Address::derive("currency")),
            AbiValue::Bool(false),
        ]);
        assert!(matches!(
            RewardConfig::decode(&data),
            Err(ModuleError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_config_rejects_wrong_layout() {
        let data = abi::encode(&[AbiValue::Uint(10_000), AbiValue::Uint(100)]);
        assert!(RewardConfig::decode(&data).is_err());
        assert!(RewardConfig::decode(&[]).is_err());
    }

    #[test]
    fn test_three_mirrors() {
        let decay = ExponentialDecay::default();
        let mut ledger = ledger(10_000, 100);

        let paid: Vec<Amount> = (2..5).map(|p| mirror(&mut ledger, p, &decay)).collect();
        assert!(paid[0] > paid[2]);
        assert_eq!(ledger.mirrors_issued, 3);
        assert_eq!(ledger.amount_distributed, paid.iter().sum::<Amount>());
        assert!(ledger.amount_distributed <= 300);
    }

    #[test]
    fn test_repeat_mirror_is_skipped() {
        let decay = ExponentialDecay::default();
        let mut ledger = ledger(10_000, 100);

        mirror(&mut ledger, 2, &decay);
        assert_eq!(
            ledger.quote(ProfileId(2), &decay),
            Payout::Skipped(SkipReason::AlreadyPaid)
        );
        assert_eq!(mirror(&mut ledger, 2, &decay), 0);
        assert_eq!(ledger.mirrors_issued, 1);
    }

    #[test]
    fn test_exhausted_by_limit() {
        let decay = ExponentialDecay::default();
        let mut ledger = ledger(10_000, 2);

        mirror(&mut ledger, 2, &decay);
        mirror(&mut ledger, 3, &decay);
        assert_eq!(ledger.state(), LedgerState::Exhausted);
        assert_eq!(
            ledger.quote(ProfileId(4), &decay),
            Payout::Skipped(SkipReason::Exhausted)
        );
    }

    #[test]
    fn test_config_rejects_pool_smaller_than_limit() {
        let result = RewardConfig::decode(&config(99, 100).encode());
        assert!(matches!(result, Err(ModuleError::InvalidConfiguration(_))));
        assert!(RewardConfig::decode(&config(100, 100).encode()).is_ok());
    }

    #[test]
    fn test_every_slot_pays() {
        let decay = ExponentialDecay::default();
        let mut ledger = ledger(10_000, 100);

        for profile in 2..102 {
            assert!(mirror(&mut ledger, profile, &decay) > 0);
        }
        assert_eq!(ledger.mirrors_issued, 100);
        assert!(ledger.amount_distributed <= 10_000);
        assert!(ledger.is_exhausted());
    }

    #[test]
    fn test_snapshot_json() {
        let decay = ExponentialDecay::default();
        let mut ledger = ledger(10_000, 100);
        mirror(&mut ledger, 7, &decay);

        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json["funder"], Address::derive("publisher").to_hex());
        assert_eq!(json["mirrors_issued"], 1);
        assert_eq!(json["paid_profiles"], serde_json::json!([7]));
    }

    proptest! {
        #[test]
        fn prop_pool_is_conserved(
            total in 50u128..1_000_000_000u128,
            limit in 1u64..50,
            retention in 1u32..10_000,
            actors in prop::collection::vec(1u64..20, 0..120),
        ) {
            let decay = ExponentialDecay::new(retention).unwrap();
            let mut ledger = ledger(total, limit);
            let mut paid_counts: HashMap<u64, usize> = HashMap::new();
            let mut previous = (0u64, 0u128);

            for actor in actors {
                let before = ledger.mirrors_issued;
                let amount = mirror(&mut ledger, actor, &decay);
                if ledger.mirrors_issued > before {
                    prop_assert!(amount > 0);
                    *paid_counts.entry(actor).or_default() += 1;
                } else {
                    prop_assert_eq!(amount, 0);
                }

                prop_assert!(ledger.amount_distributed <= ledger.total_reward);
                prop_assert!(ledger.mirrors_issued <= ledger.mirror_limit);
                prop_assert!(ledger.mirrors_issued >= previous.0);
                prop_assert!(ledger.amount_distributed >= previous.1);
                previous = (ledger.mirrors_issued, ledger.amount_distributed);
            }

            prop_assert!(paid_counts.values().all(|count| *count == 1));
        }
    }
}
