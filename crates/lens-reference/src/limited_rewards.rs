//! # Limited Rewards Reference Module
//!
//! Pays a decaying reward to the first `mirror_limit` distinct profiles that
//! mirror a publication, optionally restricting comments and mirrors to
//! followers of the publishing profile.
//!
//! ## Funding
//!
//! The publisher approves the module to spend `total_reward` of the reward
//! currency. The module never holds funds: each payout is a `transfer_from`
//! out of the funder's balance straight to the mirroring account.
//!
//! ## Payout
//!
//! ```text
//! process(mirror)
//!   ├─ follower_only? ── live follow NFT check ──► NotAFollower
//!   ├─ quote ── Exhausted / AlreadyPaid ─────────► Ok (no reward)
//!   ├─ transfer_from(funder → actor) ────────────► RewardTransferFailed
//!   └─ commit slot
//! ```
//!
//! The ledger write lock is held from quote to commit, so two mirrors can never
//! be quoted the same slot.

use crate::decay::{DecaySchedule, ExponentialDecay};
use crate::follower::ensure_follower;
use crate::ledger::{Payout, PublicationRewardLedger, RewardConfig};
use lens_core::prelude::*;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Reference module distributing a bounded, decaying mirror reward
pub struct LimitedRewardsReferenceModule {
    address: Address,
    hub: Address,
    profiles: Arc<dyn ProfileRegistry>,
    tokens: Arc<dyn FungibleLedger>,
    currencies: Arc<dyn CurrencyWhitelist>,
    schedule: Arc<dyn DecaySchedule>,
    ledgers: RwLock<HashMap<PublicationId, PublicationRewardLedger>>,
}

impl LimitedRewardsReferenceModule {
    /// Create a module using the default exponential decay
    pub fn new(
        address: Address,
        hub: Address,
        profiles: Arc<dyn ProfileRegistry>,
        tokens: Arc<dyn FungibleLedger>,
        currencies: Arc<dyn CurrencyWhitelist>,
    ) -> Self {
        Self {
            address,
            hub,
            profiles,
            tokens,
            currencies,
            schedule: Arc::new(ExponentialDecay::default()),
            ledgers: RwLock::new(HashMap::new()),
        }
    }

    /// Replace the decay schedule
    pub fn with_schedule(mut self, schedule: Arc<dyn DecaySchedule>) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn schedule(&self) -> &dyn DecaySchedule {
        self.schedule.as_ref()
    }

    /// Snapshot of the reward ledger of a publication
    pub fn publication_data(&self, profile: ProfileId, pub_id: PubId) -> Option<PublicationRewardLedger> {
        self.ledgers
            .read()
            .get(&PublicationId::new(profile, pub_id))
            .cloned()
    }

    /// Reward the next first-time mirror would receive
    pub fn next_reward(&self, profile: ProfileId, pub_id: PubId) -> Option<Amount> {
        let ledgers = self.ledgers.read();
        let ledger = ledgers.get(&PublicationId::new(profile, pub_id))?;
        if ledger.is_exhausted() {
            return Some(0);
        }
        Some(
            self.schedule
                .reward_for_slot(ledger.total_reward, ledger.mirror_limit, ledger.mirrors_issued)
                .min(ledger.remaining()),
        )
    }

    /// Whether `actor_profile` already consumed a reward slot of the publication
    pub fn has_been_paid(&self, profile: ProfileId, pub_id: PubId, actor_profile: ProfileId) -> bool {
        self.ledgers
            .read()
            .get(&PublicationId::new(profile, pub_id))
            .map(|ledger| ledger.has_been_paid(actor_profile))
            .unwrap_or(false)
    }

    fn check_funding(&self, funder: &Address, config: &RewardConfig) -> Result<()> {
        if !self.currencies.is_currency_whitelisted(&config.asset) {
            return Err(ModuleError::InvalidConfiguration(format!(
                "currency {} is not whitelisted",
                config.asset
            )));
        }

        let allowance = self
            .tokens
            .allowance(&config.asset, funder, &self.address)
            .map_err(|e| ModuleError::InvalidConfiguration(e.to_string()))?;
        if allowance < config.total_reward {
            return Err(ModuleError::InvalidConfiguration(format!(
                "allowance {} below reward amount {}",
                allowance, config.total_reward
            )));
        }
        Ok(())
    }
}

impl ReferenceModule for LimitedRewardsReferenceModule {
    fn address(&self) -> Address {
        self.address
    }

    fn hub(&self) -> Address {
        self.hub
    }

    fn initialize(
        &self,
        caller: &Address,
        publication: PublicationId,
        data: &[u8],
    ) -> Result<Vec<u8>> {
        ensure_hub(&self.hub, caller)?;

        let config = RewardConfig::decode(data)?;
        let funder = self.profiles.profile_owner(publication.profile).ok_or_else(|| {
            ModuleError::InvalidConfiguration(format!("profile {} does not exist", publication.profile))
        })?;
        self.check_funding(&funder, &config)?;

        let mut ledgers = self.ledgers.write();
        if ledgers.contains_key(&publication) {
            return Err(ModuleError::InvalidConfiguration(format!(
                "publication {} already has a reward ledger",
                publication
            )));
        }
        ledgers.insert(publication, PublicationRewardLedger::new(publication, funder, config));

        tracing::info!(
            %publication,
            %funder,
            currency = %config.asset,
            total = %config.total_reward,
            limit = config.mirror_limit,
            follower_only = config.follower_only,
            "reward ledger created"
        );
        Ok(config.encode())
    }

    fn process(&self, caller: &Address, ctx: &ReferenceContext, _data: &[u8]) -> Result<()> {
        ensure_hub(&self.hub, caller)?;

        let mut ledgers = self.ledgers.write();
        let ledger = ledgers
            .get_mut(&ctx.pointed)
            .ok_or_else(|| ModuleError::UnknownBinding(format!("publication {}", ctx.pointed)))?;

        if ledger.follower_only {
            ensure_follower(self.profiles.as_ref(), ctx.pointed.profile, &ctx.actor)?;
        }

        if ctx.action != ReferenceAction::Mirror {
            return Ok(());
        }

        let amount = match ledger.quote(ctx.actor_profile, self.schedule.as_ref()) {
            Payout::Skipped(reason) => {
                tracing::debug!(
                    publication = %ctx.pointed,
                    actor_profile = %ctx.actor_profile,
                    ?reason,
                    "mirror earns no reward"
                );
                return Ok(());
            }
            Payout::Reward { amount, .. } => amount,
        };

        if amount > 0 {
            self.tokens
                .transfer_from(&ledger.asset, &self.address, &ledger.funder, &ctx.actor, amount)
                .map_err(|e| {
                    tracing::warn!(
                        publication = %ctx.pointed,
                        funder = %ledger.funder,
                        error = %e,
                        "reward transfer failed"
                    );
                    ModuleError::from(e)
                })?;
        }

        ledger.commit(ctx.actor_profile, amount);
        tracing::info!(
            publication = %ctx.pointed,
            actor = %ctx.actor,
            slot = ledger.mirrors_issued - 1,
            amount = %amount,
            "mirror reward paid"
        );
        Ok(())
    }
}
