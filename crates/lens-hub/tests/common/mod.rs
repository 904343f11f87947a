//! Shared fixtures for hub integration tests

#![allow(dead_code)]

use lens_core::{Address, Amount, ProfileId, PublicationId, ONE_TOKEN};
use lens_hub::{CommentData, Deployment, HubConfig, MirrorData, PostData, Result};
use lens_reference::RewardConfig;

pub fn addr(label: &str) -> Address {
    Address::derive(label)
}

pub struct World {
    pub deployment: Deployment,
    pub currency: Address,
}

impl World {
    /// Fresh deployment with one whitelisted reward currency
    pub fn new() -> Self {
        let deployment = Deployment::new(HubConfig::default()).unwrap();
        let currency = addr("currency");
        deployment
            .hub
            .whitelist_currency(&deployment.governance(), currency, true)
            .unwrap();
        Self {
            deployment,
            currency,
        }
    }

    pub fn create_profile(&self, owner: &str) -> ProfileId {
        self.deployment
            .hub
            .create_profile(&addr(owner), owner, None, &[])
            .unwrap()
    }

    pub fn fund(&self, owner: &str, amount: Amount) {
        self.deployment
            .assets
            .mint(self.currency, addr(owner), amount)
            .unwrap();
    }

    pub fn approve_rewards(&self, owner: &str, amount: Amount) {
        let module = self.deployment.config.modules.limited_rewards_reference;
        self.deployment
            .assets
            .approve(self.currency, addr(owner), module, amount)
            .unwrap();
    }

    pub fn balance(&self, holder: &str) -> Amount {
        self.deployment.assets.balance(&self.currency, &addr(holder))
    }

    pub fn reward_config(&self, total: Amount, limit: u64, follower_only: bool) -> Vec<u8> {
        RewardConfig {
            total_reward: total,
            mirror_limit: limit,
            asset: self.currency,
            follower_only,
        }
        .encode()
    }

    /// Fund, approve and publish a post carrying a reward pool
    pub fn rewarded_post(
        &self,
        owner: &str,
        profile: ProfileId,
        total: Amount,
        limit: u64,
        follower_only: bool,
    ) -> PublicationId {
        self.fund(owner, total.max(ONE_TOKEN));
        self.approve_rewards(owner, total);
        self.post(
            owner,
            profile,
            Some(self.deployment.config.modules.limited_rewards_reference),
            self.reward_config(total, limit, follower_only),
        )
        .unwrap()
    }

    pub fn post(
        &self,
        owner: &str,
        profile: ProfileId,
        reference_module: Option<Address>,
        init_data: Vec<u8>,
    ) -> Result<PublicationId> {
        self.deployment.hub.post(
            &addr(owner),
            PostData {
                profile,
                content_uri: "ipfs://post".into(),
                reference_module,
                reference_module_init_data: init_data,
            },
        )
    }

    pub fn comment(&self, actor: &str, profile: ProfileId, pointed: PublicationId) -> Result<PublicationId> {
        self.deployment.hub.comment(
            &addr(actor),
            CommentData {
                profile,
                content_uri: "ipfs://comment".into(),
                pointed,
                reference_module_data: Vec::new(),
                reference_module: None,
                reference_module_init_data: Vec::new(),
            },
        )
    }

    pub fn mirror(&self, actor: &str, profile: ProfileId, pointed: PublicationId) -> Result<PublicationId> {
        self.deployment.hub.mirror(
            &addr(actor),
            MirrorData {
                profile,
                pointed,
                reference_module_data: Vec::new(),
            },
        )
    }

    pub fn follow(&self, follower: &str, profile: ProfileId) -> Result<u64> {
        self.deployment.hub.follow(&addr(follower), profile, &[])
    }
}
