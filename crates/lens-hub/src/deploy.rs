//! Wires a hub, its asset book and every module from a [`HubConfig`]
//!
//! Each module is constructed against the hub address and the hub's
//! registry, registered with the hub, then whitelisted by governance.

use crate::assets::AssetBook;
use crate::config::HubConfig;
use crate::error::Result;
use crate::hub::Hub;
use lens_core::{FollowModule, ReferenceModule};
use lens_follow::{GatedFollowModule, PasscodeFollowModule};
use lens_reference::{FollowerOnlyReferenceModule, LimitedRewardsReferenceModule};
use std::sync::Arc;

pub struct Deployment {
    pub config: HubConfig,
    pub assets: Arc<AssetBook>,
    pub hub: Arc<Hub>,
    pub erc721_follow: Arc<GatedFollowModule>,
    pub erc721_token_follow: Arc<GatedFollowModule>,
    pub multiple_and_follow: Arc<GatedFollowModule>,
    pub multiple_or_follow: Arc<GatedFollowModule>,
    pub erc1155_follow: Arc<GatedFollowModule>,
    pub passcode_follow: Arc<PasscodeFollowModule>,
    pub limited_rewards: Arc<LimitedRewardsReferenceModule>,
    pub follower_only: Arc<FollowerOnlyReferenceModule>,
}

impl Deployment {
    pub fn new(config: HubConfig) -> Result<Self> {
        config.validate()?;
        let schedule = config.rewards.schedule()?;

        let assets = Arc::new(AssetBook::new());
        let hub_address = config.hub.address;
        let governance = config.hub.governance;
        let hub = Arc::new(Hub::new(hub_address, governance, assets.clone()));
        let registry = hub.registry();
        let addresses = &config.modules;

        let erc721_follow = Arc::new(GatedFollowModule::erc721(
            addresses.erc721_follow,
            hub_address,
            assets.clone(),
        ));
        let erc721_token_follow = Arc::new(GatedFollowModule::erc721_token(
            addresses.erc721_token_follow,
            hub_address,
            assets.clone(),
        ));
        let multiple_and_follow = Arc::new(GatedFollowModule::multiple_and(
            addresses.multiple_and_follow,
            hub_address,
            assets.clone(),
        ));
        let multiple_or_follow = Arc::new(GatedFollowModule::multiple_or(
            addresses.multiple_or_follow,
            hub_address,
            assets.clone(),
        ));
        let erc1155_follow = Arc::new(GatedFollowModule::erc1155(
            addresses.erc1155_follow,
            hub_address,
            assets.clone(),
        ));
        let passcode_follow = Arc::new(PasscodeFollowModule::new(addresses.passcode_follow, hub_address));

        let limited_rewards = Arc::new(
            LimitedRewardsReferenceModule::new(
                addresses.limited_rewards_reference,
                hub_address,
                registry.clone(),
                assets.clone(),
                registry.clone(),
            )
            .with_schedule(Arc::new(schedule)),
        );
        let follower_only = Arc::new(FollowerOnlyReferenceModule::new(
            addresses.follower_only_reference,
            hub_address,
            registry,
        ));

        let follow_modules: [Arc<dyn FollowModule>; 6] = [
            erc721_follow.clone(),
            erc721_token_follow.clone(),
            multiple_and_follow.clone(),
            multiple_or_follow.clone(),
            erc1155_follow.clone(),
            passcode_follow.clone(),
        ];
        for module in follow_modules {
            let address = module.address();
            hub.register_follow_module(module)?;
            hub.whitelist_follow_module(&governance, address, true)?;
        }

        let reference_modules: [Arc<dyn ReferenceModule>; 2] =
            [limited_rewards.clone(), follower_only.clone()];
        for module in reference_modules {
            let address = module.address();
            hub.register_reference_module(module)?;
            hub.whitelist_reference_module(&governance, address, true)?;
        }

        tracing::info!(hub = %hub_address, retention_bps = schedule.retention_bps(), "hub deployed");

        Ok(Self {
            config,
            assets,
            hub,
            erc721_follow,
            erc721_token_follow,
            multiple_and_follow,
            multiple_or_follow,
            erc1155_follow,
            passcode_follow,
            limited_rewards,
            follower_only,
        })
    }

    pub fn governance(&self) -> lens_core::Address {
        self.config.hub.governance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RewardSettings;
    use lens_reference::DecaySchedule;

    #[test]
    fn test_every_module_is_whitelisted() {
        let deployment = Deployment::new(HubConfig::default()).unwrap();
        let modules = &deployment.config.modules;

        for address in [
            modules.erc721_follow,
            modules.erc721_token_follow,
            modules.multiple_and_follow,
            modules.multiple_or_follow,
            modules.erc1155_follow,
            modules.passcode_follow,
        ] {
            assert!(deployment.hub.is_follow_module_whitelisted(&address));
        }
        assert!(deployment
            .hub
            .is_reference_module_whitelisted(&modules.limited_rewards_reference));
        assert!(deployment
            .hub
            .is_reference_module_whitelisted(&modules.follower_only_reference));
    }

    #[test]
    fn test_configured_retention_reaches_the_module() {
        let config = HubConfig {
            rewards: RewardSettings { retention_bps: 5_000 },
            ..HubConfig::default()
        };
        let deployment = Deployment::new(config).unwrap();
        let table = deployment.limited_rewards.schedule().preview(1_000, 10);
        assert_eq!(&table[..3], &[100, 50, 25]);
    }
}
