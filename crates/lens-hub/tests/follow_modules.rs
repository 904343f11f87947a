//! Integration tests for the follow modules, driven through the hub

mod common;

use common::{addr, World};
use lens_core::abi::{self, AbiValue};
use lens_core::{Address, ModuleError, ProfileRegistry};
use lens_follow::{Condition, PasscodeFollowModule};
use lens_hub::config::ModuleAddresses;
use lens_hub::{HubError, HubEvent};

fn ineligible(result: lens_hub::Result<u64>) -> bool {
    matches!(result, Err(HubError::Module(ModuleError::IneligibleFollower { .. })))
}

fn addresses(assets: &[Address]) -> Vec<u8> {
    abi::encode(&[AbiValue::AddressArray(assets.to_vec())])
}

mod erc721_tests {
    use super::*;

    #[test]
    fn test_follow_requires_nft() {
        let world = World::new();
        let module = world.deployment.config.modules.erc721_follow;
        let data = abi::encode(&[AbiValue::Address(addr("nft"))]);
        let profile = world
            .deployment
            .hub
            .create_profile(&addr("publisher"), "publisher", Some(module), &data)
            .unwrap();
        world.deployment.assets.mint_nft(addr("nft"), addr("someone"), 1).unwrap();

        assert!(ineligible(world.follow("user", profile)));

        world.deployment.assets.mint_nft(addr("nft"), addr("user"), 2).unwrap();
        assert!(world.follow("user", profile).is_ok());
        assert_eq!(world.deployment.hub.follow_nft_balance(profile, &addr("user")), 1);

        // The bound condition is exposed, the ack is empty
        assert_eq!(
            world.deployment.erc721_follow.condition(profile),
            Some(Condition::SingleAsset { asset: addr("nft") })
        );
        let acks: Vec<Vec<u8>> = world
            .deployment
            .hub
            .events()
            .into_iter()
            .filter_map(|record| match record.event {
                HubEvent::FollowModuleSet { ack, .. } => Some(ack),
                _ => None,
            })
            .collect();
        assert_eq!(acks, vec![Vec::<u8>::new()]);
    }

    #[test]
    fn test_follow_specific_token() {
        let world = World::new();
        let module = world.deployment.config.modules.erc721_token_follow;
        let data = abi::encode(&[AbiValue::Address(addr("nft")), AbiValue::Uint(7)]);
        let profile = world
            .deployment
            .hub
            .create_profile(&addr("publisher"), "publisher", Some(module), &data)
            .unwrap();

        world.deployment.assets.mint_nft(addr("nft"), addr("user"), 6).unwrap();
        assert!(ineligible(world.follow("user", profile)));

        world.deployment.assets.mint_nft(addr("nft"), addr("user"), 7).unwrap();
        assert!(world.follow("user", profile).is_ok());
    }

    #[test]
    fn test_invalid_configuration_leaves_no_profile() {
        let world = World::new();
        let module = world.deployment.config.modules.erc721_follow;
        let result = world
            .deployment
            .hub
            .create_profile(&addr("publisher"), "publisher", Some(module), &[]);
        assert!(matches!(
            result,
            Err(HubError::Module(ModuleError::InvalidConfiguration(_)))
        ));
        assert_eq!(world.deployment.hub.registry().profile_count(), 0);
    }
}

mod multiple_erc721_tests {
    use super::*;

    fn setup(module: Address, assets: &[Address]) -> (World, lens_core::ProfileId) {
        let world = World::new();
        let profile = world
            .deployment
            .hub
            .create_profile(&addr("publisher"), "publisher", Some(module), &addresses(assets))
            .unwrap();
        (world, profile)
    }

    #[test]
    fn test_and_requires_every_nft() {
        let module = ModuleAddresses::default().multiple_and_follow;
        let (world, profile) = setup(module, &[addr("a"), addr("b"), addr("c")]);

        world.deployment.assets.mint_nft(addr("a"), addr("user"), 1).unwrap();
        world.deployment.assets.mint_nft(addr("b"), addr("user"), 1).unwrap();
        world.deployment.assets.mint_nft(addr("c"), addr("someone"), 1).unwrap();
        assert!(ineligible(world.follow("user", profile)));

        world.deployment.assets.mint_nft(addr("c"), addr("user"), 2).unwrap();
        assert!(world.follow("user", profile).is_ok());
    }

    #[test]
    fn test_and_sentinel_slots_are_ignored() {
        let module = ModuleAddresses::default().multiple_and_follow;
        let (world, profile) = setup(module, &[addr("a"), Address::ZERO, Address::ZERO]);

        world.deployment.assets.mint_nft(addr("a"), addr("user"), 1).unwrap();
        assert!(world.follow("user", profile).is_ok());

        let (world, profile) = setup(module, &[Address::ZERO]);
        assert!(world.follow("anyone", profile).is_ok());
    }

    #[test]
    fn test_or_requires_any_nft() {
        let module = ModuleAddresses::default().multiple_or_follow;
        let (world, profile) = setup(module, &[addr("a"), addr("b")]);
        world.deployment.assets.mint_nft(addr("a"), addr("someone"), 1).unwrap();
        world.deployment.assets.mint_nft(addr("b"), addr("someone"), 1).unwrap();

        assert!(ineligible(world.follow("user", profile)));

        world.deployment.assets.mint_nft(addr("b"), addr("user"), 2).unwrap();
        assert!(world.follow("user", profile).is_ok());
    }

    #[test]
    fn test_empty_list_rejected() {
        let module = ModuleAddresses::default().multiple_or_follow;
        let world = World::new();
        let result = world
            .deployment
            .hub
            .create_profile(&addr("publisher"), "publisher", Some(module), &addresses(&[]));
        assert!(result.is_err());
    }
}

mod erc1155_tests {
    use super::*;

    fn config(min_balance: u128, transferable: bool) -> Vec<u8> {
        abi::encode(&[
            AbiValue::Address(addr("multi")),
            AbiValue::Uint(1),
            AbiValue::Uint(min_balance),
            AbiValue::Bool(transferable),
        ])
    }

    fn setup(min_balance: u128, transferable: bool) -> (World, lens_core::ProfileId) {
        let world = World::new();
        let module = world.deployment.config.modules.erc1155_follow;
        let profile = world
            .deployment
            .hub
            .create_profile(
                &addr("publisher"),
                "publisher",
                Some(module),
                &config(min_balance, transferable),
            )
            .unwrap();
        (world, profile)
    }

    #[test]
    fn test_balance_threshold() {
        let (world, profile) = setup(2, true);
        world.deployment.assets.mint_multi(addr("multi"), 1, addr("user"), 1).unwrap();
        assert!(ineligible(world.follow("user", profile)));

        world.deployment.assets.mint_multi(addr("multi"), 1, addr("user"), 1).unwrap();
        assert!(world.follow("user", profile).is_ok());
    }

    #[test]
    fn test_non_transferable_follow_nft() {
        let (world, profile) = setup(1, false);
        world.deployment.assets.mint_multi(addr("multi"), 1, addr("two"), 1).unwrap();
        world.deployment.assets.mint_multi(addr("multi"), 1, addr("three"), 1).unwrap();
        let nft = world.follow("two", profile).unwrap();

        let result = world
            .deployment
            .hub
            .transfer_follow_nft(&addr("two"), profile, nft, &addr("three"));
        assert_eq!(
            result,
            Err(HubError::Module(ModuleError::FollowNftNotTransferable { profile }))
        );
        assert_eq!(world.deployment.hub.follow_nft_owner(profile, nft), Some(addr("two")));
    }

    #[test]
    fn test_transferable_follow_nft() {
        let (world, profile) = setup(1, true);
        world.deployment.assets.mint_multi(addr("multi"), 1, addr("two"), 1).unwrap();
        let nft = world.follow("two", profile).unwrap();

        let hub = &world.deployment.hub;
        assert!(hub
            .transfer_follow_nft(&addr("two"), profile, nft, &addr("three"))
            .is_err());

        world.deployment.assets.mint_multi(addr("multi"), 1, addr("three"), 1).unwrap();
        hub.transfer_follow_nft(&addr("two"), profile, nft, &addr("three"))
            .unwrap();
        assert_eq!(hub.follow_nft_owner(profile, nft), Some(addr("three")));
    }
}

mod passcode_tests {
    use super::*;

    #[test]
    fn test_passcode_follow() {
        let world = World::new();
        let module = world.deployment.config.modules.passcode_follow;
        let hub = &world.deployment.hub;
        let profile = hub
            .create_profile(
                &addr("publisher"),
                "publisher",
                Some(module),
                &PasscodeFollowModule::follow_data(42069),
            )
            .unwrap();

        let wrong = hub.follow(&addr("user"), profile, &PasscodeFollowModule::follow_data(41968));
        assert!(ineligible(wrong));

        assert!(hub
            .follow(&addr("user"), profile, &PasscodeFollowModule::follow_data(42069))
            .is_ok());
    }
}

mod governance_tests {
    use super::*;

    #[test]
    fn test_unwhitelisted_module_cannot_be_selected_but_keeps_working() {
        let world = World::new();
        let hub = &world.deployment.hub;
        let module = world.deployment.config.modules.passcode_follow;
        let profile = hub
            .create_profile(
                &addr("publisher"),
                "publisher",
                Some(module),
                &PasscodeFollowModule::follow_data(1),
            )
            .unwrap();

        hub.whitelist_follow_module(&world.deployment.governance(), module, false)
            .unwrap();
        let result = hub.create_profile(
            &addr("other"),
            "other",
            Some(module),
            &PasscodeFollowModule::follow_data(1),
        );
        assert_eq!(result, Err(HubError::ModuleNotWhitelisted(module)));

        assert!(hub
            .follow(&addr("user"), profile, &PasscodeFollowModule::follow_data(1))
            .is_ok());
    }

    #[test]
    fn test_switching_follow_module() {
        let world = World::new();
        let hub = &world.deployment.hub;
        let profile = world.create_profile("publisher");
        assert!(world.follow("user", profile).is_ok());

        let module = world.deployment.config.modules.passcode_follow;
        assert!(matches!(
            hub.set_follow_module(&addr("user"), profile, Some(module), &PasscodeFollowModule::follow_data(5)),
            Err(HubError::NotProfileOwner { .. })
        ));
        hub.set_follow_module(
            &addr("publisher"),
            profile,
            Some(module),
            &PasscodeFollowModule::follow_data(5),
        )
        .unwrap();
        assert!(ineligible(world.follow("user", profile)));

        hub.set_follow_module(&addr("publisher"), profile, None, &[])
            .unwrap();
        assert!(world.follow("user", profile).is_ok());
    }
}
