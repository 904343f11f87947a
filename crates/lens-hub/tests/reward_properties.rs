//! Property tests: reward pools are conserved across arbitrary mirror sequences

mod common;

use common::World;
use lens_core::{PubId, ONE_TOKEN};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Step {
    Mirror(usize),
    Revoke,
    Restore,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        8 => (0usize..6).prop_map(Step::Mirror),
        1 => Just(Step::Revoke),
        1 => Just(Step::Restore),
    ]
}

const NAMES: [&str; 6] = ["m0", "m1", "m2", "m3", "m4", "m5"];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_funds_moved_match_ledger(
        total in 8u128..1_000_000u128,
        limit in 1u64..8,
        steps in prop::collection::vec(step(), 0..40),
    ) {
        let world = World::new();
        let publisher = world.create_profile("publisher");
        let profiles: Vec<_> = NAMES.iter().map(|name| world.create_profile(name)).collect();
        let post = world.rewarded_post("publisher", publisher, total, limit, false);
        let funded = world.balance("publisher");

        let mut previous = (0u64, 0u128);
        for step in steps {
            match step {
                Step::Mirror(i) => {
                    let _ = world.mirror(NAMES[i], profiles[i], post);
                }
                Step::Revoke => world.approve_rewards("publisher", 0),
                Step::Restore => world.approve_rewards("publisher", total),
            }

            let ledger = world
                .deployment
                .limited_rewards
                .publication_data(publisher, PubId(1))
                .unwrap();
            prop_assert!(ledger.amount_distributed <= total);
            prop_assert!(ledger.mirrors_issued <= limit);
            prop_assert!(ledger.mirrors_issued >= previous.0);
            prop_assert!(ledger.amount_distributed >= previous.1);
            previous = (ledger.mirrors_issued, ledger.amount_distributed);

            let received: u128 = NAMES.iter().map(|name| world.balance(name)).sum();
            prop_assert_eq!(received, ledger.amount_distributed);
            prop_assert_eq!(funded - world.balance("publisher"), received);
        }

        prop_assert!(funded >= ONE_TOKEN);
    }
}
