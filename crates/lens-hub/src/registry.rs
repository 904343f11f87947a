//! Profile and follow NFT book-keeping, plus the governance currency list
//!
//! Modules receive an `Arc<HubRegistry>` as their [`ProfileRegistry`] and
//! [`CurrencyWhitelist`]. Every accessor takes a short-lived lock, so a module
//! may query the registry while the hub is in the middle of a call.

use lens_core::{Address, Amount, CurrencyWhitelist, ProfileId, ProfileRegistry, PubId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A profile as stored by the hub
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub owner: Address,
    pub handle: String,
    pub follow_module: Option<Address>,

    /// Number of publications created so far
    pub pub_count: u64,

    /// Follow NFT id → current holder
    pub follow_nfts: BTreeMap<u64, Address>,

    /// Follow NFTs minted so far (ids are never reused)
    pub follow_nfts_minted: u64,
}

impl Profile {
    pub fn new(id: ProfileId, owner: Address, handle: String) -> Self {
        Self {
            id,
            owner,
            handle,
            follow_module: None,
            pub_count: 0,
            follow_nfts: BTreeMap::new(),
            follow_nfts_minted: 0,
        }
    }

    pub fn next_pub_id(&self) -> PubId {
        PubId(self.pub_count + 1)
    }

    pub fn follower_count(&self, holder: &Address) -> Amount {
        self.follow_nfts.values().filter(|h| *h == holder).count() as Amount
    }
}

#[derive(Default)]
pub struct HubRegistry {
    profiles: RwLock<BTreeMap<ProfileId, Profile>>,
    currencies: RwLock<HashSet<Address>>,
}

impl HubRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile(&self, id: ProfileId) -> Option<Profile> {
        self.profiles.read().get(&id).cloned()
    }

    pub fn next_profile_id(&self) -> ProfileId {
        let last = self.profiles.read().keys().next_back().map(|id| id.0).unwrap_or(0);
        ProfileId(last + 1)
    }

    pub fn handle_taken(&self, handle: &str) -> bool {
        self.profiles.read().values().any(|p| p.handle == handle)
    }

    pub(crate) fn insert(&self, profile: Profile) {
        self.profiles.write().insert(profile.id, profile);
    }

    /// Apply `f` to a stored profile
    pub(crate) fn update<R>(&self, id: ProfileId, f: impl FnOnce(&mut Profile) -> R) -> Option<R> {
        self.profiles.write().get_mut(&id).map(f)
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.read().len()
    }

    pub(crate) fn set_currency(&self, currency: Address, whitelisted: bool) {
        let mut currencies = self.currencies.write();
        if whitelisted {
            currencies.insert(currency);
        } else {
            currencies.remove(&currency);
        }
    }
}

impl ProfileRegistry for HubRegistry {
    fn profile_owner(&self, profile: ProfileId) -> Option<Address> {
        self.profiles.read().get(&profile).map(|p| p.owner)
    }

    fn follow_nft_balance(&self, profile: ProfileId, holder: &Address) -> Amount {
        self.profiles
            .read()
            .get(&profile)
            .map(|p| p.follower_count(holder))
            .unwrap_or(0)
    }
}

impl CurrencyWhitelist for HubRegistry {
    fn is_currency_whitelisted(&self, currency: &Address) -> bool {
        self.currencies.read().contains(currency)
    }
}
