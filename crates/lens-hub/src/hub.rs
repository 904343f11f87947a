//! # Hub
//!
//! Owns profiles, follow NFTs and publications, and calls the follow and
//! reference modules at their extension points.
//!
//! ## Call Model
//!
//! Hub calls are serialized by a sequencer lock. Each call first asks the
//! involved module, and only writes hub state once the module accepted:
//!
//! ```text
//! follow(profile)          → FollowModule::process_follow   → mint follow NFT
//! transfer_follow_nft(..)  → FollowModule::on_follow_nft_transfer → move NFT
//! comment/mirror(pointed)  → ReferenceModule::process        → store publication
//! post/comment(new module) → ReferenceModule::initialize     → store publication
//! ```
//!
//! Modules are always called with the hub address as caller. Modules are
//! registered once and then whitelisted by governance; only whitelisted
//! modules can be selected, while already-selected modules keep being called
//! after they are removed from the whitelist.

use crate::assets::AssetBook;
use crate::error::{HubError, Result};
use crate::events::{EventRecord, HubEvent, ModuleFamily};
use crate::registry::{HubRegistry, Profile};
use lens_core::{
    Address, Amount, CurrencyWhitelist, FollowModule, ProfileId, ProfileRegistry, PublicationId,
    ReferenceAction, ReferenceContext, ReferenceModule,
};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// What a publication is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PublicationKind {
    Post,
    Comment { pointed: PublicationId },
    Mirror { pointed: PublicationId },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub id: PublicationId,
    pub kind: PublicationKind,
    pub content_uri: Option<String>,
    pub reference_module: Option<Address>,
}

/// Arguments of [`Hub::post`]
#[derive(Clone, Debug)]
pub struct PostData {
    pub profile: ProfileId,
    pub content_uri: String,
    pub reference_module: Option<Address>,
    pub reference_module_init_data: Vec<u8>,
}

/// Arguments of [`Hub::comment`]
#[derive(Clone, Debug)]
pub struct CommentData {
    pub profile: ProfileId,
    pub content_uri: String,
    pub pointed: PublicationId,
    /// Passed to the pointed publication's reference module
    pub reference_module_data: Vec<u8>,
    pub reference_module: Option<Address>,
    pub reference_module_init_data: Vec<u8>,
}

/// Arguments of [`Hub::mirror`]
#[derive(Clone, Debug)]
pub struct MirrorData {
    pub profile: ProfileId,
    pub pointed: PublicationId,
    pub reference_module_data: Vec<u8>,
}

pub struct Hub {
    address: Address,
    governance: Address,
    registry: Arc<HubRegistry>,
    assets: Arc<AssetBook>,
    follow_modules: RwLock<HashMap<Address, Arc<dyn FollowModule>>>,
    reference_modules: RwLock<HashMap<Address, Arc<dyn ReferenceModule>>>,
    whitelisted_follow: RwLock<HashSet<Address>>,
    whitelisted_reference: RwLock<HashSet<Address>>,
    publications: RwLock<HashMap<PublicationId, Publication>>,
    events: RwLock<Vec<EventRecord>>,
    sequencer: Mutex<()>,
}

impl Hub {
    pub fn new(address: Address, governance: Address, assets: Arc<AssetBook>) -> Self {
        Self {
            address,
            governance,
            registry: Arc::new(HubRegistry::new()),
            assets,
            follow_modules: RwLock::new(HashMap::new()),
            reference_modules: RwLock::new(HashMap::new()),
            whitelisted_follow: RwLock::new(HashSet::new()),
            whitelisted_reference: RwLock::new(HashSet::new()),
            publications: RwLock::new(HashMap::new()),
            events: RwLock::new(Vec::new()),
            sequencer: Mutex::new(()),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn governance(&self) -> Address {
        self.governance
    }

    /// Profile and currency view handed to modules
    pub fn registry(&self) -> Arc<HubRegistry> {
        self.registry.clone()
    }

    pub fn assets(&self) -> Arc<AssetBook> {
        self.assets.clone()
    }

    // Module registry

    pub fn register_follow_module(&self, module: Arc<dyn FollowModule>) -> Result<()> {
        self.check_bound(module.address(), module.hub())?;
        self.follow_modules.write().insert(module.address(), module);
        Ok(())
    }

    pub fn register_reference_module(&self, module: Arc<dyn ReferenceModule>) -> Result<()> {
        self.check_bound(module.address(), module.hub())?;
        self.reference_modules.write().insert(module.address(), module);
        Ok(())
    }

    fn check_bound(&self, module: Address, bound: Address) -> Result<()> {
        if bound != self.address {
            return Err(HubError::ForeignModule { module, bound });
        }
        Ok(())
    }

    // Governance

    pub fn whitelist_follow_module(&self, caller: &Address, module: Address, whitelisted: bool) -> Result<()> {
        let _seq = self.sequencer.lock();
        self.ensure_governance(caller)?;
        if !self.follow_modules.read().contains_key(&module) {
            return Err(HubError::UnknownModule(module));
        }
        set_membership(&self.whitelisted_follow, module, whitelisted);
        self.emit(HubEvent::ModuleWhitelisted {
            family: ModuleFamily::Follow,
            module,
            whitelisted,
        });
        Ok(())
    }

    pub fn whitelist_reference_module(
        &self,
        caller: &Address,
        module: Address,
        whitelisted: bool,
    ) -> Result<()> {
        let _seq = self.sequencer.lock();
        self.ensure_governance(caller)?;
        if !self.reference_modules.read().contains_key(&module) {
            return Err(HubError::UnknownModule(module));
        }
        set_membership(&self.whitelisted_reference, module, whitelisted);
        self.emit(HubEvent::ModuleWhitelisted {
            family: ModuleFamily::Reference,
            module,
            whitelisted,
        });
        Ok(())
    }

    pub fn whitelist_currency(&self, caller: &Address, currency: Address, whitelisted: bool) -> Result<()> {
        let _seq = self.sequencer.lock();
        self.ensure_governance(caller)?;
        self.registry.set_currency(currency, whitelisted);
        self.emit(HubEvent::CurrencyWhitelisted {
            currency,
            whitelisted,
        });
        Ok(())
    }

    pub fn is_follow_module_whitelisted(&self, module: &Address) -> bool {
        self.whitelisted_follow.read().contains(module)
    }

    pub fn is_reference_module_whitelisted(&self, module: &Address) -> bool {
        self.whitelisted_reference.read().contains(module)
    }

    fn ensure_governance(&self, caller: &Address) -> Result<()> {
        if *caller != self.governance {
            tracing::warn!(%caller, "rejected governance call");
            return Err(HubError::NotGovernance(*caller));
        }
        Ok(())
    }

    // Profiles and follows

    /// Create a profile owned by `caller`, optionally selecting a follow module
    pub fn create_profile(
        &self,
        caller: &Address,
        handle: &str,
        follow_module: Option<Address>,
        follow_module_data: &[u8],
    ) -> Result<ProfileId> {
        let _seq = self.sequencer.lock();
        if self.registry.handle_taken(handle) {
            return Err(HubError::HandleTaken(handle.to_string()));
        }

        let id = self.registry.next_profile_id();
        let ack = self.init_follow_module(id, follow_module, follow_module_data)?;

        let mut profile = Profile::new(id, *caller, handle.to_string());
        profile.follow_module = follow_module;
        self.registry.insert(profile);

        tracing::info!(profile = %id, owner = %caller, handle, "profile created");
        self.emit(HubEvent::ProfileCreated {
            profile: id,
            owner: *caller,
            handle: handle.to_string(),
        });
        if follow_module.is_some() {
            self.emit(HubEvent::FollowModuleSet {
                profile: id,
                module: follow_module,
                ack,
            });
        }
        Ok(id)
    }

    /// Select (or clear) the follow module of a profile owned by `caller`
    pub fn set_follow_module(
        &self,
        caller: &Address,
        profile: ProfileId,
        module: Option<Address>,
        data: &[u8],
    ) -> Result<()> {
        let _seq = self.sequencer.lock();
        self.owned_profile(caller, profile)?;

        let ack = self.init_follow_module(profile, module, data)?;
        self.registry
            .update(profile, |p| p.follow_module = module)
            .ok_or(HubError::UnknownProfile(profile))?;

        tracing::info!(%profile, module = ?module, "follow module set");
        self.emit(HubEvent::FollowModuleSet {
            profile,
            module,
            ack,
        });
        Ok(())
    }

    /// Follow `profile`, returning the id of the minted follow NFT
    pub fn follow(&self, caller: &Address, profile: ProfileId, data: &[u8]) -> Result<u64> {
        let _seq = self.sequencer.lock();
        let target = self
            .registry
            .profile(profile)
            .ok_or(HubError::UnknownProfile(profile))?;

        if let Some(module) = target.follow_module {
            self.resolve_follow_module(&module)?
                .process_follow(&self.address, caller, profile, data)
                .map_err(|e| {
                    tracing::debug!(%profile, follower = %caller, error = %e, "follow rejected by module");
                    e
                })?;
        }

        let follow_nft_id = self
            .registry
            .update(profile, |p| {
                p.follow_nfts_minted += 1;
                p.follow_nfts.insert(p.follow_nfts_minted, *caller);
                p.follow_nfts_minted
            })
            .ok_or(HubError::UnknownProfile(profile))?;

        tracing::info!(%profile, follower = %caller, follow_nft_id, "followed");
        self.emit(HubEvent::Followed {
            follower: *caller,
            profile,
            follow_nft_id,
        });
        Ok(follow_nft_id)
    }

    /// Move a follow NFT held by `caller` to `to`
    pub fn transfer_follow_nft(
        &self,
        caller: &Address,
        profile: ProfileId,
        follow_nft_id: u64,
        to: &Address,
    ) -> Result<()> {
        let _seq = self.sequencer.lock();
        let target = self
            .registry
            .profile(profile)
            .ok_or(HubError::UnknownProfile(profile))?;

        let holder = target
            .follow_nfts
            .get(&follow_nft_id)
            .copied()
            .ok_or(HubError::UnknownFollowNft {
                profile,
                follow_nft_id,
            })?;
        if holder != *caller {
            return Err(HubError::NotFollowNftOwner {
                caller: *caller,
                profile,
                follow_nft_id,
            });
        }

        if let Some(module) = target.follow_module {
            self.resolve_follow_module(&module)?.on_follow_nft_transfer(
                &self.address,
                profile,
                caller,
                to,
                follow_nft_id,
            )?;
        }

        self.registry
            .update(profile, |p| p.follow_nfts.insert(follow_nft_id, *to))
            .ok_or(HubError::UnknownProfile(profile))?;

        tracing::debug!(%profile, follow_nft_id, from = %caller, %to, "follow nft transferred");
        self.emit(HubEvent::FollowNftTransferred {
            profile,
            follow_nft_id,
            from: *caller,
            to: *to,
        });
        Ok(())
    }

    // Publications

    pub fn post(&self, caller: &Address, data: PostData) -> Result<PublicationId> {
        let _seq = self.sequencer.lock();
        let profile = self.owned_profile(caller, data.profile)?;
        let id = PublicationId::new(profile.id, profile.next_pub_id());

        let ack = self.init_reference_module(id, data.reference_module, &data.reference_module_init_data)?;
        self.store_publication(Publication {
            id,
            kind: PublicationKind::Post,
            content_uri: Some(data.content_uri),
            reference_module: data.reference_module,
        })?;

        tracing::info!(publication = %id, "post created");
        self.emit(HubEvent::PostCreated {
            publication: id,
            reference_module: data.reference_module,
            ack,
        });
        Ok(id)
    }

    /// Comment on `pointed`. The pointed publication's module is consulted
    /// before the comment's own module is initialized.
    pub fn comment(&self, caller: &Address, data: CommentData) -> Result<PublicationId> {
        let _seq = self.sequencer.lock();
        let profile = self.owned_profile(caller, data.profile)?;
        let pointed = self.root_of(data.pointed)?;
        let id = PublicationId::new(profile.id, profile.next_pub_id());

        self.process_reference(
            caller,
            profile.id,
            pointed,
            ReferenceAction::Comment,
            &data.reference_module_data,
        )?;
        let ack = self.init_reference_module(id, data.reference_module, &data.reference_module_init_data)?;
        self.store_publication(Publication {
            id,
            kind: PublicationKind::Comment { pointed },
            content_uri: Some(data.content_uri),
            reference_module: data.reference_module,
        })?;

        tracing::info!(publication = %id, %pointed, "comment created");
        self.emit(HubEvent::CommentCreated {
            publication: id,
            pointed,
            reference_module: data.reference_module,
            ack,
        });
        Ok(id)
    }

    /// Mirror `pointed`. Mirroring a mirror points at the original publication.
    pub fn mirror(&self, caller: &Address, data: MirrorData) -> Result<PublicationId> {
        let _seq = self.sequencer.lock();
        let profile = self.owned_profile(caller, data.profile)?;
        let pointed = self.root_of(data.pointed)?;
        let id = PublicationId::new(profile.id, profile.next_pub_id());

        self.process_reference(
            caller,
            profile.id,
            pointed,
            ReferenceAction::Mirror,
            &data.reference_module_data,
        )?;
        self.store_publication(Publication {
            id,
            kind: PublicationKind::Mirror { pointed },
            content_uri: None,
            reference_module: None,
        })?;

        tracing::info!(publication = %id, %pointed, "mirror created");
        self.emit(HubEvent::MirrorCreated {
            publication: id,
            pointed,
        });
        Ok(id)
    }

    // Views

    pub fn profile(&self, id: ProfileId) -> Option<Profile> {
        self.registry.profile(id)
    }

    pub fn publication(&self, id: PublicationId) -> Option<Publication> {
        self.publications.read().get(&id).cloned()
    }

    pub fn follow_nft_owner(&self, profile: ProfileId, follow_nft_id: u64) -> Option<Address> {
        self.registry
            .profile(profile)
            .and_then(|p| p.follow_nfts.get(&follow_nft_id).copied())
    }

    pub fn events(&self) -> Vec<EventRecord> {
        self.events.read().clone()
    }

    // Internals

    fn owned_profile(&self, caller: &Address, id: ProfileId) -> Result<Profile> {
        let profile = self.registry.profile(id).ok_or(HubError::UnknownProfile(id))?;
        if profile.owner != *caller {
            return Err(HubError::NotProfileOwner {
                caller: *caller,
                profile: id,
            });
        }
        Ok(profile)
    }

    fn root_of(&self, pointed: PublicationId) -> Result<PublicationId> {
        let publications = self.publications.read();
        let publication = publications
            .get(&pointed)
            .ok_or(HubError::UnknownPublication(pointed))?;
        Ok(match publication.kind {
            PublicationKind::Mirror { pointed } => pointed,
            _ => pointed,
        })
    }

    fn resolve_follow_module(&self, module: &Address) -> Result<Arc<dyn FollowModule>> {
        self.follow_modules
            .read()
            .get(module)
            .cloned()
            .ok_or(HubError::UnknownModule(*module))
    }

    fn resolve_reference_module(&self, module: &Address) -> Result<Arc<dyn ReferenceModule>> {
        self.reference_modules
            .read()
            .get(module)
            .cloned()
            .ok_or(HubError::UnknownModule(*module))
    }

    fn init_follow_module(&self, profile: ProfileId, module: Option<Address>, data: &[u8]) -> Result<Vec<u8>> {
        let Some(module) = module else {
            return Ok(Vec::new());
        };
        if !self.is_follow_module_whitelisted(&module) {
            return Err(HubError::ModuleNotWhitelisted(module));
        }
        Ok(self
            .resolve_follow_module(&module)?
            .initialize(&self.address, profile, data)?)
    }

    fn init_reference_module(
        &self,
        publication: PublicationId,
        module: Option<Address>,
        data: &[u8],
    ) -> Result<Vec<u8>> {
        let Some(module) = module else {
            return Ok(Vec::new());
        };
        if !self.is_reference_module_whitelisted(&module) {
            return Err(HubError::ModuleNotWhitelisted(module));
        }
        Ok(self
            .resolve_reference_module(&module)?
            .initialize(&self.address, publication, data)?)
    }

    fn process_reference(
        &self,
        actor: &Address,
        actor_profile: ProfileId,
        pointed: PublicationId,
        action: ReferenceAction,
        data: &[u8],
    ) -> Result<()> {
        let module = self
            .publications
            .read()
            .get(&pointed)
            .and_then(|p| p.reference_module);
        let Some(module) = module else {
            return Ok(());
        };

        let ctx = ReferenceContext {
            actor: *actor,
            actor_profile,
            pointed,
            action,
        };
        self.resolve_reference_module(&module)?
            .process(&self.address, &ctx, data)
            .map_err(|e| {
                tracing::debug!(%pointed, %action, error = %e, "reference rejected by module");
                HubError::from(e)
            })
    }

    fn store_publication(&self, publication: Publication) -> Result<()> {
        let id = publication.id;
        self.registry
            .update(id.profile, |p| p.pub_count = id.pub_id.0)
            .ok_or(HubError::UnknownProfile(id.profile))?;
        self.publications.write().insert(id, publication);
        Ok(())
    }

    fn emit(&self, event: HubEvent) {
        let mut events = self.events.write();
        let sequence = events.len() as u64;
        events.push(EventRecord {
            sequence,
            timestamp: chrono::Utc::now().timestamp_millis(),
            event,
        });
    }
}

fn set_membership(set: &RwLock<HashSet<Address>>, member: Address, present: bool) {
    let mut set = set.write();
    if present {
        set.insert(member);
    } else {
        set.remove(&member);
    }
}

impl ProfileRegistry for Hub {
    fn profile_owner(&self, profile: ProfileId) -> Option<Address> {
        self.registry.profile_owner(profile)
    }

    fn follow_nft_balance(&self, profile: ProfileId, holder: &Address) -> Amount {
        self.registry.follow_nft_balance(profile, holder)
    }
}

impl CurrencyWhitelist for Hub {
    fn is_currency_whitelisted(&self, currency: &Address) -> bool {
        self.registry.is_currency_whitelisted(currency)
    }
}
