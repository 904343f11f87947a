//! Follower-only reference module
//!
//! Restricts comments and mirrors of a publication to current followers of
//! the publishing profile. Carries no configuration and pays nothing.

use crate::follower::ensure_follower;
use lens_core::prelude::*;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

pub struct FollowerOnlyReferenceModule {
    address: Address,
    hub: Address,
    profiles: Arc<dyn ProfileRegistry>,
    publications: RwLock<HashSet<PublicationId>>,
}

impl FollowerOnlyReferenceModule {
    pub fn new(address: Address, hub: Address, profiles: Arc<dyn ProfileRegistry>) -> Self {
        Self {
            address,
            hub,
            profiles,
            publications: RwLock::new(HashSet::new()),
        }
    }
}

impl ReferenceModule for FollowerOnlyReferenceModule {
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
        if !data.is_empty() {
            return Err(ModuleError::InvalidConfiguration(
                "follower-only module takes no configuration".into(),
            ));
        }

        self.publications.write().insert(publication);
        tracing::info!(%publication, "follower-only gate bound");
        Ok(Vec::new())
    }

    fn process(&self, caller: &Address, ctx: &ReferenceContext, _data: &[u8]) -> Result<()> {
        ensure_hub(&self.hub, caller)?;
        if !self.publications.read().contains(&ctx.pointed) {
            return Err(ModuleError::UnknownBinding(format!("publication {}", ctx.pointed)));
        }
        ensure_follower(self.profiles.as_ref(), ctx.pointed.profile, &ctx.actor)
    }
}
