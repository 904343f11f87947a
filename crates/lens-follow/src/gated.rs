//! # Asset-Gated Follow Module
//!
//! Binds one [`Condition`] per profile and re-evaluates it on every follow
//! attempt. The module never records who followed; the hub's follow NFTs are
//! the system of record.
//!
//! One module instance serves one [`ConditionKind`], matching how each gate
//! is registered with the hub under its own address:
//!
//! ```text
//! erc721        → SingleAsset          multiple_and  → MultiAssetAll
//! erc721_token  → SpecificToken        multiple_or   → MultiAssetAny
//! erc1155       → MultiTokenBalance
//! ```

use crate::condition::{Condition, ConditionKind};
use lens_core::prelude::*;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Follow module gating on asset ownership
pub struct GatedFollowModule {
    address: Address,
    hub: Address,
    kind: ConditionKind,
    assets: Arc<dyn AssetRegistry>,
    bindings: RwLock<HashMap<ProfileId, Condition>>,
}

impl GatedFollowModule {
    pub fn new(
        address: Address,
        hub: Address,
        kind: ConditionKind,
        assets: Arc<dyn AssetRegistry>,
    ) -> Self {
        Self {
            address,
            hub,
            kind,
            assets,
            bindings: RwLock::new(HashMap::new()),
        }
    }

    /// Gate on owning at least one NFT of a collection
    pub fn erc721(address: Address, hub: Address, assets: Arc<dyn AssetRegistry>) -> Self {
        Self::new(address, hub, ConditionKind::SingleAsset, assets)
    }

    /// Gate on owning one specific NFT
    pub fn erc721_token(address: Address, hub: Address, assets: Arc<dyn AssetRegistry>) -> Self {
        Self::new(address, hub, ConditionKind::SpecificToken, assets)
    }

    /// Gate on owning every collection in a list
    pub fn multiple_and(address: Address, hub: Address, assets: Arc<dyn AssetRegistry>) -> Self {
        Self::new(address, hub, ConditionKind::MultiAssetAll, assets)
    }

    /// Gate on owning any collection in a list
    pub fn multiple_or(address: Address, hub: Address, assets: Arc<dyn AssetRegistry>) -> Self {
        Self::new(address, hub, ConditionKind::MultiAssetAny, assets)
    }

    /// Gate on a multi-token balance threshold
    pub fn erc1155(address: Address, hub: Address, assets: Arc<dyn AssetRegistry>) -> Self {
        Self::new(address, hub, ConditionKind::MultiTokenBalance, assets)
    }

    pub fn kind(&self) -> ConditionKind {
        self.kind
    }

    /// Condition bound to `profile`, if any
    pub fn condition(&self, profile: ProfileId) -> Option<Condition> {
        self.bindings.read().get(&profile).cloned()
    }

    /// Whether `holder` currently satisfies the condition of `profile`
    pub fn is_eligible(&self, profile: ProfileId, holder: &Address) -> bool {
        self.condition(profile)
            .map(|c| c.evaluate(holder, self.assets.as_ref()))
            .unwrap_or(false)
    }

    fn bound(&self, profile: ProfileId) -> Result<Condition> {
        self.condition(profile).ok_or_else(|| {
            ModuleError::UnknownBinding(format!("profile {} on follow module {}", profile, self.address))
        })
    }
}

impl FollowModule for GatedFollowModule {
    fn address(&self) -> Address {
        self.address
    }

    fn hub(&self) -> Address {
        self.hub
    }

    fn initialize(&self, caller: &Address, profile: ProfileId, data: &[u8]) -> Result<Vec<u8>> {
        ensure_hub(&self.hub, caller)?;

        let condition = Condition::decode(self.kind, data)?;
        let ack = condition.ack_bytes();

        tracing::info!(%profile, kind = ?self.kind, "follow module bound");
        self.bindings.write().insert(profile, condition);

        Ok(ack)
    }

    fn process_follow(
        &self,
        caller: &Address,
        follower: &Address,
        profile: ProfileId,
        _data: &[u8],
    ) -> Result<()> {
        ensure_hub(&self.hub, caller)?;

        let condition = self.bound(profile)?;
        if !condition.evaluate(follower, self.assets.as_ref()) {
            tracing::debug!(%profile, %follower, "follow rejected");
            return Err(ModuleError::IneligibleFollower {
                follower: *follower,
                profile,
                reason: condition.rejection_reason().to_string(),
            });
        }

        Ok(())
    }

    fn on_follow_nft_transfer(
        &self,
        caller: &Address,
        profile: ProfileId,
        _from: &Address,
        to: &Address,
        follow_nft_id: u64,
    ) -> Result<()> {
        ensure_hub(&self.hub, caller)?;

        let condition = self.bound(profile)?;
        if let Condition::MultiTokenBalance { transferable, .. } = condition {
            if !transferable {
                return Err(ModuleError::FollowNftNotTransferable { profile });
            }
            if !condition.evaluate(to, self.assets.as_ref()) {
                return Err(ModuleError::IneligibleFollower {
                    follower: *to,
                    profile,
                    reason: condition.rejection_reason().to_string(),
                });
            }
        }

        tracing::debug!(%profile, follow_nft_id, %to, "follow nft transfer accepted");
        Ok(())
    }
}
