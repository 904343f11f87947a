//! # Module Capability Interfaces
//!
//! The hub invokes modules through two fixed interfaces. Each module is bound
//! to one hub address at construction and checks the caller itself on every
//! entry point; it never trusts that the hub filtered callers.
//!
//! ```text
//!   hub ──initialize(profile, bytes)──► FollowModule     ──► ack bytes
//!   hub ──process_follow(follower)────► FollowModule     ──► Ok | Err
//!   hub ──initialize(publication)─────► ReferenceModule  ──► ack bytes
//!   hub ──process(ctx)────────────────► ReferenceModule  ──► Ok | Err (may pay out)
//! ```

use crate::error::{ModuleError, Result};
use crate::types::{Address, ProfileId, PublicationId, ReferenceContext};

/// Reject any caller other than the hub
pub fn ensure_hub(hub: &Address, caller: &Address) -> Result<()> {
    if caller != hub {
        tracing::warn!(%caller, %hub, "rejected module call from non-hub caller");
        return Err(ModuleError::Unauthorized { caller: *caller });
    }
    Ok(())
}

/// Policy deciding whether an account may follow a profile
pub trait FollowModule: Send + Sync {
    /// Address the module is registered under
    fn address(&self) -> Address;

    /// Hub allowed to call this module
    fn hub(&self) -> Address;

    /// Bind the module to `profile` with opaque configuration bytes.
    /// Returns the bytes the hub emits in its audit event.
    fn initialize(&self, caller: &Address, profile: ProfileId, data: &[u8]) -> Result<Vec<u8>>;

    /// Gate a follow attempt. No state is recorded on success.
    fn process_follow(
        &self,
        caller: &Address,
        follower: &Address,
        profile: ProfileId,
        data: &[u8],
    ) -> Result<()>;

    /// Called by the hub before a follow NFT of `profile` changes hands
    /// between two accounts. Accepts by default.
    fn on_follow_nft_transfer(
        &self,
        caller: &Address,
        profile: ProfileId,
        _from: &Address,
        _to: &Address,
        _follow_nft_id: u64,
    ) -> Result<()> {
        ensure_hub(&self.hub(), caller)?;
        tracing::debug!(%profile, "follow nft transfer accepted");
        Ok(())
    }
}

/// Policy deciding whether an account may comment on or mirror a publication
pub trait ReferenceModule: Send + Sync {
    /// Address the module is registered under
    fn address(&self) -> Address;

    /// Hub allowed to call this module
    fn hub(&self) -> Address;

    /// Bind the module to `publication`. Returns the audit bytes.
    fn initialize(
        &self,
        caller: &Address,
        publication: PublicationId,
        data: &[u8],
    ) -> Result<Vec<u8>>;

    /// Gate a comment or mirror, paying out any reward before returning
    fn process(&self, caller: &Address, ctx: &ReferenceContext, data: &[u8]) -> Result<()>;
}
