//! Live follower check shared by the follower-only gates

use lens_core::prelude::*;

/// Whether `actor` may act as a follower of `profile` right now.
///
/// The profile owner always passes. Anyone else must currently hold at least
/// one follow NFT of the profile; having followed in the past is not enough.
pub fn is_follower(profiles: &dyn ProfileRegistry, profile: ProfileId, actor: &Address) -> bool {
    if profiles.profile_owner(profile).as_ref() == Some(actor) {
        return true;
    }
    profiles.follow_nft_balance(profile, actor) > 0
}

/// [`is_follower`] as a call guard
pub fn ensure_follower(
    profiles: &dyn ProfileRegistry,
    profile: ProfileId,
    actor: &Address,
) -> Result<()> {
    if !is_follower(profiles, profile, actor) {
        tracing::debug!(%profile, %actor, "actor holds no follow nft");
        return Err(ModuleError::NotAFollower {
            actor: *actor,
            profile,
        });
    }
    Ok(())
}
