//! # Lens Follow Modules
//!
//! Follow modules decide whether an account may follow a profile. The hub
//! calls `initialize` once when the profile selects a module and
//! `process_follow` on every follow attempt, reverting the follow when the
//! module rejects.
//!
//! ## Modules
//!
//! - [`GatedFollowModule`] - evaluates an asset-ownership [`Condition`]
//!   (single NFT, specific token, AND/OR lists, multi-token balance)
//! - [`PasscodeFollowModule`] - requires a shared numeric passcode

pub mod condition;
pub mod gated;
pub mod passcode;

#[cfg(test)]
pub(crate) mod testing;

pub use condition::{Condition, ConditionKind};
pub use gated::GatedFollowModule;
pub use passcode::PasscodeFollowModule;
