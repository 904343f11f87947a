//! Error types for follow and reference module operations

use crate::abi::AbiError;
use crate::host::TransferError;
use crate::types::{Address, ProfileId};
use thiserror::Error;

/// Result type alias for module operations
pub type Result<T> = std::result::Result<T, ModuleError>;

/// Errors a module can signal to the hub. Any error aborts the whole call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    /// Caller is not the hub
    #[error("Unauthorized caller {caller}: modules only accept calls from the hub")]
    Unauthorized { caller: Address },

    /// Malformed or inconsistent init payload
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Follow predicate not satisfied
    #[error("{follower} is not eligible to follow profile {profile}: {reason}")]
    IneligibleFollower {
        follower: Address,
        profile: ProfileId,
        reason: String,
    },

    /// Follower-only gate not satisfied
    #[error("{actor} does not follow profile {profile}")]
    NotAFollower { actor: Address, profile: ProfileId },

    /// Reward payout transfer did not go through
    #[error("Reward transfer failed: {0}")]
    RewardTransferFailed(String),

    /// Process called for a profile or publication the module was never initialized for
    #[error("No module binding for {0}")]
    UnknownBinding(String),

    /// Follow NFT transfers are disabled by the follow module
    #[error("Follow NFTs of profile {profile} are not transferable")]
    FollowNftNotTransferable { profile: ProfileId },
}

impl ModuleError {
    /// Error code for audit events and API responses
    pub fn code(&self) -> u32 {
        match self {
            Self::Unauthorized { .. } => 2001,
            Self::InvalidConfiguration(_) => 2002,
            Self::IneligibleFollower { .. } => 2003,
            Self::NotAFollower { .. } => 2004,
            Self::RewardTransferFailed(_) => 2005,
            Self::UnknownBinding(_) => 2006,
            Self::FollowNftNotTransferable { .. } => 2007,
        }
    }

    /// Whether resubmitting the same action can succeed once the actor or
    /// publisher fixes their side (acquires eligibility, restores allowance)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::IneligibleFollower { .. }
                | Self::NotAFollower { .. }
                | Self::RewardTransferFailed(_)
        )
    }
}

impl From<AbiError> for ModuleError {
    fn from(err: AbiError) -> Self {
        Self::InvalidConfiguration(err.to_string())
    }
}

impl From<TransferError> for ModuleError {
    fn from(err: TransferError) -> Self {
        Self::RewardTransferFailed(err.to_string())
    }
}
