//! Error types for the hub and the asset book

use crate::assets::AssetKind;
use lens_core::{Address, Amount, ModuleError, ProfileId, PublicationId, TokenId, TransferError};
use thiserror::Error;

/// Result type alias for hub operations
pub type Result<T> = std::result::Result<T, HubError>;

/// Asset book failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("Unknown asset: {0}")]
    UnknownAsset(Address),

    #[error("Asset {asset} is {found:?}, not {expected:?}")]
    KindMismatch {
        asset: Address,
        expected: AssetKind,
        found: AssetKind,
    },

    #[error("Insufficient balance: {available} available, {required} required")]
    InsufficientBalance { available: Amount, required: Amount },

    #[error("Insufficient allowance: {available} available, {required} required")]
    InsufficientAllowance { available: Amount, required: Amount },

    #[error("Token {token_id} of {asset} already minted")]
    TokenAlreadyMinted { asset: Address, token_id: TokenId },

    #[error("Token {token_id} of {asset} does not exist")]
    NonexistentToken { asset: Address, token_id: TokenId },

    #[error("{holder} does not own token {token_id} of {asset}")]
    NotTokenOwner {
        asset: Address,
        token_id: TokenId,
        holder: Address,
    },
}

impl AssetError {
    pub fn code(&self) -> u32 {
        match self {
            Self::UnknownAsset(_) => 4001,
            Self::KindMismatch { .. } => 4002,
            Self::InsufficientBalance { .. } => 4003,
            Self::InsufficientAllowance { .. } => 4004,
            Self::TokenAlreadyMinted { .. } => 4005,
            Self::NonexistentToken { .. } => 4006,
            Self::NotTokenOwner { .. } => 4007,
        }
    }
}

impl From<AssetError> for TransferError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::InsufficientAllowance {
                available,
                required,
            } => Self::InsufficientAllowance {
                available,
                required,
            },
            AssetError::InsufficientBalance {
                available,
                required,
            } => Self::InsufficientBalance {
                available,
                required,
            },
            AssetError::UnknownAsset(asset) => Self::UnknownAsset(asset),
            other => Self::Rejected(other.to_string()),
        }
    }
}

/// Hub errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    #[error("Module rejected the call: {0}")]
    Module(#[from] ModuleError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Profile not found: {0}")]
    UnknownProfile(ProfileId),

    #[error("Publication not found: {0}")]
    UnknownPublication(PublicationId),

    #[error("Module {0} is not registered with this hub")]
    UnknownModule(Address),

    #[error("Module {0} is not whitelisted")]
    ModuleNotWhitelisted(Address),

    #[error("Module {module} is bound to hub {bound}, not this hub")]
    ForeignModule { module: Address, bound: Address },

    #[error("{caller} does not own profile {profile}")]
    NotProfileOwner { caller: Address, profile: ProfileId },

    #[error("{0} is not the governance account")]
    NotGovernance(Address),

    #[error("Follow NFT {follow_nft_id} of profile {profile} does not exist")]
    UnknownFollowNft { profile: ProfileId, follow_nft_id: u64 },

    #[error("{caller} does not own follow NFT {follow_nft_id} of profile {profile}")]
    NotFollowNftOwner {
        caller: Address,
        profile: ProfileId,
        follow_nft_id: u64,
    },

    #[error("Handle already taken: {0}")]
    HandleTaken(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl HubError {
    /// Error code for events and CLI output
    pub fn code(&self) -> u32 {
        match self {
            Self::Module(e) => e.code(),
            Self::Asset(e) => e.code(),
            Self::UnknownProfile(_) => 3001,
            Self::UnknownPublication(_) => 3002,
            Self::UnknownModule(_) => 3003,
            Self::ModuleNotWhitelisted(_) => 3004,
            Self::ForeignModule { .. } => 3005,
            Self::NotProfileOwner { .. } => 3006,
            Self::NotGovernance(_) => 3007,
            Self::UnknownFollowNft { .. } => 3008,
            Self::NotFollowNftOwner { .. } => 3009,
            Self::HandleTaken(_) => 3010,
            Self::Config(_) => 3011,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Module(e) => e.is_retryable(),
            Self::Asset(AssetError::InsufficientBalance { .. })
            | Self::Asset(AssetError::InsufficientAllowance { .. }) => true,
            _ => false,
        }
    }
}
