//! Collaborator interfaces consumed by the modules
//!
//! The hub owns profiles and follow NFTs, asset contracts own balances. A
//! module only ever sees them through these traits, so a module can be driven
//! by the in-memory hub, by a test double, or by an on-chain adapter.

use crate::types::{Address, Amount, ProfileId, TokenId};
use thiserror::Error;

/// Failure of a read-only asset query
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unknown asset: {0}")]
    UnknownAsset(Address),

    #[error("Token {token_id} does not exist in asset {asset}")]
    NonexistentToken { asset: Address, token_id: TokenId },

    #[error("Asset ledger unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a fungible transfer directive
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Insufficient allowance: {available} available, {required} required")]
    InsufficientAllowance { available: Amount, required: Amount },

    #[error("Insufficient balance: {available} available, {required} required")]
    InsufficientBalance { available: Amount, required: Amount },

    #[error("Unknown asset: {0}")]
    UnknownAsset(Address),

    #[error("Transfer rejected: {0}")]
    Rejected(String),
}

/// Read-only ownership queries against asset contracts
pub trait AssetRegistry: Send + Sync {
    /// Number of units of `asset` held by `holder` (fungible or non-fungible)
    fn balance_of(&self, asset: &Address, holder: &Address) -> Result<Amount, QueryError>;

    /// Current owner of a single non-fungible token
    fn owner_of(&self, asset: &Address, token_id: TokenId) -> Result<Address, QueryError>;

    /// Balance of one id inside a multi-token asset
    fn multi_token_balance_of(
        &self,
        asset: &Address,
        token_id: TokenId,
        holder: &Address,
    ) -> Result<Amount, QueryError>;
}

/// Fungible asset ledger with delegated spending
pub trait FungibleLedger: Send + Sync {
    /// Amount `spender` may still move out of `owner`'s balance
    fn allowance(
        &self,
        asset: &Address,
        owner: &Address,
        spender: &Address,
    ) -> Result<Amount, QueryError>;

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming allowance.
    /// Either fully applies or has no effect.
    fn transfer_from(
        &self,
        asset: &Address,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TransferError>;
}

/// Read-only view of the hub's profile and follow bookkeeping
pub trait ProfileRegistry: Send + Sync {
    /// Account owning the profile, `None` when the profile does not exist
    fn profile_owner(&self, profile: ProfileId) -> Option<Address>;

    /// Number of follow NFTs of `profile` currently held by `holder`.
    /// Zero when the profile has no follow NFT collection yet.
    fn follow_nft_balance(&self, profile: ProfileId, holder: &Address) -> Amount;
}

/// Governance-maintained list of currencies usable by modules
pub trait CurrencyWhitelist: Send + Sync {
    fn is_currency_whitelisted(&self, currency: &Address) -> bool;
}
