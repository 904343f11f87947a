//! # Asset Book
//!
//! In-memory stand-in for the token contracts the modules query. Every asset
//! address is typed by the first operation that touches it:
//!
//! | Kind | Operations | Module view |
//! |------|------------|-------------|
//! | Fungible | mint, approve, transfer, transfer_from | `balance_of`, `allowance` |
//! | NonFungible | mint_nft, transfer_nft | `balance_of` (count), `owner_of` |
//! | MultiToken | mint_multi, transfer_multi | `multi_token_balance_of` |
//!
//! All book-keeping sits behind a single lock, so a `transfer_from` checks
//! allowance and balance and moves funds in one step.

use crate::error::AssetError;
use lens_core::{
    Address, Amount, AssetRegistry, FungibleLedger, QueryError, TokenId, TransferError,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Token standard of an asset address
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Fungible,
    NonFungible,
    MultiToken,
}

#[derive(Default)]
struct Books {
    kinds: HashMap<Address, AssetKind>,
    balances: HashMap<(Address, Address), Amount>,
    allowances: HashMap<(Address, Address, Address), Amount>,
    owners: HashMap<(Address, TokenId), Address>,
    multi: HashMap<(Address, TokenId, Address), Amount>,
}

impl Books {
    /// Bind `asset` to `kind` on first use, reject a conflicting kind afterwards
    fn claim(&mut self, asset: Address, kind: AssetKind) -> Result<(), AssetError> {
        match self.kinds.get(&asset) {
            Some(found) if *found != kind => Err(AssetError::KindMismatch {
                asset,
                expected: kind,
                found: *found,
            }),
            Some(_) => Ok(()),
            None => {
                self.kinds.insert(asset, kind);
                Ok(())
            }
        }
    }

    fn check_kind(&self, asset: &Address, kind: AssetKind) -> Result<(), AssetError> {
        match self.kinds.get(asset) {
            None => Err(AssetError::UnknownAsset(*asset)),
            Some(found) if *found != kind => Err(AssetError::KindMismatch {
                asset: *asset,
                expected: kind,
                found: *found,
            }),
            Some(_) => Ok(()),
        }
    }

    fn balance(&self, asset: &Address, holder: &Address) -> Amount {
        self.balances.get(&(*asset, *holder)).copied().unwrap_or(0)
    }

    fn move_fungible(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), AssetError> {
        let held = self.balance(&asset, &from);
        if held < amount {
            return Err(AssetError::InsufficientBalance {
                available: held,
                required: amount,
            });
        }
        self.balances.insert((asset, from), held - amount);
        *self.balances.entry((asset, to)).or_insert(0) += amount;
        Ok(())
    }
}

/// Balances, allowances and ownership of every asset known to the hub
#[derive(Default)]
pub struct AssetBook {
    books: RwLock<Books>,
}

impl AssetBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self, asset: &Address) -> Option<AssetKind> {
        self.books.read().kinds.get(asset).copied()
    }

    // Fungible

    pub fn mint(&self, asset: Address, to: Address, amount: Amount) -> Result<(), AssetError> {
        let mut books = self.books.write();
        books.claim(asset, AssetKind::Fungible)?;
        *books.balances.entry((asset, to)).or_insert(0) += amount;
        tracing::debug!(%asset, %to, %amount, "minted");
        Ok(())
    }

    /// Set (not add to) the amount `spender` may move out of `owner`'s balance
    pub fn approve(
        &self,
        asset: Address,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), AssetError> {
        let mut books = self.books.write();
        books.claim(asset, AssetKind::Fungible)?;
        books.allowances.insert((asset, owner, spender), amount);
        tracing::debug!(%asset, %owner, %spender, %amount, "approved");
        Ok(())
    }

    pub fn transfer(
        &self,
        asset: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), AssetError> {
        let mut books = self.books.write();
        books.check_kind(&asset, AssetKind::Fungible)?;
        books.move_fungible(asset, from, to, amount)
    }

    pub fn balance(&self, asset: &Address, holder: &Address) -> Amount {
        self.books.read().balance(asset, holder)
    }

    // Non-fungible

    pub fn mint_nft(&self, asset: Address, to: Address, token_id: TokenId) -> Result<(), AssetError> {
        let mut books = self.books.write();
        books.claim(asset, AssetKind::NonFungible)?;
        if books.owners.contains_key(&(asset, token_id)) {
            return Err(AssetError::TokenAlreadyMinted { asset, token_id });
        }
        books.owners.insert((asset, token_id), to);
        *books.balances.entry((asset, to)).or_insert(0) += 1;
        Ok(())
    }

    pub fn transfer_nft(
        &self,
        asset: Address,
        from: Address,
        to: Address,
        token_id: TokenId,
    ) -> Result<(), AssetError> {
        let mut books = self.books.write();
        books.check_kind(&asset, AssetKind::NonFungible)?;
        match books.owners.get(&(asset, token_id)) {
            None => return Err(AssetError::NonexistentToken { asset, token_id }),
            Some(owner) if *owner != from => {
                return Err(AssetError::NotTokenOwner {
                    asset,
                    token_id,
                    holder: from,
                })
            }
            Some(_) => {}
        }
        books.owners.insert((asset, token_id), to);
        books.move_fungible(asset, from, to, 1)
    }

    // Multi-token

    pub fn mint_multi(
        &self,
        asset: Address,
        token_id: TokenId,
        to: Address,
        amount: Amount,
    ) -> Result<(), AssetError> {
        let mut books = self.books.write();
        books.claim(asset, AssetKind::MultiToken)?;
        *books.multi.entry((asset, token_id, to)).or_insert(0) += amount;
        Ok(())
    }

    pub fn transfer_multi(
        &self,
        asset: Address,
        token_id: TokenId,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), AssetError> {
        let mut books = self.books.write();
        books.check_kind(&asset, AssetKind::MultiToken)?;
        let held = books.multi.get(&(asset, token_id, from)).copied().unwrap_or(0);
        if held < amount {
            return Err(AssetError::InsufficientBalance {
                available: held,
                required: amount,
            });
        }
        books.multi.insert((asset, token_id, from), held - amount);
        *books.multi.entry((asset, token_id, to)).or_insert(0) += amount;
        Ok(())
    }
}

fn query_error(err: AssetError) -> QueryError {
    match err {
        AssetError::UnknownAsset(asset) => QueryError::UnknownAsset(asset),
        AssetError::NonexistentToken { asset, token_id } => {
            QueryError::NonexistentToken { asset, token_id }
        }
        other => QueryError::Unavailable(other.to_string()),
    }
}

impl AssetRegistry for AssetBook {
    fn balance_of(&self, asset: &Address, holder: &Address) -> Result<Amount, QueryError> {
        let books = self.books.read();
        match books.kinds.get(asset) {
            Some(AssetKind::Fungible) | Some(AssetKind::NonFungible) => {
                Ok(books.balance(asset, holder))
            }
            Some(AssetKind::MultiToken) => Err(QueryError::Unavailable(format!(
                "{} is a multi-token asset",
                asset
            ))),
            None => Err(QueryError::UnknownAsset(*asset)),
        }
    }

    fn owner_of(&self, asset: &Address, token_id: TokenId) -> Result<Address, QueryError> {
        let books = self.books.read();
        books
            .check_kind(asset, AssetKind::NonFungible)
            .map_err(query_error)?;
        books
            .owners
            .get(&(*asset, token_id))
            .copied()
            .ok_or(QueryError::NonexistentToken {
                asset: *asset,
                token_id,
            })
    }

    fn multi_token_balance_of(
        &self,
        asset: &Address,
        token_id: TokenId,
        holder: &Address,
    ) -> Result<Amount, QueryError> {
        let books = self.books.read();
        books
            .check_kind(asset, AssetKind::MultiToken)
            .map_err(query_error)?;
        Ok(books
            .multi
            .get(&(*asset, token_id, *holder))
            .copied()
            .unwrap_or(0))
    }
}

impl FungibleLedger for AssetBook {
    fn allowance(
        &self,
        asset: &Address,
        owner: &Address,
        spender: &Address,
    ) -> Result<Amount, QueryError> {
        let books = self.books.read();
        books
            .check_kind(asset, AssetKind::Fungible)
            .map_err(query_error)?;
        Ok(books
            .allowances
            .get(&(*asset, *owner, *spender))
            .copied()
            .unwrap_or(0))
    }

    fn transfer_from(
        &self,
        asset: &Address,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TransferError> {
        let mut books = self.books.write();
        books.check_kind(asset, AssetKind::Fungible)?;

        let key = (*asset, *from, *spender);
        let available = books.allowances.get(&key).copied().unwrap_or(0);
        if available < amount {
            return Err(AssetError::InsufficientAllowance {
                available,
                required: amount,
            }
            .into());
        }
        books.move_fungible(*asset, *from, *to, amount)?;
        books.allowances.insert(key, available - amount);

        tracing::debug!(%asset, %spender, %from, %to, %amount, "transfer_from");
        Ok(())
    }
}
