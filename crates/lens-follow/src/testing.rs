//! In-memory asset registry double for unit tests

use lens_core::prelude::*;
use lens_core::QueryError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct MockAssets {
    balances: RwLock<HashMap<(Address, Address), Amount>>,
    owners: RwLock<HashMap<(Address, TokenId), Address>>,
    multi: RwLock<HashMap<(Address, TokenId, Address), Amount>>,
    unavailable: RwLock<bool>,
    queries: AtomicUsize,
}

impl MockAssets {
    pub fn give(&self, asset: Address, holder: Address, amount: Amount) {
        *self.balances.write().entry((asset, holder)).or_insert(0) += amount;
    }

    pub fn take_all(&self, asset: Address, holder: Address) {
        self.balances.write().remove(&(asset, holder));
    }

    pub fn set_owner(&self, asset: Address, token_id: TokenId, owner: Address) {
        self.owners.write().insert((asset, token_id), owner);
    }

    pub fn give_multi(&self, asset: Address, token_id: TokenId, holder: Address, amount: Amount) {
        *self
            .multi
            .write()
            .entry((asset, token_id, holder))
            .or_insert(0) += amount;
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write() = unavailable;
    }

    /// Number of queries answered so far
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn record(&self) -> std::result::Result<(), QueryError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if *self.unavailable.read() {
            return Err(QueryError::Unavailable("mock offline".into()));
        }
        Ok(())
    }
}

impl AssetRegistry for MockAssets {
    fn balance_of(&self, asset: &Address, holder: &Address) -> std::result::Result<Amount, QueryError> {
        self.record()?;
        Ok(self
            .balances
            .read()
            .get(&(*asset, *holder))
            .copied()
            .unwrap_or(0))
    }

    fn owner_of(&self, asset: &Address, token_id: TokenId) -> std::result::Result<Address, QueryError> {
        self.record()?;
        self.owners
            .read()
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
    ) -> std::result::Result<Amount, QueryError> {
        self.record()?;
        Ok(self
            .multi
            .read()
            .get(&(*asset, token_id, *holder))
            .copied()
            .unwrap_or(0))
    }
}
