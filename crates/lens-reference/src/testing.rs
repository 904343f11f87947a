//! In-memory hub and token ledger double for unit tests

use lens_core::prelude::*;
use lens_core::{QueryError, TransferError};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

#[derive(Default)]
pub struct MockHub {
    owners: RwLock<HashMap<ProfileId, Address>>,
    follow_nfts: RwLock<HashMap<(ProfileId, Address), Amount>>,
    currencies: RwLock<HashSet<Address>>,
    balances: RwLock<HashMap<(Address, Address), Amount>>,
    allowances: RwLock<HashMap<(Address, Address, Address), Amount>>,
}

impl MockHub {
    pub fn create_profile(&self, profile: ProfileId, owner: Address) {
        self.owners.write().insert(profile, owner);
    }

    pub fn set_follow_nfts(&self, profile: ProfileId, holder: Address, amount: Amount) {
        self.follow_nfts.write().insert((profile, holder), amount);
    }

    pub fn whitelist(&self, currency: Address) {
        self.currencies.write().insert(currency);
    }

    pub fn mint(&self, asset: Address, holder: Address, amount: Amount) {
        *self.balances.write().entry((asset, holder)).or_insert(0) += amount;
    }

    pub fn approve(&self, asset: Address, owner: Address, spender: Address, amount: Amount) {
        self.allowances.write().insert((asset, owner, spender), amount);
    }

    pub fn balance(&self, asset: Address, holder: Address) -> Amount {
        self.balances
            .read()
            .get(&(asset, holder))
            .copied()
            .unwrap_or(0)
    }
}

impl ProfileRegistry for MockHub {
    fn profile_owner(&self, profile: ProfileId) -> Option<Address> {
        self.owners.read().get(&profile).copied()
    }

    fn follow_nft_balance(&self, profile: ProfileId, holder: &Address) -> Amount {
        self.follow_nfts
            .read()
            .get(&(profile, *holder))
            .copied()
            .unwrap_or(0)
    }
}

impl CurrencyWhitelist for MockHub {
    fn is_currency_whitelisted(&self, currency: &Address) -> bool {
        self.currencies.read().contains(currency)
    }
}

impl FungibleLedger for MockHub {
    fn allowance(
        &self,
        asset: &Address,
        owner: &Address,
        spender: &Address,
    ) -> std::result::Result<Amount, QueryError> {
        Ok(self
            .allowances
            .read()
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
    ) -> std::result::Result<(), TransferError> {
        let mut allowances = self.allowances.write();
        let mut balances = self.balances.write();

        let available = allowances
            .get(&(*asset, *from, *spender))
            .copied()
            .unwrap_or(0);
        if available < amount {
            return Err(TransferError::InsufficientAllowance {
                available,
                required: amount,
            });
        }
        let held = balances.get(&(*asset, *from)).copied().unwrap_or(0);
        if held < amount {
            return Err(TransferError::InsufficientBalance {
                available: held,
                required: amount,
            });
        }

        allowances.insert((*asset, *from, *spender), available - amount);
        balances.insert((*asset, *from), held - amount);
        *balances.entry((*asset, *to)).or_insert(0) += amount;
        Ok(())
    }
}
