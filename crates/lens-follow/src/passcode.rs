//! Passcode follow module
//!
//! The profile owner configures a numeric passcode `(uint256)`; a follow goes
//! through only when the follow data carries the same number.

use lens_core::abi::{self, AbiType, AbiValue};
use lens_core::prelude::*;
use parking_lot::RwLock;
use std::collections::HashMap;

pub struct PasscodeFollowModule {
    address: Address,
    hub: Address,
    passcodes: RwLock<HashMap<ProfileId, u128>>,
}

impl PasscodeFollowModule {
    pub fn new(address: Address, hub: Address) -> Self {
        Self {
            address,
            hub,
            passcodes: RwLock::new(HashMap::new()),
        }
    }

    /// Follow data carrying `passcode`
    pub fn follow_data(passcode: u128) -> Vec<u8> {
        abi::encode(&[AbiValue::Uint(passcode)])
    }
}

fn decode_passcode(data: &[u8]) -> Option<u128> {
    match abi::decode(&[AbiType::Uint], data).ok()?.as_slice() {
        [AbiValue::Uint(code)] => Some(*code),
        _ => None,
    }
}

impl FollowModule for PasscodeFollowModule {
    fn address(&self) -> Address {
        self.address
    }

    fn hub(&self) -> Address {
        self.hub
    }

    fn initialize(&self, caller: &Address, profile: ProfileId, data: &[u8]) -> Result<Vec<u8>> {
        ensure_hub(&self.hub, caller)?;

        let passcode = decode_passcode(data).ok_or_else(|| {
            ModuleError::InvalidConfiguration("expected a single uint256 passcode".into())
        })?;
        self.passcodes.write().insert(profile, passcode);

        tracing::info!(%profile, "passcode follow module bound");
        // The passcode itself is never echoed into the audit event
        Ok(Vec::new())
    }

    fn process_follow(
        &self,
        caller: &Address,
        follower: &Address,
        profile: ProfileId,
        data: &[u8],
    ) -> Result<()> {
        ensure_hub(&self.hub, caller)?;

        let expected = self
            .passcodes
            .read()
            .get(&profile)
            .copied()
            .ok_or_else(|| ModuleError::UnknownBinding(format!("profile {}", profile)))?;

        if decode_passcode(data) != Some(expected) {
            return Err(ModuleError::IneligibleFollower {
                follower: *follower,
                profile,
                reason: "invalid passcode".into(),
            });
        }

        Ok(())
    }
}
