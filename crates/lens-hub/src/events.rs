//! Hub audit events

use lens_core::{Address, ProfileId, PublicationId};
use serde::{Deserialize, Serialize};

/// Module family, for whitelist events
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleFamily {
    Follow,
    Reference,
}

/// Everything the hub reports after a successful call
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HubEvent {
    ModuleWhitelisted {
        family: ModuleFamily,
        module: Address,
        whitelisted: bool,
    },
    CurrencyWhitelisted {
        currency: Address,
        whitelisted: bool,
    },
    ProfileCreated {
        profile: ProfileId,
        owner: Address,
        handle: String,
    },
    FollowModuleSet {
        profile: ProfileId,
        module: Option<Address>,
        #[serde(with = "hex_bytes")]
        ack: Vec<u8>,
    },
    Followed {
        follower: Address,
        profile: ProfileId,
        follow_nft_id: u64,
    },
    FollowNftTransferred {
        profile: ProfileId,
        follow_nft_id: u64,
        from: Address,
        to: Address,
    },
    PostCreated {
        publication: PublicationId,
        reference_module: Option<Address>,
        #[serde(with = "hex_bytes")]
        ack: Vec<u8>,
    },
    CommentCreated {
        publication: PublicationId,
        pointed: PublicationId,
        reference_module: Option<Address>,
        #[serde(with = "hex_bytes")]
        ack: Vec<u8>,
    },
    MirrorCreated {
        publication: PublicationId,
        pointed: PublicationId,
    },
}

/// An event with its position in the hub's history
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub sequence: u64,

    /// Unix timestamp (milliseconds)
    pub timestamp: i64,

    #[serde(flatten)]
    pub event: HubEvent,
}

/// `0x`-prefixed hex for opaque byte strings
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)
    }
}
