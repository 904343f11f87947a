//! # Lens Hub
//!
//! In-memory host for the follow and reference modules: the hub that owns
//! profiles, follow NFTs and publications, and the asset book that owns
//! balances, allowances and NFT ownership.
//!
//! ```text
//!   Hub ──initialize / process──► modules
//!    │                              │
//!    │ owns                         ├── profile_owner, follow_nft_balance ──► HubRegistry
//!    ▼                              └── balance_of, transfer_from ──────────► AssetBook
//!   HubRegistry
//! ```

pub mod assets;
pub mod config;
pub mod deploy;
pub mod error;
pub mod events;
pub mod hub;
pub mod registry;

pub use assets::{AssetBook, AssetKind};
pub use config::HubConfig;
pub use deploy::Deployment;
pub use error::{AssetError, HubError, Result};
pub use events::{EventRecord, HubEvent, ModuleFamily};
pub use hub::{CommentData, Hub, MirrorData, PostData, Publication, PublicationKind};
pub use registry::{HubRegistry, Profile};
