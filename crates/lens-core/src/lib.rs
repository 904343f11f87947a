//! # Lens Module Core
//!
//! Shared building blocks for Lens follow and reference modules:
//! - `types` - addresses, profile/publication ids, reference actions
//! - `abi` - strict positional codec for module configuration bytes
//! - `host` - interfaces of the collaborators modules query (assets, hub)
//! - `module` - the capability traits the hub invokes
//! - `error` - the error taxonomy every module reports in
//!
//! ## Call Model
//!
//! Every call into a module is atomic: it either commits fully or fails with
//! a [`ModuleError`] and leaves no trace. Calls are observed in one global
//! order, so there is no interleaving inside a call.

pub mod abi;
pub mod error;
pub mod host;
pub mod module;
pub mod types;

pub use error::*;
pub use host::*;
pub use module::*;
pub use types::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::abi::{AbiType, AbiValue};
    pub use crate::error::{ModuleError, Result};
    pub use crate::host::{AssetRegistry, CurrencyWhitelist, FungibleLedger, ProfileRegistry};
    pub use crate::module::{ensure_hub, FollowModule, ReferenceModule};
    pub use crate::types::*;
}

/// Token constants
pub mod constants {
    /// Decimal places of reward currencies
    pub const DECIMALS: u8 = 18;

    /// One whole token in smallest units
    pub const ONE_TOKEN: u128 = 1_000_000_000_000_000_000; // 10^18

    /// Basis-point denominator
    pub const BPS_DENOMINATOR: u32 = 10_000;
}

pub use constants::*;
