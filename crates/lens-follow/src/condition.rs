//! # Eligibility Predicate
//!
//! A [`Condition`] is a boolean predicate over asset ownership, evaluated
//! against an external [`AssetRegistry`]:
//!
//! | Variant | Config tuple | Satisfied when |
//! |---------|--------------|----------------|
//! | `SingleAsset` | `(address)` | holder owns at least one unit |
//! | `SpecificToken` | `(address, uint256)` | holder owns that token id |
//! | `MultiAssetAll` | `(address[])` | every listed asset is owned |
//! | `MultiAssetAny` | `(address[])` | at least one listed asset is owned |
//! | `MultiTokenBalance` | `(address, uint256, uint256, bool)` | multi-token balance ≥ minimum |
//!
//! In the list variants the zero address is a disabled slot: it counts as
//! satisfied and is never queried.

use lens_core::abi::{self, AbiType, AbiValue};
use lens_core::prelude::*;
use serde::{Deserialize, Serialize};

/// Which layout a module decodes its configuration with
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    SingleAsset,
    SpecificToken,
    MultiAssetAll,
    MultiAssetAny,
    MultiTokenBalance,
}

impl ConditionKind {
    /// Positional field layout of the config bytes
    pub fn layout(&self) -> &'static [AbiType] {
        match self {
            Self::SingleAsset => &[AbiType::Address],
            Self::SpecificToken => &[AbiType::Address, AbiType::Uint],
            Self::MultiAssetAll | Self::MultiAssetAny => &[AbiType::AddressArray],
            Self::MultiTokenBalance => &[
                AbiType::Address,
                AbiType::Uint,
                AbiType::Uint,
                AbiType::Bool,
            ],
        }
    }
}

/// Asset-ownership condition bound to a profile
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    SingleAsset {
        asset: Address,
    },
    SpecificToken {
        asset: Address,
        token_id: TokenId,
    },
    MultiAssetAll {
        assets: Vec<Address>,
    },
    MultiAssetAny {
        assets: Vec<Address>,
    },
    MultiTokenBalance {
        asset: Address,
        token_id: TokenId,
        min_balance: Amount,
        /// Whether follow NFTs minted under this condition may change hands
        transferable: bool,
    },
}

impl Condition {
    pub fn kind(&self) -> ConditionKind {
        match self {
            Self::SingleAsset { .. } => ConditionKind::SingleAsset,
            Self::SpecificToken { .. } => ConditionKind::SpecificToken,
            Self::MultiAssetAll { .. } => ConditionKind::MultiAssetAll,
            Self::MultiAssetAny { .. } => ConditionKind::MultiAssetAny,
            Self::MultiTokenBalance { .. } => ConditionKind::MultiTokenBalance,
        }
    }

    /// Decode and validate config bytes for `kind`
    pub fn decode(kind: ConditionKind, data: &[u8]) -> Result<Self> {
        let values = abi::decode(kind.layout(), data)?;

        let condition = match (kind, values.as_slice()) {
            (ConditionKind::SingleAsset, [AbiValue::Address(asset)]) => {
                Self::SingleAsset { asset: *asset }
            }
            (ConditionKind::SpecificToken, [AbiValue::Address(asset), AbiValue::Uint(id)]) => {
                Self::SpecificToken {
                    asset: *asset,
                    token_id: *id,
                }
            }
            (ConditionKind::MultiAssetAll, [AbiValue::AddressArray(assets)]) => {
                Self::MultiAssetAll {
                    assets: assets.clone(),
                }
            }
            (ConditionKind::MultiAssetAny, [AbiValue::AddressArray(assets)]) => {
                Self::MultiAssetAny {
                    assets: assets.clone(),
                }
            }
            (
                ConditionKind::MultiTokenBalance,
                [AbiValue::Address(asset), AbiValue::Uint(id), AbiValue::Uint(min), AbiValue::Bool(transferable)],
            ) => Self::MultiTokenBalance {
                asset: *asset,
                token_id: *id,
                min_balance: *min,
                transferable: *transferable,
            },
            _ => {
                return Err(ModuleError::InvalidConfiguration(format!(
                    "config does not match the {:?} layout",
                    kind
                )))
            }
        };

        condition.validate()?;
        Ok(condition)
    }

    /// Canonical config bytes for this condition
    pub fn encode(&self) -> Vec<u8> {
        let values = match self {
            Self::SingleAsset { asset } => vec![AbiValue::Address(*asset)],
            Self::SpecificToken { asset, token_id } => {
                vec![AbiValue::Address(*asset), AbiValue::Uint(*token_id)]
            }
            Self::MultiAssetAll { assets } | Self::MultiAssetAny { assets } => {
                vec![AbiValue::AddressArray(assets.clone())]
            }
            Self::MultiTokenBalance {
                asset,
                token_id,
                min_balance,
                transferable,
            } => vec![
                AbiValue::Address(*asset),
                AbiValue::Uint(*token_id),
                AbiValue::Uint(*min_balance),
                AbiValue::Bool(*transferable),
            ],
        };
        abi::encode(&values)
    }

    /// Bytes returned to the hub for its audit event.
    ///
    /// Empty for the NFT-gating variants, the canonical encoding for the
    /// multi-token variant.
    pub fn ack_bytes(&self) -> Vec<u8> {
        match self {
            Self::MultiTokenBalance { .. } => self.encode(),
            _ => Vec::new(),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Self::SingleAsset { asset }
            | Self::SpecificToken { asset, .. }
            | Self::MultiTokenBalance { asset, .. }
                if asset.is_zero() =>
            {
                Err(ModuleError::InvalidConfiguration(
                    "zero asset is only allowed as a disabled slot in an asset list".into(),
                ))
            }
            Self::MultiAssetAll { assets } | Self::MultiAssetAny { assets } if assets.is_empty() => {
                Err(ModuleError::InvalidConfiguration(
                    "asset list must not be empty".into(),
                ))
            }
            Self::MultiTokenBalance { min_balance: 0, .. } => Err(
                ModuleError::InvalidConfiguration("minimum balance must be at least 1".into()),
            ),
            _ => Ok(()),
        }
    }

    /// Evaluate the predicate for `holder`.
    ///
    /// A failing query counts as "not satisfied".
    pub fn evaluate(&self, holder: &Address, assets: &dyn AssetRegistry) -> bool {
        match self {
            Self::SingleAsset { asset } => owns_any(assets, asset, holder),
            Self::SpecificToken { asset, token_id } => match assets.owner_of(asset, *token_id) {
                Ok(owner) => owner == *holder,
                Err(err) => {
                    tracing::debug!(%asset, %token_id, error = %err, "owner query failed");
                    false
                }
            },
            Self::MultiAssetAll { assets: list } => list
                .iter()
                .all(|asset| asset.is_zero() || owns_any(assets, asset, holder)),
            Self::MultiAssetAny { assets: list } => list
                .iter()
                .any(|asset| asset.is_zero() || owns_any(assets, asset, holder)),
            Self::MultiTokenBalance {
                asset,
                token_id,
                min_balance,
                ..
            } => match assets.multi_token_balance_of(asset, *token_id, holder) {
                Ok(balance) => balance >= *min_balance,
                Err(err) => {
                    tracing::debug!(%asset, %token_id, error = %err, "multi-token query failed");
                    false
                }
            },
        }
    }

    /// Short reason used when the predicate rejects a holder
    pub fn rejection_reason(&self) -> &'static str {
        match self {
            Self::SingleAsset { .. } | Self::MultiAssetAll { .. } | Self::MultiAssetAny { .. } => {
                "insufficient NFT balance"
            }
            Self::SpecificToken { .. } => "does not own the required token",
            Self::MultiTokenBalance { .. } => "insufficient multi-token balance",
        }
    }
}

fn owns_any(assets: &dyn AssetRegistry, asset: &Address, holder: &Address) -> bool {
    match assets.balance_of(asset, holder) {
        Ok(balance) => balance >= 1,
        Err(err) => {
            tracing::debug!(%asset, %holder, error = %err, "balance query failed");
            false
        }
    }
}
