//! Hub configuration types

use crate::error::{HubError, Result};
use lens_core::Address;
use lens_reference::{ExponentialDecay, DEFAULT_RETENTION_BPS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete hub configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HubConfig {
    /// Hub and governance accounts
    #[serde(default)]
    pub hub: HubSettings,

    /// Addresses the modules are deployed under
    #[serde(default)]
    pub modules: ModuleAddresses,

    /// Mirror reward schedule
    #[serde(default)]
    pub rewards: RewardSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HubConfig {
    /// Load from a TOML file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "config not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| HubError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| HubError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| HubError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.rewards.schedule()?;
        if self.hub.address == self.hub.governance {
            return Err(HubError::Config(
                "hub and governance must be distinct accounts".into(),
            ));
        }
        Ok(())
    }
}

/// Hub accounts
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HubSettings {
    #[serde(default = "default_hub_address")]
    pub address: Address,

    #[serde(default = "default_governance")]
    pub governance: Address,
}

fn default_hub_address() -> Address {
    Address::derive("lens-hub")
}

fn default_governance() -> Address {
    Address::derive("lens-governance")
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            address: default_hub_address(),
            governance: default_governance(),
        }
    }
}

/// Module deployment addresses
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModuleAddresses {
    #[serde(default = "default_erc721_follow")]
    pub erc721_follow: Address,

    #[serde(default = "default_erc721_token_follow")]
    pub erc721_token_follow: Address,

    #[serde(default = "default_multiple_and_follow")]
    pub multiple_and_follow: Address,

    #[serde(default = "default_multiple_or_follow")]
    pub multiple_or_follow: Address,

    #[serde(default = "default_erc1155_follow")]
    pub erc1155_follow: Address,

    #[serde(default = "default_passcode_follow")]
    pub passcode_follow: Address,

    #[serde(default = "default_limited_rewards_reference")]
    pub limited_rewards_reference: Address,

    #[serde(default = "default_follower_only_reference")]
    pub follower_only_reference: Address,
}

fn default_erc721_follow() -> Address {
    Address::derive("erc721-follow-module")
}

fn default_erc721_token_follow() -> Address {
    Address::derive("erc721-token-follow-module")
}

fn default_multiple_and_follow() -> Address {
    Address::derive("multiple-and-follow-module")
}

fn default_multiple_or_follow() -> Address {
    Address::derive("multiple-or-follow-module")
}

fn default_erc1155_follow() -> Address {
    Address::derive("erc1155-follow-module")
}

fn default_passcode_follow() -> Address {
    Address::derive("passcode-follow-module")
}

fn default_limited_rewards_reference() -> Address {
    Address::derive("limited-rewards-reference-module")
}

fn default_follower_only_reference() -> Address {
    Address::derive("follower-only-reference-module")
}

impl Default for ModuleAddresses {
    fn default() -> Self {
        Self {
            erc721_follow: default_erc721_follow(),
            erc721_token_follow: default_erc721_token_follow(),
            multiple_and_follow: default_multiple_and_follow(),
            multiple_or_follow: default_multiple_or_follow(),
            erc1155_follow: default_erc1155_follow(),
            passcode_follow: default_passcode_follow(),
            limited_rewards_reference: default_limited_rewards_reference(),
            follower_only_reference: default_follower_only_reference(),
        }
    }
}

/// Reward schedule parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RewardSettings {
    /// Share of the previous slot's reward kept by the next slot (basis points)
    #[serde(default = "default_retention_bps")]
    pub retention_bps: u32,
}

fn default_retention_bps() -> u32 {
    DEFAULT_RETENTION_BPS
}

impl Default for RewardSettings {
    fn default() -> Self {
        Self {
            retention_bps: default_retention_bps(),
        }
    }
}

impl RewardSettings {
    pub fn schedule(&self) -> Result<ExponentialDecay> {
        Ok(ExponentialDecay::new(self.retention_bps)?)
    }
}

/// Logging configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: text or json
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
