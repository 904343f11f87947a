//! Scripted scenarios run against an in-memory hub
//!
//! A scenario is a TOML list of steps. Accounts and assets are plain labels
//! (`"alice"`, `"usdc"`), turned into addresses with `Address::derive`.
//! Profiles are referenced by handle and publications by the `id` label
//! given when they were created.
//!
//! ```toml
//! [[step]]
//! action = "create_profile"
//! owner = "alice"
//!
//! [[step]]
//! action = "post"
//! owner = "alice"
//! id = "launch"
//! reference_module = { kind = "limited_rewards", total = "10000", mirror_limit = 100, currency = "usdc" }
//!
//! [[step]]
//! action = "mirror"
//! actor = "bob"
//! pointed = "launch"
//! expect = "ok"
//! ```
//!
//! Failing steps are reported and the scenario continues, unless the step
//! carries an `expect` that does not match its outcome.

use anyhow::{anyhow, bail, Context};
use lens_core::abi::{self, AbiValue};
use lens_core::{Address, Amount, ProfileId, PublicationId, ONE_TOKEN};
use lens_follow::PasscodeFollowModule;
use lens_hub::{CommentData, Deployment, HubError, MirrorData, PostData};
use lens_reference::{PublicationRewardLedger, RewardConfig};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Token amount written as an integer, a digit string, or `"<decimal> tokens"`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenAmount(pub Amount);

impl TokenAmount {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        if let Some(tokens) = s.strip_suffix("tokens").map(str::trim) {
            let (whole, fraction) = tokens.split_once('.').unwrap_or((tokens, ""));
            if fraction.len() > 18 {
                bail!("too many decimals in {:?}", s);
            }
            let whole: Amount = whole.parse().with_context(|| format!("invalid amount {:?}", s))?;
            let fraction: Amount = if fraction.is_empty() {
                0
            } else {
                format!("{:0<18}", fraction)
                    .parse()
                    .with_context(|| format!("invalid amount {:?}", s))?
            };
            let units = whole
                .checked_mul(ONE_TOKEN)
                .and_then(|w| w.checked_add(fraction))
                .ok_or_else(|| anyhow!("amount {:?} overflows", s))?;
            return Ok(Self(units));
        }
        Ok(Self(s.parse().with_context(|| format!("invalid amount {:?}", s))?))
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl<'de> serde::de::Visitor<'de> for AmountVisitor {
            type Value = TokenAmount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or an amount string")
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<TokenAmount, E> {
                Ok(TokenAmount(v as Amount))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<TokenAmount, E> {
                u64::try_from(v)
                    .map(|v| TokenAmount(v as Amount))
                    .map_err(|_| E::custom("amount must not be negative"))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<TokenAmount, E> {
                TokenAmount::parse(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Follow module selection, by kind
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FollowModuleSelection {
    Erc721 {
        asset: String,
    },
    Erc721Token {
        asset: String,
        token_id: TokenAmount,
    },
    /// `"zero"` marks a disabled slot
    MultipleAnd {
        assets: Vec<String>,
    },
    MultipleOr {
        assets: Vec<String>,
    },
    Erc1155 {
        asset: String,
        token_id: TokenAmount,
        min_balance: TokenAmount,
        #[serde(default)]
        transferable: bool,
    },
    Passcode {
        passcode: TokenAmount,
    },
}

/// Reference module selection, by kind
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferenceModuleSelection {
    LimitedRewards {
        total: TokenAmount,
        mirror_limit: u64,
        currency: String,
        #[serde(default)]
        follower_only: bool,
    },
    FollowerOnly,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    WhitelistCurrency {
        currency: String,
    },
    Mint {
        asset: String,
        to: String,
        amount: TokenAmount,
    },
    /// Allow the limited-rewards module to spend `amount` of `owner`'s `asset`
    ApproveRewards {
        owner: String,
        asset: String,
        amount: TokenAmount,
    },
    MintNft {
        asset: String,
        to: String,
        token_id: TokenAmount,
    },
    MintMulti {
        asset: String,
        token_id: TokenAmount,
        to: String,
        amount: TokenAmount,
    },
    CreateProfile {
        owner: String,
        /// Defaults to the owner label
        handle: Option<String>,
        follow_module: Option<FollowModuleSelection>,
    },
    SetFollowModule {
        owner: String,
        profile: String,
        follow_module: Option<FollowModuleSelection>,
    },
    Follow {
        follower: String,
        profile: String,
        passcode: Option<TokenAmount>,
    },
    TransferFollowNft {
        from: String,
        to: String,
        profile: String,
        follow_nft_id: u64,
    },
    Post {
        owner: String,
        /// Defaults to the owner label
        profile: Option<String>,
        id: String,
        reference_module: Option<ReferenceModuleSelection>,
    },
    Comment {
        actor: String,
        profile: Option<String>,
        pointed: String,
        id: Option<String>,
    },
    Mirror {
        actor: String,
        profile: Option<String>,
        pointed: String,
        id: Option<String>,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::WhitelistCurrency { .. } => "whitelist_currency",
            Self::Mint { .. } => "mint",
            Self::ApproveRewards { .. } => "approve_rewards",
            Self::MintNft { .. } => "mint_nft",
            Self::MintMulti { .. } => "mint_multi",
            Self::CreateProfile { .. } => "create_profile",
            Self::SetFollowModule { .. } => "set_follow_module",
            Self::Follow { .. } => "follow",
            Self::TransferFollowNft { .. } => "transfer_follow_nft",
            Self::Post { .. } => "post",
            Self::Comment { .. } => "comment",
            Self::Mirror { .. } => "mirror",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expectation {
    Ok,
    Err,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Step {
    #[serde(flatten)]
    pub action: Action,
    pub expect: Option<Expectation>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Scenario {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("invalid scenario")
    }
}

/// Outcome of one step
#[derive(Clone, Debug, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub action: &'static str,
    pub outcome: Expectation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
}

/// Everything a run produced
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub steps: Vec<StepReport>,
    /// Reward ledgers by publication label
    pub ledgers: BTreeMap<String, PublicationRewardLedger>,
    /// Reward currency balances by account label
    pub balances: BTreeMap<String, BTreeMap<String, String>>,
    pub events: usize,
}

/// Failure of a single step
enum StepError {
    Hub(HubError),
    Script(anyhow::Error),
}

impl From<HubError> for StepError {
    fn from(err: HubError) -> Self {
        Self::Hub(err)
    }
}

impl From<anyhow::Error> for StepError {
    fn from(err: anyhow::Error) -> Self {
        Self::Script(err)
    }
}

type StepResult = std::result::Result<Option<String>, StepError>;

pub struct Runner {
    deployment: Deployment,
    profiles: HashMap<String, ProfileId>,
    publications: BTreeMap<String, PublicationId>,
    accounts: BTreeMap<String, Address>,
    currencies: BTreeMap<String, Address>,
}

fn label(name: &str) -> Address {
    Address::derive(name)
}

fn asset(name: &str) -> Address {
    if name == "zero" {
        Address::ZERO
    } else {
        label(name)
    }
}

impl Runner {
    pub fn new(deployment: Deployment) -> Self {
        Self {
            deployment,
            profiles: HashMap::new(),
            publications: BTreeMap::new(),
            accounts: BTreeMap::new(),
            currencies: BTreeMap::new(),
        }
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    /// Run every step, stopping only on an unmet expectation
    pub fn run(&mut self, scenario: &Scenario) -> anyhow::Result<Report> {
        let mut steps = Vec::with_capacity(scenario.steps.len());

        for (index, step) in scenario.steps.iter().enumerate() {
            let action = step.action.name();
            let report = match self.apply(&step.action) {
                Ok(detail) => StepReport {
                    index,
                    action,
                    outcome: Expectation::Ok,
                    detail,
                    code: None,
                },
                Err(StepError::Hub(err)) => StepReport {
                    index,
                    action,
                    outcome: Expectation::Err,
                    detail: Some(err.to_string()),
                    code: Some(err.code()),
                },
                Err(StepError::Script(err)) => bail!("step {} ({}): {:#}", index, action, err),
            };

            tracing::info!(index, action, outcome = ?report.outcome, detail = ?report.detail, "step");
            if let Some(expected) = step.expect {
                if expected != report.outcome {
                    bail!(
                        "step {} ({}) expected {:?}, got {:?}: {}",
                        index,
                        action,
                        expected,
                        report.outcome,
                        report.detail.as_deref().unwrap_or("")
                    );
                }
            }
            steps.push(report);
        }

        Ok(Report {
            steps,
            ledgers: self.ledgers(),
            balances: self.balances(),
            events: self.deployment.hub.events().len(),
        })
    }

    fn apply(&mut self, action: &Action) -> StepResult {
        let hub = self.deployment.hub.clone();
        let assets = self.deployment.assets.clone();

        match action {
            Action::WhitelistCurrency { currency } => {
                hub.whitelist_currency(&self.deployment.governance(), label(currency), true)?;
                self.currencies.insert(currency.clone(), label(currency));
                Ok(None)
            }
            Action::Mint { asset: name, to, amount } => {
                assets.mint(label(name), self.account(to), amount.0).map_err(HubError::from)?;
                Ok(None)
            }
            Action::ApproveRewards { owner, asset: name, amount } => {
                let spender = self.deployment.config.modules.limited_rewards_reference;
                assets
                    .approve(label(name), self.account(owner), spender, amount.0)
                    .map_err(HubError::from)?;
                Ok(None)
            }
            Action::MintNft { asset: name, to, token_id } => {
                assets
                    .mint_nft(label(name), self.account(to), token_id.0)
                    .map_err(HubError::from)?;
                Ok(None)
            }
            Action::MintMulti {
                asset: name,
                token_id,
                to,
                amount,
            } => {
                assets
                    .mint_multi(label(name), token_id.0, self.account(to), amount.0)
                    .map_err(HubError::from)?;
                Ok(None)
            }
            Action::CreateProfile {
                owner,
                handle,
                follow_module,
            } => {
                let handle = handle.clone().unwrap_or_else(|| owner.clone());
                let (module, data) = self.follow_module(follow_module.as_ref());
                let id = hub.create_profile(&self.account(owner), &handle, module, &data)?;
                self.profiles.insert(handle, id);
                Ok(Some(format!("profile {}", id)))
            }
            Action::SetFollowModule {
                owner,
                profile,
                follow_module,
            } => {
                let id = self.profile(profile)?;
                let (module, data) = self.follow_module(follow_module.as_ref());
                hub.set_follow_module(&self.account(owner), id, module, &data)?;
                Ok(None)
            }
            Action::Follow {
                follower,
                profile,
                passcode,
            } => {
                let id = self.profile(profile)?;
                let data = passcode
                    .map(|code| PasscodeFollowModule::follow_data(code.0))
                    .unwrap_or_default();
                let nft = hub.follow(&self.account(follower), id, &data)?;
                Ok(Some(format!("follow nft {}", nft)))
            }
            Action::TransferFollowNft {
                from,
                to,
                profile,
                follow_nft_id,
            } => {
                let id = self.profile(profile)?;
                hub.transfer_follow_nft(&self.account(from), id, *follow_nft_id, &self.account(to))?;
                Ok(None)
            }
            Action::Post {
                owner,
                profile,
                id,
                reference_module,
            } => {
                let profile = self.profile(profile.as_deref().unwrap_or(owner))?;
                let (module, data) = self.reference_module(reference_module.as_ref());
                let publication = hub.post(
                    &self.account(owner),
                    PostData {
                        profile,
                        content_uri: format!("ipfs://{}", id),
                        reference_module: module,
                        reference_module_init_data: data,
                    },
                )?;
                self.publications.insert(id.clone(), publication);
                Ok(Some(format!("publication {}", publication)))
            }
            Action::Comment {
                actor,
                profile,
                pointed,
                id,
            } => {
                let profile = self.profile(profile.as_deref().unwrap_or(actor))?;
                let pointed = self.publication(pointed)?;
                let publication = hub.comment(
                    &self.account(actor),
                    CommentData {
                        profile,
                        content_uri: format!("ipfs://comment-{}", pointed),
                        pointed,
                        reference_module_data: Vec::new(),
                        reference_module: None,
                        reference_module_init_data: Vec::new(),
                    },
                )?;
                if let Some(id) = id {
                    self.publications.insert(id.clone(), publication);
                }
                Ok(Some(format!("publication {}", publication)))
            }
            Action::Mirror {
                actor,
                profile,
                pointed,
                id,
            } => {
                let profile = self.profile(profile.as_deref().unwrap_or(actor))?;
                let pointed = self.publication(pointed)?;
                let publication = hub.mirror(
                    &self.account(actor),
                    MirrorData {
                        profile,
                        pointed,
                        reference_module_data: Vec::new(),
                    },
                )?;
                if let Some(id) = id {
                    self.publications.insert(id.clone(), publication);
                }
                Ok(Some(format!("publication {}", publication)))
            }
        }
    }

    /// Address of an account label, remembered for the balance report
    fn account(&mut self, name: &str) -> Address {
        *self
            .accounts
            .entry(name.to_string())
            .or_insert_with(|| label(name))
    }

    fn profile(&self, handle: &str) -> anyhow::Result<ProfileId> {
        self.profiles
            .get(handle)
            .copied()
            .ok_or_else(|| anyhow!("no profile with handle {:?}", handle))
    }

    fn publication(&self, id: &str) -> anyhow::Result<PublicationId> {
        self.publications
            .get(id)
            .copied()
            .ok_or_else(|| anyhow!("no publication labelled {:?}", id))
    }

    fn follow_module(&self, selection: Option<&FollowModuleSelection>) -> (Option<Address>, Vec<u8>) {
        let modules = &self.deployment.config.modules;
        let Some(selection) = selection else {
            return (None, Vec::new());
        };
        match selection {
            FollowModuleSelection::Erc721 { asset: name } => (
                Some(modules.erc721_follow),
                abi::encode(&[AbiValue::Address(asset(name))]),
            ),
            FollowModuleSelection::Erc721Token { asset: name, token_id } => (
                Some(modules.erc721_token_follow),
                abi::encode(&[AbiValue::Address(asset(name)), AbiValue::Uint(token_id.0)]),
            ),
            FollowModuleSelection::MultipleAnd { assets } => (
                Some(modules.multiple_and_follow),
                abi::encode(&[AbiValue::AddressArray(assets.iter().map(|a| asset(a)).collect())]),
            ),
            FollowModuleSelection::MultipleOr { assets } => (
                Some(modules.multiple_or_follow),
                abi::encode(&[AbiValue::AddressArray(assets.iter().map(|a| asset(a)).collect())]),
            ),
            FollowModuleSelection::Erc1155 {
                asset: name,
                token_id,
                min_balance,
                transferable,
            } => (
                Some(modules.erc1155_follow),
                abi::encode(&[
                    AbiValue::Address(asset(name)),
                    AbiValue::Uint(token_id.0),
                    AbiValue::Uint(min_balance.0),
                    AbiValue::Bool(*transferable),
                ]),
            ),
            FollowModuleSelection::Passcode { passcode } => (
                Some(modules.passcode_follow),
                PasscodeFollowModule::follow_data(passcode.0),
            ),
        }
    }

    fn reference_module(&self, selection: Option<&ReferenceModuleSelection>) -> (Option<Address>, Vec<u8>) {
        let modules = &self.deployment.config.modules;
        match selection {
            None => (None, Vec::new()),
            Some(ReferenceModuleSelection::LimitedRewards {
                total,
                mirror_limit,
                currency,
                follower_only,
            }) => (
                Some(modules.limited_rewards_reference),
                RewardConfig {
                    total_reward: total.0,
                    mirror_limit: *mirror_limit,
                    asset: asset(currency),
                    follower_only: *follower_only,
                }
                .encode(),
            ),
            Some(ReferenceModuleSelection::FollowerOnly) => (Some(modules.follower_only_reference), Vec::new()),
        }
    }

    fn ledgers(&self) -> BTreeMap<String, PublicationRewardLedger> {
        self.publications
            .iter()
            .filter_map(|(name, id)| {
                self.deployment
                    .limited_rewards
                    .publication_data(id.profile, id.pub_id)
                    .map(|ledger| (name.clone(), ledger))
            })
            .collect()
    }

    fn balances(&self) -> BTreeMap<String, BTreeMap<String, String>> {
        self.accounts
            .iter()
            .map(|(name, address)| {
                let held = self
                    .currencies
                    .iter()
                    .map(|(currency, asset)| {
                        (
                            currency.clone(),
                            self.deployment.assets.balance(asset, address).to_string(),
                        )
                    })
                    .collect();
                (name.clone(), held)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_hub::HubConfig;

    const THREE_MIRRORS: &str = r#"
        [[step]]
        action = "whitelist_currency"
        currency = "usdc"

        [[step]]
        action = "create_profile"
        owner = "publisher"

        [[step]]
        action = "mint"
        asset = "usdc"
        to = "publisher"
        amount = "1 tokens"

        [[step]]
        action = "approve_rewards"
        owner = "publisher"
        asset = "usdc"
        amount = 10000

        [[step]]
        action = "post"
        owner = "publisher"
        id = "launch"
        reference_module = { kind = "limited_rewards", total = 10000, mirror_limit = 100, currency = "usdc", follower_only = true }

        [[step]]
        action = "create_profile"
        owner = "alice"

        [[step]]
        action = "mirror"
        actor = "alice"
        pointed = "launch"
        expect = "err"

        [[step]]
        action = "follow"
        follower = "alice"
        profile = "publisher"

        [[step]]
        action = "mirror"
        actor = "alice"
        pointed = "launch"
        expect = "ok"
    "#;

    fn runner() -> Runner {
        Runner::new(Deployment::new(HubConfig::default()).unwrap())
    }

    #[test]
    fn test_token_amounts() {
        assert_eq!(TokenAmount::parse("42").unwrap().0, 42);
        assert_eq!(TokenAmount::parse("1.5 tokens").unwrap().0, 1_500_000_000_000_000_000);
        assert_eq!(TokenAmount::parse("2 tokens").unwrap().0, 2 * ONE_TOKEN);
        assert!(TokenAmount::parse("1.0000000000000000001 tokens").is_err());
        assert!(TokenAmount::parse("lots").is_err());
    }

    #[test]
    fn test_run_scenario() {
        let scenario = Scenario::from_toml(THREE_MIRRORS).unwrap();
        assert_eq!(scenario.steps.len(), 9);

        let report = runner().run(&scenario).unwrap();
        assert_eq!(report.steps[6].outcome, Expectation::Err);
        assert_eq!(report.steps[6].code, Some(2004));
        assert_eq!(report.steps[8].outcome, Expectation::Ok);

        let ledger = &report.ledgers["launch"];
        assert_eq!(ledger.mirrors_issued, 1);
        assert_eq!(ledger.amount_distributed, 100);
        assert_eq!(report.balances["alice"]["usdc"], "100");
    }

    #[test]
    fn test_unmet_expectation_aborts() {
        let scenario = Scenario::from_toml(
            r#"
            [[step]]
            action = "follow"
            follower = "alice"
            profile = "nobody"
            "#,
        )
        .unwrap();
        assert!(runner().run(&scenario).is_err());

        let scenario = Scenario::from_toml(
            r#"
            [[step]]
            action = "create_profile"
            owner = "alice"
            expect = "err"
            "#,
        )
        .unwrap();
        assert!(runner().run(&scenario).is_err());
    }

    #[test]
    fn test_failed_step_without_expectation_continues() {
        let scenario = Scenario::from_toml(
            r#"
            [[step]]
            action = "create_profile"
            owner = "alice"

            [[step]]
            action = "create_profile"
            owner = "alice"

            [[step]]
            action = "create_profile"
            owner = "bob"
            "#,
        )
        .unwrap();

        let report = runner().run(&scenario).unwrap();
        assert_eq!(report.steps[1].outcome, Expectation::Err);
        assert_eq!(report.steps[2].outcome, Expectation::Ok);
    }
}
