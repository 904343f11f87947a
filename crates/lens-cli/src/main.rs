//! Lens modules CLI
//!
//! Command-line interface for previewing mirror reward schedules, encoding
//! module configuration and running scripted hub scenarios.

mod scenario;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lens_core::Address;
use lens_hub::config::LoggingConfig;
use lens_hub::{Deployment, HubConfig};
use lens_reference::{DecaySchedule, ExponentialDecay, RewardConfig};
use scenario::{Runner, Scenario, TokenAmount};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Largest table `lens schedule` prints
const MAX_SCHEDULE_ROWS: u64 = 100_000;

#[derive(Parser)]
#[command(name = "lens")]
#[command(version)]
#[command(about = "Lens follow and reference modules", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "lens.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the per-mirror reward table for a pool
    Schedule {
        /// Total reward, in base units or as "<n> tokens"
        #[arg(short, long, value_parser = TokenAmount::parse)]
        total: TokenAmount,

        /// Number of rewarded mirrors
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=MAX_SCHEDULE_ROWS))]
        limit: u64,

        /// Retention per slot in basis points, overrides the config
        #[arg(long)]
        retention_bps: Option<u32>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Encode limited-rewards initialization data as hex
    EncodeReward {
        #[arg(short, long, value_parser = TokenAmount::parse)]
        total: TokenAmount,

        #[arg(short, long)]
        limit: u64,

        /// Reward currency, as hex or an account label
        #[arg(short, long)]
        asset: String,

        /// Restrict comments and mirrors to followers
        #[arg(long)]
        follower_only: bool,
    },

    /// Run a scenario file against a fresh in-memory hub
    Simulate {
        /// Scenario TOML file
        #[arg(short, long)]
        scenario: PathBuf,
    },

    /// Print the effective configuration
    Config,
}

fn init_logging(verbose: bool, logging: &LoggingConfig) {
    let env_filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false),
            )
            .init();
    }
}

fn parse_asset(asset: &str) -> Address {
    asset.parse().unwrap_or_else(|_| Address::derive(asset))
}

fn load_config(path: &Path) -> anyhow::Result<HubConfig> {
    HubConfig::load(path).with_context(|| format!("loading {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    init_logging(cli.verbose, &config.logging);

    match cli.command {
        Commands::Schedule {
            total,
            limit,
            retention_bps,
            json,
        } => {
            let schedule = match retention_bps {
                Some(bps) => ExponentialDecay::new(bps)?,
                None => config.rewards.schedule()?,
            };
            let table = schedule.preview(total.0, limit);
            let paid: u128 = table.iter().sum();

            if json {
                let out = serde_json::json!({
                    "total": total.0.to_string(),
                    "limit": limit,
                    "retention_bps": schedule.retention_bps(),
                    "rewards": table.iter().map(|r| r.to_string()).collect::<Vec<_>>(),
                    "distributed": paid.to_string(),
                    "undistributed": (total.0 - paid).to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("Retention: {} bps", schedule.retention_bps());
                println!("{:>8}  {:>40}", "mirror", "reward");
                for (slot, reward) in table.iter().enumerate() {
                    println!("{:>8}  {:>40}", slot + 1, reward);
                }
                println!("");
                println!("Distributed: {}", paid);
                println!("Undistributed: {}", total.0 - paid);
            }
        }

        Commands::EncodeReward {
            total,
            limit,
            asset,
            follower_only,
        } => {
            let config = RewardConfig {
                total_reward: total.0,
                mirror_limit: limit,
                asset: parse_asset(&asset),
                follower_only,
            };
            config.validate()?;
            println!("0x{}", hex::encode(config.encode()));
        }

        Commands::Simulate { scenario } => {
            let content = std::fs::read_to_string(&scenario)
                .with_context(|| format!("reading {}", scenario.display()))?;
            let scenario = Scenario::from_toml(&content)?;

            tracing::info!(steps = scenario.steps.len(), "running scenario");
            let mut runner = Runner::new(Deployment::new(config)?);
            let report = runner.run(&scenario)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule_limit(limit: &str) -> Result<u64, clap::Error> {
        let cli = Cli::try_parse_from(["lens", "schedule", "--total", "10000", "--limit", limit])?;
        match cli.command {
            Commands::Schedule { limit, .. } => Ok(limit),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_schedule_limit_is_bounded() {
        assert_eq!(schedule_limit("100").unwrap(), 100);
        assert_eq!(schedule_limit("100000").unwrap(), MAX_SCHEDULE_ROWS);
        assert!(schedule_limit("100001").is_err());
        assert!(schedule_limit("18446744073709551615").is_err());
        assert!(schedule_limit("0").is_err());
    }

    #[test]
    fn test_encode_reward_accepts_large_limits() {
        let cli = Cli::try_parse_from([
            "lens",
            "encode-reward",
            "--total",
            "1 tokens",
            "--limit",
            "1000000",
            "--asset",
            "usdc",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::EncodeReward { limit: 1_000_000, .. }));
    }
}
