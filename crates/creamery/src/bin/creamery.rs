//! # Creamery
//!
//! Deploys from a config file and simulates daily claims.
//!
//! ```text
//! creamery [config.toml] [--accounts N] [--days D] [--seed S]
//! ```
//!
//! Log level comes from `RUST_LOG` (default `info`).

use std::collections::BTreeMap;
use std::process::ExitCode;

use alloy_primitives::{Address, U256};
use creamery::{CreameryConfig, DeployResult, Deployment};
use creamery_rewards::{Rarity, RewardError, SeededEntropy};
use creamery_shared::SECONDS_PER_DAY;
use tracing::{error, info, warn};

const DEFAULT_CONFIG: &str = "data/creamery.toml";

/// Simulation start (2024-01-01T00:00:00Z).
const GENESIS: u64 = 1_704_067_200;

struct Args {
    config: String,
    accounts: u8,
    days: u64,
    seed: u64,
}

/// Value following `name`, or `default` when the flag is absent.
fn flag<T: std::str::FromStr>(args: &[String], name: &str, default: T) -> Result<T, String> {
    let Some(i) = args.iter().position(|a| a == name) else {
        return Ok(default);
    };
    let value = args
        .get(i + 1)
        .ok_or_else(|| format!("{name} needs a value"))?;
    value
        .parse()
        .map_err(|_| format!("invalid value for {name}: {value:?}"))
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = args
        .first()
        .filter(|a| !a.starts_with("--"))
        .cloned()
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let accounts = flag(&args, "--accounts", 10u8)?;
    if accounts == 0 {
        return Err("--accounts must be at least 1".into());
    }
    Ok(Args {
        config,
        accounts,
        days: flag(&args, "--days", 7)?,
        seed: flag(&args, "--seed", 42)?,
    })
}

fn run(args: &Args) -> DeployResult<()> {
    let config = CreameryConfig::load(&args.config)?;
    info!(path = %args.config, "config loaded");

    let deployment = Deployment::deploy(&config)?;
    let factory = &deployment.factory;
    let mut entropy = SeededEntropy::new(args.seed);
    let mut rarities: BTreeMap<Rarity, u64> = BTreeMap::new();
    let mut claims = 0u64;
    let mut rejected = 0u64;

    for day in 0..args.days {
        let morning = GENESIS + day * SECONDS_PER_DAY;
        for (i, account) in (1..=args.accounts).map(Address::repeat_byte).enumerate() {
            let now = morning + i as u64;
            match factory.claim(account, entropy.next_entropy(), now) {
                Ok(outcome) => {
                    claims += 1;
                    *rarities.entry(outcome.rarity).or_default() += 1;
                }
                Err(err) => {
                    rejected += 1;
                    warn!(%err, "claim failed");
                }
            }
            // A second attempt the same day must bounce off the cooldown
            match factory.claim(account, entropy.next_entropy(), now + 60) {
                Err(RewardError::ClaimTooSoon { .. }) => rejected += 1,
                Ok(outcome) => {
                    claims += 1;
                    *rarities.entry(outcome.rarity).or_default() += 1;
                    error!(
                        account = %format!("{account:#x}"),
                        now = now + 60,
                        "second claim on the same day was granted"
                    );
                }
                Err(err) => {
                    rejected += 1;
                    warn!(%err, "repeat claim failed");
                }
            }
        }
    }

    println!("Token:    {} ({})", deployment.token.name(), deployment.token.symbol());
    println!("Factory:  {:#x}", factory.address());
    println!("Claims:   {claims} granted, {rejected} rejected");
    for rarity in Rarity::ALL {
        println!("  {:<10} {}", rarity, rarities.get(&rarity).copied().unwrap_or(0));
    }
    let unit = deployment.token.unit();
    println!(
        "Supply:   {} {} minted as rewards",
        deployment.token.total_supply() / unit,
        deployment.token.symbol()
    );
    let sample = U256::from(1u64);
    println!("Metadata: {}", factory.resolve_uri(sample));
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            error!(%err, "bad arguments");
            eprintln!("usage: creamery [config.toml] [--accounts N] [--days D] [--seed S]");
            return ExitCode::FAILURE;
        }
    };
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "creamery failed");
            ExitCode::FAILURE
        }
    }
}
