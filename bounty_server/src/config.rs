use std::{str::FromStr, time::Duration};

use anyhow::Context;
use bounty_core::{commitment, spin::DEFAULT_MAX_BET, symbols::DEFAULT_STRIP_LENGTH, BetLimits, StoreLimits};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub bet_max: f64,
    pub strip_length: usize,
    pub reel_seed: Option<u64>,
    pub commit_ttl: Duration,
    pub commit_capacity: usize,
    pub sweep_interval: Duration,
    pub sim_max_rounds: u64,
    pub sim_shards: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            bet_max: DEFAULT_MAX_BET,
            strip_length: DEFAULT_STRIP_LENGTH,
            reel_seed: None,
            commit_ttl: commitment::DEFAULT_TTL,
            commit_capacity: commitment::DEFAULT_CAPACITY,
            sweep_interval: Duration::from_secs(60),
            sim_max_rounds: 10_000_000,
            sim_shards: 0,
        }
    }
}

fn env_parse<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        Err(_) => Ok(None),
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let config = Self {
            bind: std::env::var("BIND").unwrap_or(defaults.bind),
            bet_max: env_parse("BET_MAX")?.unwrap_or(defaults.bet_max),
            strip_length: env_parse("STRIP_LENGTH")?.unwrap_or(defaults.strip_length),
            reel_seed: env_parse("REEL_SEED")?,
            commit_ttl: env_parse("COMMIT_TTL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.commit_ttl),
            commit_capacity: env_parse("COMMIT_CAPACITY")?.unwrap_or(defaults.commit_capacity),
            sweep_interval: env_parse("COMMIT_SWEEP_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_interval),
            sim_max_rounds: env_parse("SIM_MAX_ROUNDS")?.unwrap_or(defaults.sim_max_rounds),
            sim_shards: env_parse("SIM_SHARDS")?.unwrap_or(defaults.sim_shards),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.bet_max.is_finite() && self.bet_max > 0.0,
            "BET_MAX must be a positive number"
        );
        anyhow::ensure!(self.strip_length > 0, "STRIP_LENGTH must be positive");
        anyhow::ensure!(!self.commit_ttl.is_zero(), "COMMIT_TTL_SECS must be positive");
        anyhow::ensure!(self.commit_capacity > 0, "COMMIT_CAPACITY must be positive");
        anyhow::ensure!(!self.sweep_interval.is_zero(), "COMMIT_SWEEP_SECS must be positive");
        Ok(())
    }

    pub fn bet_limits(&self) -> BetLimits {
        BetLimits { max: self.bet_max }
    }

    pub fn store_limits(&self) -> StoreLimits {
        StoreLimits {
            ttl: self.commit_ttl,
            capacity: self.commit_capacity,
        }
    }
}
