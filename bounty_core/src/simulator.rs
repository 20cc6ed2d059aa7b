//! Return-to-player estimation.
//!
//! Runs the same outcome function the live game uses, with a fresh random
//! server seed and client seed every round and no commitment store. Rounds
//! are split across rayon shards; each shard owns its tallies and they are
//! summed at the end. A shared stop flag is polled between rounds.

use std::{
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
    time::Instant,
};

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    engine::{produce_outcome, EngineParams},
    error::EngineError,
    rng::{random_hex, SERVER_SEED_BYTES},
};

pub const CLIENT_SEED_BYTES: usize = 16;
pub const PROGRESS_EVERY: u64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub rounds: u64,
    pub bet_per_round: f64,
    pub shards: usize,
    /// Fixes every shard's seed stream; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rounds: 1_000_000,
            bet_per_round: 1.0,
            shards: rayon::current_num_threads(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShardTally {
    pub shard: usize,
    pub rounds: u64,
    pub total_bet: f64,
    pub total_payout: f64,
    pub bonus_triggers: u64,
}

impl ShardTally {
    fn merge(mut self, other: &ShardTally) -> Self {
        self.rounds += other.rounds;
        self.total_bet += other.total_bet;
        self.total_payout += other.total_payout;
        self.bonus_triggers += other.bonus_triggers;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub total_spins: u64,
    pub total_bet: f64,
    pub total_payout: f64,
    pub duration_seconds: f64,
    /// Percent of total bet paid back by the base game.
    pub base_game_rtp: f64,
    /// One bonus every this many spins; `None` when no bonus triggered.
    pub bonus_frequency: Option<f64>,
    pub bonus_triggers: u64,
    pub cancelled: bool,
    pub shards: Vec<ShardTally>,
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

fn shard_rng(seed: Option<u64>, shard: usize) -> ChaCha20Rng {
    match seed {
        Some(seed) => {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            rng.set_stream(shard as u64);
            rng
        }
        None => ChaCha20Rng::from_entropy(),
    }
}

fn run_shard(
    params: &EngineParams,
    config: &SimulationConfig,
    shard: usize,
    rounds: u64,
    stop: &AtomicBool,
    done: &AtomicU64,
) -> Result<ShardTally, EngineError> {
    let mut rng = shard_rng(config.seed, shard);
    let mut tally = ShardTally {
        shard,
        ..ShardTally::default()
    };
    for _ in 0..rounds {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        let server_seed = random_hex(&mut rng, SERVER_SEED_BYTES);
        let client_seed = random_hex(&mut rng, CLIENT_SEED_BYTES);
        let outcome = produce_outcome(params, &server_seed, &client_seed)?;

        tally.rounds += 1;
        tally.total_bet += config.bet_per_round;
        tally.total_payout += outcome.total_multiplier as f64 * config.bet_per_round;
        if outcome.bonus_triggered {
            tally.bonus_triggers += 1;
        }

        let completed = done.fetch_add(1, Ordering::Relaxed) + 1;
        if completed % PROGRESS_EVERY == 0 {
            info!("...simulated {completed} spins...");
        }
    }
    Ok(tally)
}

pub fn simulate(
    params: &EngineParams,
    config: &SimulationConfig,
    stop: &AtomicBool,
) -> Result<SimulationReport, EngineError> {
    let shards = config.shards.max(1);
    info!(rounds = config.rounds, shards, "starting RTP simulation");
    let started = Instant::now();
    let done = AtomicU64::new(0);

    let per_shard = config.rounds / shards as u64;
    let remainder = config.rounds % shards as u64;
    let tallies = (0..shards)
        .into_par_iter()
        .map(|shard| {
            let rounds = per_shard + u64::from((shard as u64) < remainder);
            run_shard(params, config, shard, rounds, stop, &done)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let total = tallies.iter().fold(ShardTally::default(), |acc, t| acc.merge(t));
    let duration = started.elapsed().as_secs_f64();
    let base_game_rtp = if total.total_bet > 0.0 {
        total.total_payout / total.total_bet * 100.0
    } else {
        0.0
    };
    let bonus_frequency =
        (total.bonus_triggers > 0).then(|| round_to(total.rounds as f64 / total.bonus_triggers as f64, 2));

    let report = SimulationReport {
        total_spins: total.rounds,
        total_bet: total.total_bet,
        total_payout: total.total_payout,
        duration_seconds: round_to(duration, 2),
        base_game_rtp: round_to(base_game_rtp, 4),
        bonus_frequency,
        bonus_triggers: total.bonus_triggers,
        cancelled: total.rounds < config.rounds,
        shards: tallies,
    };
    info!(
        spins = report.total_spins,
        rtp = report.base_game_rtp,
        bonus_triggers = report.bonus_triggers,
        seconds = report.duration_seconds,
        cancelled = report.cancelled,
        "RTP simulation complete"
    );
    Ok(report)
}
