use serde::{Deserialize, Serialize};

use crate::{
    error::EngineError,
    evaluator::{evaluate, Win},
    paytable::{Paytable, Payline, PAYLINES},
    rng::{derive_hash_hex, ProvablyFairRng},
    symbols::{Grid, ReelsConfig, REELS_COUNT},
};

#[derive(Debug, Clone)]
pub struct EngineParams {
    pub reels: ReelsConfig,
    pub paytable: Paytable,
    pub paylines: Vec<Payline>,
}

impl EngineParams {
    /// Default game: the bounty paytable, ten paylines and freshly sampled
    /// strips. Pass `reel_seed` to make the strips reproducible.
    pub fn bounty_default(strip_length: usize, reel_seed: Option<u64>) -> Result<Self, EngineError> {
        let paytable = Paytable::bounty_default();
        let reels = match reel_seed {
            Some(seed) => ReelsConfig::from_seed(&paytable, strip_length, seed)?,
            None => ReelsConfig::from_entropy(&paytable, strip_length)?,
        };
        Ok(Self {
            reels,
            paytable,
            paylines: PAYLINES.to_vec(),
        })
    }

    /// Default paytable and paylines over strips supplied by the caller,
    /// typically the ones a server published.
    pub fn with_reels(reels: ReelsConfig) -> Self {
        Self {
            reels,
            paytable: Paytable::bounty_default(),
            paylines: PAYLINES.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub grid: Grid,
    pub wins: Vec<Win>,
    pub total_multiplier: u64,
    pub scatter_count: usize,
    pub bonus_triggered: bool,
}

/// One HMAC derivation per reel, nonces 0..REELS_COUNT in reel order.
pub fn compute_stops(rng: &ProvablyFairRng, reels: &ReelsConfig) -> [usize; REELS_COUNT] {
    let mut stops = [0usize; REELS_COUNT];
    for (nonce, (stop, strip)) in stops.iter_mut().zip(reels.strips()).enumerate() {
        *stop = rng.stop_index(nonce as u64, strip.len());
    }
    stops
}

pub fn compute_reel_window(rng: &ProvablyFairRng, reels: &ReelsConfig) -> Grid {
    reels.window(compute_stops(rng, reels))
}

/// Deterministic outcome of `(server_seed, client_seed)` under `params`.
pub fn produce_outcome(
    params: &EngineParams,
    server_seed_hex: &str,
    client_seed: &str,
) -> Result<SpinOutcome, EngineError> {
    let rng = ProvablyFairRng::new(server_seed_hex, client_seed)?;
    let grid = compute_reel_window(&rng, &params.reels);
    let eval = evaluate(&grid, &params.paylines, &params.paytable)?;
    Ok(SpinOutcome {
        grid,
        wins: eval.wins,
        total_multiplier: eval.total_multiplier,
        scatter_count: eval.scatter_count,
        bonus_triggered: eval.bonus_triggered,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundVerification {
    pub hash_matches: bool,
    pub outcome: SpinOutcome,
}

/// Checks a revealed seed against the hash committed before the bet and
/// recomputes the round it determines.
pub fn verify_round(
    params: &EngineParams,
    server_seed_hex: &str,
    server_hash: &str,
    client_seed: &str,
) -> Result<RoundVerification, EngineError> {
    let hash_matches = derive_hash_hex(server_seed_hex.as_bytes()).eq_ignore_ascii_case(server_hash);
    let outcome = produce_outcome(params, server_seed_hex, client_seed)?;
    Ok(RoundVerification {
        hash_matches,
        outcome,
    })
}
