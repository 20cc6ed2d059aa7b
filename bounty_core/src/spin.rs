use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::{
    commitment::{Commitment, CommitmentStore},
    engine::{produce_outcome, EngineParams},
    error::SpinError,
    evaluator::Win,
    symbols::Grid,
};

pub const DEFAULT_MAX_BET: f64 = 50.0;

/// Accepted bets: `0 < bet <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetLimits {
    pub max: f64,
}

impl Default for BetLimits {
    fn default() -> Self {
        Self { max: DEFAULT_MAX_BET }
    }
}

impl BetLimits {
    pub fn contains(&self, bet: f64) -> bool {
        bet.is_finite() && bet > 0.0 && bet <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinResult {
    pub grid: Grid,
    pub wins: Vec<Win>,
    pub total_multiplier: u64,
    pub payout: f64,
    pub scatter_count: usize,
    pub bonus_triggered: bool,
    pub server_seed: String,
}

/// Commit-reveal front door: hands out commitments and settles spins
/// against them.
#[derive(Clone)]
pub struct SpinService {
    params: Arc<EngineParams>,
    commitments: Arc<CommitmentStore>,
    limits: BetLimits,
}

impl SpinService {
    pub fn new(params: Arc<EngineParams>, commitments: Arc<CommitmentStore>, limits: BetLimits) -> Self {
        Self {
            params,
            commitments,
            limits,
        }
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn commitments(&self) -> &CommitmentStore {
        &self.commitments
    }

    pub fn get_commitment(&self) -> Commitment {
        self.commitments.create()
    }

    /// Consumes the commitment `commit_id` and settles one spin. Input is
    /// validated before the store is touched, so a rejected bet keeps its
    /// commitment.
    pub fn perform_spin(&self, commit_id: &str, client_seed: &str, bet: f64) -> Result<SpinResult, SpinError> {
        if commit_id.is_empty() {
            return Err(SpinError::MissingCommitment);
        }
        if !self.limits.contains(bet) {
            warn!(bet, "rejected bet outside limits");
            return Err(SpinError::BetOutOfRange(bet));
        }
        let server_seed = self
            .commitments
            .reveal(commit_id)
            .ok_or(SpinError::UnknownCommitment)?;

        let outcome = produce_outcome(&self.params, &server_seed, client_seed).map_err(|e| {
            error!(%commit_id, error = %e, "spin engine fault");
            SpinError::Engine(e)
        })?;
        let payout = outcome.total_multiplier as f64 * bet;
        debug!(%commit_id, multiplier = outcome.total_multiplier, payout, "spin settled");

        Ok(SpinResult {
            grid: outcome.grid,
            wins: outcome.wins,
            total_multiplier: outcome.total_multiplier,
            payout,
            scatter_count: outcome.scatter_count,
            bonus_triggered: outcome.bonus_triggered,
            server_seed,
        })
    }
}
