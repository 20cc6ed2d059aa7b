pub mod commitment;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod paytable;
pub mod rng;
pub mod simulator;
pub mod spin;
pub mod symbols;

pub use crate::commitment::{Commitment, CommitmentStore, StoreLimits};
pub use crate::engine::{
    compute_reel_window, compute_stops, produce_outcome, verify_round, EngineParams, RoundVerification,
    SpinOutcome,
};
pub use crate::error::{EngineError, SpinError};
pub use crate::evaluator::{evaluate, evaluate_payline, Evaluation, LineEvaluation, Win};
pub use crate::paytable::{Payline, Paytable, PaytableEntry, PAYLINES};
pub use crate::rng::{derive_hash_hex, generate_server_seed, ProvablyFairRng};
pub use crate::simulator::{simulate, ShardTally, SimulationConfig, SimulationReport};
pub use crate::spin::{BetLimits, SpinResult, SpinService};
pub use crate::symbols::{Grid, ReelsConfig, Symbol, REELS_COUNT, VISIBLE_ROWS};
