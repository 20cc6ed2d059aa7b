use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CLIENT_SEED: &str = "default-client-seed";
pub const DEFAULT_SIMULATION_ROUNDS: u64 = 1_000_000;

fn default_client_seed() -> String {
    DEFAULT_CLIENT_SEED.to_string()
}

fn default_bet() -> f64 {
    1.0
}

fn default_rounds() -> u64 {
    DEFAULT_SIMULATION_ROUNDS
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServerHashResponse {
    pub commit_id: String,
    pub server_hash: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpinRequest {
    #[serde(default)]
    pub commit_id: Option<String>,
    #[serde(default = "default_client_seed")]
    pub client_seed: String,
    #[serde(default = "default_bet")]
    pub bet: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WinEntry {
    pub payline: usize,
    pub symbol: String,
    pub length: usize,
    pub multiplier: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpinResponse {
    pub grid: Vec<Vec<String>>, // symbol ids, rows x reels
    pub wins: Vec<WinEntry>,
    pub multiplier: u64,
    pub payout: f64,
    pub scatter_count: usize,
    pub bonus_triggered: bool,
    pub server_seed: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReelStripsResponse {
    pub strips: Vec<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SimulateRequest {
    #[serde(default = "default_rounds")]
    pub rounds: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResponse {
    pub total_spins: u64,
    pub total_bet: f64,
    pub total_payout: f64,
    pub duration_seconds: f64,
    #[serde(rename = "baseGameRTP")]
    pub base_game_rtp: f64,
    pub bonus_frequency: Option<f64>,
    pub bonus_triggers: u64,
    pub cancelled: bool,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("{0}")]
    Invalid(String),
    #[error("invalid or expired commitId")]
    UnknownCommitment,
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Invalid(_) | ApiError::UnknownCommitment => 400,
            ApiError::Internal => 500,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
        }
    }
}
