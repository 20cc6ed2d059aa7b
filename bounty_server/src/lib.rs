use std::sync::{atomic::AtomicBool, Arc};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use bounty_core::{
    simulate, CommitmentStore, EngineParams, SimulationConfig, SimulationReport, SpinError, SpinResult,
    SpinService, Symbol,
};
use bounty_shared::{
    ApiError, ReelStripsResponse, ServerHashResponse, SimulateRequest, SimulationResponse, SpinRequest,
    SpinResponse, WinEntry,
};

pub mod config;

use config::ServerConfig;

pub struct AppState {
    pub spins: SpinService,
    pub sim_max_rounds: u64,
    pub sim_shards: usize,
    /// Raised on shutdown so running simulations stop between rounds.
    pub shutdown: Arc<AtomicBool>,
}

impl AppState {
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let params = EngineParams::bounty_default(config.strip_length, config.reel_seed)?;
        let store = Arc::new(CommitmentStore::new(config.store_limits()));
        Ok(Self {
            spins: SpinService::new(Arc::new(params), store, config.bet_limits()),
            sim_max_rounds: config.sim_max_rounds,
            sim_shards: config.sim_shards,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }
}

/// Wire error with the HTTP status its variant maps to.
pub struct AppError(pub ApiError);

impl From<SpinError> for AppError {
    fn from(e: SpinError) -> Self {
        match e {
            SpinError::UnknownCommitment => AppError(ApiError::UnknownCommitment),
            SpinError::Engine(_) => AppError(ApiError::Internal),
            other => AppError(ApiError::Invalid(other.to_string())),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0.body())).into_response()
    }
}

fn symbol_ids(symbols: &[Symbol]) -> Vec<String> {
    symbols.iter().map(|s| s.id().to_string()).collect()
}

fn spin_response(result: SpinResult) -> SpinResponse {
    SpinResponse {
        grid: result.grid.iter().map(|row| symbol_ids(row)).collect(),
        wins: result
            .wins
            .into_iter()
            .map(|w| WinEntry {
                payline: w.payline,
                symbol: w.symbol.id().to_string(),
                length: w.length,
                multiplier: w.multiplier,
            })
            .collect(),
        multiplier: result.total_multiplier,
        payout: result.payout,
        scatter_count: result.scatter_count,
        bonus_triggered: result.bonus_triggered,
        server_seed: result.server_seed,
    }
}

fn simulation_response(report: SimulationReport) -> SimulationResponse {
    SimulationResponse {
        total_spins: report.total_spins,
        total_bet: report.total_bet,
        total_payout: report.total_payout,
        duration_seconds: report.duration_seconds,
        base_game_rtp: report.base_game_rtp,
        bonus_frequency: report.bonus_frequency,
        bonus_triggers: report.bonus_triggers,
        cancelled: report.cancelled,
        finished_at: chrono::Utc::now(),
    }
}

async fn route_get_server_hash(State(state): State<Arc<AppState>>) -> Json<ServerHashResponse> {
    let commitment = state.spins.get_commitment();
    Json(ServerHashResponse {
        commit_id: commitment.id,
        server_hash: commitment.server_hash,
    })
}

async fn route_spin(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpinRequest>,
) -> Result<Json<SpinResponse>, AppError> {
    let commit_id = req.commit_id.unwrap_or_default();
    let result = state
        .spins
        .perform_spin(&commit_id, &req.client_seed, req.bet)
        .map_err(|e| {
            if e.is_client_error() {
                warn!(error = %e, "spin rejected");
            }
            AppError::from(e)
        })?;
    Ok(Json(spin_response(result)))
}

async fn route_reel_strips(State(state): State<Arc<AppState>>) -> Json<ReelStripsResponse> {
    Json(ReelStripsResponse {
        strips: state
            .spins
            .params()
            .reels
            .strips()
            .iter()
            .map(|s| symbol_ids(s))
            .collect(),
    })
}

async fn route_simulate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SimulateRequest>,
) -> Result<Json<SimulationResponse>, AppError> {
    if req.rounds == 0 || req.rounds > state.sim_max_rounds {
        return Err(AppError(ApiError::Invalid(format!(
            "rounds must be between 1 and {}",
            state.sim_max_rounds
        ))));
    }
    info!(rounds = req.rounds, "Starting RTP simulation");
    let config = SimulationConfig {
        rounds: req.rounds,
        shards: if state.sim_shards > 0 {
            state.sim_shards
        } else {
            SimulationConfig::default().shards
        },
        ..SimulationConfig::default()
    };
    let worker = state.clone();
    let report = tokio::task::spawn_blocking(move || {
        simulate(worker.spins.params(), &config, &worker.shutdown)
    })
    .await
    .map_err(|e| {
        error!(error = %e, "simulation task failed");
        AppError(ApiError::Internal)
    })?
    .map_err(|e| {
        error!(error = %e, "simulation engine fault");
        AppError(ApiError::Internal)
    })?;
    Ok(Json(simulation_response(report)))
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/get-server-hash", get(route_get_server_hash))
        .route("/api/spin", post(route_spin))
        .route("/api/reel-strips", get(route_reel_strips))
        .route("/api/simulate-rtp", post(route_simulate))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
