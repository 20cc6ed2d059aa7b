use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bounty_core::{
    simulate, symbols::DEFAULT_STRIP_LENGTH, verify_round, EngineParams, ReelsConfig, SimulationConfig,
    SimulationReport, Symbol,
};
use bounty_shared::ReelStripsResponse;

#[derive(Parser)]
#[command(name = "bounty-cli", about = "Operator CLI for the Bounty Hunter's Call spin engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate base-game RTP and bonus frequency
    Simulate {
        #[arg(long, default_value_t = 10_000_000)]
        rounds: u64,
        #[arg(long, default_value_t = 1.0)]
        bet: f64,
        /// Worker shards; defaults to the number of CPU threads
        #[arg(long)]
        shards: Option<usize>,
        /// Seed for per-round secrets, for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, env = "REEL_SEED")]
        reel_seed: Option<u64>,
        #[arg(long, env = "STRIP_LENGTH", default_value_t = DEFAULT_STRIP_LENGTH)]
        strip_length: usize,
        /// Write per-shard tallies to this CSV path
        #[arg(long = "csv")]
        csv_out: Option<PathBuf>,
    },
    /// Recompute a revealed round and check it against its commitment
    Verify {
        #[arg(long)]
        server_seed: String,
        #[arg(long)]
        server_hash: String,
        #[arg(long, default_value = bounty_shared::DEFAULT_CLIENT_SEED)]
        client_seed: String,
        /// JSON body of GET /api/reel-strips
        #[arg(long, conflicts_with = "reel_seed")]
        strips: Option<PathBuf>,
        #[arg(long)]
        reel_seed: Option<u64>,
        #[arg(long, default_value_t = DEFAULT_STRIP_LENGTH)]
        strip_length: usize,
    },
}

fn load_params(strips: Option<PathBuf>, reel_seed: Option<u64>, strip_length: usize) -> anyhow::Result<EngineParams> {
    match (strips, reel_seed) {
        (Some(path), _) => {
            let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
            let published: ReelStripsResponse = serde_json::from_str(&raw)?;
            let strips = published
                .strips
                .iter()
                .map(|strip| strip.iter().map(|id| id.parse::<Symbol>()).collect::<Result<Vec<_>, _>>())
                .collect::<Result<Vec<_>, _>>()?;
            Ok(EngineParams::with_reels(ReelsConfig::from_strips(strips)?))
        }
        (None, Some(seed)) => Ok(EngineParams::bounty_default(strip_length, Some(seed))?),
        (None, None) => {
            anyhow::bail!("verification needs the server's reel strips: pass --strips or --reel-seed")
        }
    }
}

/// Runs the simulation off the async runtime; setting `stop` ends it early
/// with a partial report.
async fn run_simulation(
    params: EngineParams,
    config: SimulationConfig,
    stop: Arc<AtomicBool>,
) -> anyhow::Result<SimulationReport> {
    let report = tokio::task::spawn_blocking(move || simulate(&params, &config, &stop)).await??;
    Ok(report)
}

fn print_report(report: &SimulationReport) {
    println!("--- Simulation Complete ---");
    println!("Total Spins: {}", report.total_spins);
    println!("Total Bet: {}", report.total_bet);
    println!("Total Payout (Base Game): {}", report.total_payout);
    println!("Duration: {} seconds", report.duration_seconds);
    println!("---------------------------");
    println!("BASE GAME RTP: {}%", report.base_game_rtp);
    match report.bonus_frequency {
        Some(freq) => println!("Bonus Frequency: 1 in {freq} spins"),
        None => println!("Bonus Frequency: never triggered"),
    }
    println!("Bonus Triggers: {}", report.bonus_triggers);
    if report.cancelled {
        println!("(cancelled before all rounds ran)");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            rounds,
            bet,
            shards,
            seed,
            reel_seed,
            strip_length,
            csv_out,
        } => {
            anyhow::ensure!(bet.is_finite() && bet > 0.0, "bet must be positive");
            let params = EngineParams::bounty_default(strip_length, reel_seed)?;
            let config = SimulationConfig {
                rounds,
                bet_per_round: bet,
                shards: shards.unwrap_or_else(|| SimulationConfig::default().shards),
                seed,
            };
            let stop = Arc::new(AtomicBool::new(false));
            let watcher = stop.clone();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        info!("interrupt received, stopping simulation");
                        watcher.store(true, Ordering::Relaxed);
                    }
                    Err(e) => error!(error = %e, "failed to install Ctrl-C handler"),
                }
            });
            let report = run_simulation(params, config, stop).await?;
            print_report(&report);

            if let Some(path) = csv_out {
                let mut wtr = csv::Writer::from_path(&path)?;
                for tally in &report.shards {
                    wtr.serialize(tally)?;
                }
                wtr.flush()?;
                println!("Exported {} shard rows to {}", report.shards.len(), path.display());
            }
        }
        Commands::Verify {
            server_seed,
            server_hash,
            client_seed,
            strips,
            reel_seed,
            strip_length,
        } => {
            let params = load_params(strips, reel_seed, strip_length)?;
            let check = verify_round(&params, &server_seed, &server_hash, &client_seed)?;
            println!("hash matches commitment: {}", check.hash_matches);
            for row in &check.outcome.grid {
                let ids: Vec<&str> = row.iter().map(|s| s.id()).collect();
                println!("  {}", ids.join(" "));
            }
            for win in &check.outcome.wins {
                println!(
                    "  line {} {} x{} pays {}",
                    win.payline, win.symbol, win.length, win.multiplier
                );
            }
            println!(
                "multiplier={} scatters={} bonus={}",
                check.outcome.total_multiplier, check.outcome.scatter_count, check.outcome.bonus_triggered
            );
            if !check.hash_matches {
                anyhow::bail!("revealed seed does not match the committed hash");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_needs_strips_or_seed() {
        assert!(load_params(None, None, 100).is_err());
        assert!(load_params(None, Some(1), 100).is_ok());
    }

    #[test]
    fn loads_published_strips() {
        let reference = EngineParams::bounty_default(20, Some(4)).unwrap();
        let body = ReelStripsResponse {
            strips: reference
                .reels
                .strips()
                .iter()
                .map(|s| s.iter().map(|sym| sym.id().to_string()).collect())
                .collect(),
        };
        let path = std::env::temp_dir().join(format!("bounty-strips-{}.json", std::process::id()));
        std::fs::write(&path, serde_json::to_string(&body).unwrap()).unwrap();
        let params = load_params(Some(path.clone()), None, 100).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(params.reels, reference.reels);
    }

    #[test]
    fn published_strips_take_precedence_over_length() {
        let reference = EngineParams::bounty_default(7, Some(5)).unwrap();
        let body = ReelStripsResponse {
            strips: reference
                .reels
                .strips()
                .iter()
                .map(|s| s.iter().map(|sym| sym.id().to_string()).collect())
                .collect(),
        };
        let path = std::env::temp_dir().join(format!("bounty-strips-len-{}.json", std::process::id()));
        std::fs::write(&path, serde_json::to_string(&body).unwrap()).unwrap();
        // a zero strip length would be rejected if default strips were built
        let params = load_params(Some(path.clone()), None, 0).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(params.reels, reference.reels);
    }

    #[tokio::test]
    async fn raised_stop_flag_cancels_simulation() {
        let params = EngineParams::bounty_default(20, Some(6)).unwrap();
        let config = SimulationConfig {
            rounds: 1_000_000,
            bet_per_round: 1.0,
            shards: 2,
            seed: Some(6),
        };
        let report = run_simulation(params, config, Arc::new(AtomicBool::new(true)))
            .await
            .unwrap();
        assert!(report.cancelled);
        assert_eq!(report.total_spins, 0);
    }
}
