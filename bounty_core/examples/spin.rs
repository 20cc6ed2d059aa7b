use std::sync::Arc;

use bounty_core::{verify_round, BetLimits, CommitmentStore, EngineParams, SpinService};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example end-to-end commit-reveal round
    let params = Arc::new(EngineParams::bounty_default(100, Some(1))?);
    let service = SpinService::new(params.clone(), Arc::new(CommitmentStore::default()), BetLimits::default());

    let commitment = service.get_commitment();
    println!("commit_id={} server_hash={}", commitment.id, commitment.server_hash);

    let result = service.perform_spin(&commitment.id, "example-client-seed", 1.0)?;
    println!(
        "payout={} multiplier={} wins={:?} grid={:?}",
        result.payout, result.total_multiplier, result.wins, result.grid
    );

    let check = verify_round(&params, &result.server_seed, &commitment.server_hash, "example-client-seed")?;
    println!("hash_matches={} grid_matches={}", check.hash_matches, check.outcome.grid == result.grid);
    Ok(())
}
