use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use bounty_core::{
    derive_hash_hex, evaluate, generate_server_seed, produce_outcome, simulate, BetLimits, CommitmentStore,
    EngineParams, Paytable, PaytableEntry, ReelsConfig, SimulationConfig, SpinError, SpinService, Symbol,
    PAYLINES, REELS_COUNT,
};

#[test]
fn outcome_repeatable() {
    let params = EngineParams::bounty_default(100, Some(42)).unwrap();
    for i in 0..200 {
        let seed = generate_server_seed();
        let client = format!("player-{i}");
        let a = produce_outcome(&params, &seed, &client).unwrap();
        let b = produce_outcome(&params, &seed, &client).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.bonus_triggered, a.scatter_count >= 3);
        assert_eq!(a.total_multiplier, a.wins.iter().map(|w| w.multiplier).sum::<u64>());
        assert!(a.wins.iter().all(|w| w.symbol != Symbol::Scatter && (3..=5).contains(&w.length)));
    }
}

#[test]
fn commitment_hash_binds_revealed_seed() {
    let store = CommitmentStore::default();
    let issued: Vec<_> = (0..100).map(|_| store.create()).collect();
    for c in issued {
        let seed = store.reveal(&c.id).unwrap();
        assert_eq!(derive_hash_hex(seed.as_bytes()), c.server_hash);
    }
}

#[test]
fn concurrent_reveal_succeeds_once() {
    let store = CommitmentStore::default();
    for _ in 0..50 {
        let c = store.create();
        let wins = AtomicUsize::new(0);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    if store.reveal(&c.id).is_some() {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });
        assert_eq!(wins.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn concurrent_spins_on_one_commitment() {
    let params = Arc::new(EngineParams::bounty_default(100, Some(8)).unwrap());
    let svc = SpinService::new(params, Arc::new(CommitmentStore::default()), BetLimits::default());
    let c = svc.get_commitment();
    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..6)
            .map(|_| s.spawn(|| svc.perform_spin(&c.id, "race", 1.0)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| *e == SpinError::UnknownCommitment));
}

#[test]
fn published_strips_reproduce_server_outcome() {
    let params = EngineParams::bounty_default(100, None).unwrap();
    let json = serde_json::to_string(&params.reels.strips()).unwrap();
    let strips: Vec<Vec<Symbol>> = serde_json::from_str(&json).unwrap();
    let auditor = EngineParams {
        reels: ReelsConfig::from_strips(strips).unwrap(),
        ..params.clone()
    };
    let seed = generate_server_seed();
    assert_eq!(
        produce_outcome(&params, &seed, "audit").unwrap(),
        produce_outcome(&auditor, &seed, "audit").unwrap()
    );
}

fn stub_params(strip_length: usize) -> EngineParams {
    let paytable = Paytable(vec![
        PaytableEntry::new(Symbol::Whiskey, 3, 1, 2, 4),
        PaytableEntry::new(Symbol::Boots, 2, 2, 3, 6),
    ]);
    EngineParams {
        reels: ReelsConfig::from_seed(&paytable, strip_length, 2024).unwrap(),
        paytable,
        paylines: PAYLINES.to_vec(),
    }
}

/// Mean multiplier over every combination of reel stops.
fn exact_expected_multiplier(params: &EngineParams) -> f64 {
    let lens: Vec<usize> = params.reels.strips().iter().map(Vec::len).collect();
    let combos: usize = lens.iter().product();
    let mut total = 0u64;
    for mut code in 0..combos {
        let mut stops = [0usize; REELS_COUNT];
        for (stop, len) in stops.iter_mut().zip(&lens) {
            *stop = code % len;
            code /= len;
        }
        let grid = params.reels.window(stops);
        total += evaluate(&grid, &params.paylines, &params.paytable)
            .unwrap()
            .total_multiplier;
    }
    total as f64 / combos as f64
}

#[test]
fn rtp_simulation_converges_to_exact_value() {
    let params = stub_params(6);
    let exact = exact_expected_multiplier(&params);
    let config = SimulationConfig {
        rounds: 40_000,
        bet_per_round: 1.0,
        shards: 4,
        seed: Some(99),
    };
    let report = simulate(&params, &config, &AtomicBool::new(false)).unwrap();
    let estimate = report.total_payout / report.total_spins as f64;
    assert!(
        (estimate - exact).abs() <= 0.05 * exact + 0.02,
        "simulated {estimate} vs exact {exact}"
    );
    assert!((report.base_game_rtp - estimate * 100.0).abs() < 1e-3);
}

#[test]
fn default_game_rtp_smoke() {
    let params = EngineParams::bounty_default(100, Some(5)).unwrap();
    let config = SimulationConfig {
        rounds: 2_000,
        bet_per_round: 1.0,
        shards: 2,
        seed: Some(5),
    };
    let report = simulate(&params, &config, &AtomicBool::new(false)).unwrap();
    assert_eq!(report.total_spins, 2_000);
    assert!(report.base_game_rtp >= 0.0);
    match report.bonus_frequency {
        Some(freq) => assert!(report.bonus_triggers > 0 && freq >= 1.0),
        None => assert_eq!(report.bonus_triggers, 0),
    }
}
