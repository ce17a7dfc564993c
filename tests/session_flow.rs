//! Integration tests: whole runs through the `Game` facade.

use lane_runner::autopilot::Autopilot;
use lane_runner::persistence::{JsonFileStore, KeyValueStore, MemoryStore};
use lane_runner::platform::OpenGate;
use lane_runner::sim::{GameEvent, GamePhase, PowerUpKind};
use lane_runner::{Game, SimError, Tuning};

const RUN_LIMIT: u64 = 20_000;

/// Step until the run ends; panics if it never does
fn crash(game: &mut Game) {
    while !game.session().is_over() {
        assert!(game.session().time_ticks < RUN_LIMIT, "run never ended");
        game.step();
    }
}

fn autopilot_run(seed: u64, ticks: u64) -> (Vec<GameEvent>, u64) {
    let mut game = Game::new(Tuning::default(), seed);
    let pilot = Autopilot::new();
    game.start().unwrap();
    let mut events = game.take_events();
    while game.session().time_ticks < ticks && !game.session().is_over() {
        for g in pilot.decide(game.session()) {
            game.push_gesture(g);
        }
        game.step();
        events.extend(game.take_events());
    }
    (events, game.session().score)
}

#[test]
fn test_autopilot_runs_replay_identically() {
    let (events_a, score_a) = autopilot_run(0xA11CE, 3000);
    let (events_b, score_b) = autopilot_run(0xA11CE, 3000);
    assert_eq!(score_a, score_b);
    assert_eq!(events_a, events_b);
}

#[test]
fn test_progress_survives_reopening_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("progress.json");

    let (coins, best) = {
        let store = JsonFileStore::open(&path).unwrap();
        let mut game = Game::new(Tuning::default(), 21).with_store(store);
        game.start().unwrap();
        crash(&mut game);
        (game.economy().coins, game.economy().high_score)
    };

    let store = JsonFileStore::open(&path).unwrap();
    let game = Game::new(Tuning::default(), 22).with_store(store);
    assert_eq!(game.economy().coins, coins);
    assert_eq!(game.economy().high_score, best);
}

#[test]
fn test_resumed_run_is_not_paid_twice() {
    let mut game = Game::new(Tuning::default(), 31).with_gate(OpenGate);
    game.start().unwrap();
    crash(&mut game);
    let first_score = game.session().score;
    let coins_after_first = game.economy().coins;

    game.resume().unwrap();
    assert_eq!(game.phase(), GamePhase::Running);
    assert_eq!(game.session().score, first_score);
    game.take_events();

    crash(&mut game);
    let final_score = game.session().score;
    let collected_after_resume = game
        .events()
        .iter()
        .filter_map(|e| match e {
            GameEvent::CollectiblePicked {
                kind: lane_runner::sim::CollectibleKind::Coin,
                value,
                ..
            } => Some(*value as u64),
            _ => None,
        })
        .sum::<u64>();
    let payout = game
        .events()
        .iter()
        .find_map(|e| match e {
            GameEvent::Payout { coins } => Some(*coins),
            _ => None,
        })
        .unwrap();

    assert_eq!(payout, final_score / 10 - first_score / 10);
    assert_eq!(
        game.economy().coins,
        coins_after_first + collected_after_resume + payout
    );
}

#[test]
fn test_restart_after_game_over_starts_clean() {
    let mut game = Game::new(Tuning::default(), 41);
    game.start().unwrap();
    crash(&mut game);
    let generation = game.session().generation;

    game.restart().unwrap();
    let session = game.session();
    assert_eq!(session.phase, GamePhase::Running);
    assert_eq!(session.generation, generation + 1);
    assert_eq!(session.score, 0);
    assert_eq!(session.combo, 0);
    assert_eq!(session.speed, session.tuning.initial_speed);
    assert!(session.registry.is_empty());
    assert_eq!(game.tracked_entities().count(), 0);
}

#[test]
fn test_purchase_needs_enough_coins() {
    let mut store = MemoryStore::new();
    store.store("runner.coins", 40).unwrap();
    let mut game = Game::new(Tuning::default(), 1).with_store(store);

    let err = game.buy_power_up(PowerUpKind::Speed).unwrap_err();
    assert_eq!(
        err,
        SimError::ResourceExhausted {
            needed: 50,
            available: 40
        }
    );
    assert_eq!(game.economy().coins, 40);
    assert_eq!(game.hud().coins, 40);
}

#[test]
fn test_bought_shield_absorbs_a_crash() {
    let mut store = MemoryStore::new();
    store.store("runner.coins", 50).unwrap();
    let mut game = Game::new(Tuning::default(), 77).with_store(store);
    game.buy_power_up(PowerUpKind::Shield).unwrap();
    assert_eq!(game.economy().coins, 0);

    game.start().unwrap();
    crash(&mut game);
    let session = game.session();
    assert!(session.stats.shields_used >= 1);
    assert_eq!(session.inventory.shield, 0);
    assert!(
        game.events()
            .iter()
            .any(|e| matches!(e, GameEvent::ShieldBlocked { .. }))
    );
}

#[test]
fn test_transitions_reject_wrong_phase() {
    let mut game = Game::new(Tuning::default(), 2);
    assert!(game.pause().is_err());
    assert!(game.unpause().is_err());
    assert!(game.activate_power_up(PowerUpKind::Magnet).is_err());

    game.start().unwrap();
    assert!(game.start().is_err());
    game.pause().unwrap();
    assert!(game.pause().is_err());
    game.unpause().unwrap();
    assert_eq!(game.phase(), GamePhase::Running);
}
