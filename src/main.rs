//! Lane Runner entry point
//!
//! Native builds run a headless demo: the autopilot plays seeded runs against
//! the simulation, progress is kept in a JSON file, and events go to the log.
//!
//! Usage: `lane-runner [seed] [runs] [tuning.json]`
//! The store path can be set with `LANE_RUNNER_STORE`.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use lane_runner::autopilot::Autopilot;
    use lane_runner::persistence::JsonFileStore;
    use lane_runner::platform::OpenGate;
    use lane_runner::sim::{GameEvent, PowerUpKind};
    use lane_runner::{Game, Tuning};

    /// Hard stop for a single run under autopilot
    const MAX_RUN_TICKS: u64 = 60 * 60 * 10;

    struct Args {
        seed: u64,
        runs: u32,
        tuning: Tuning,
        store: PathBuf,
    }

    fn parse_args() -> Result<Args, String> {
        let mut args = std::env::args().skip(1);
        let seed = match args.next() {
            Some(s) => s.parse().map_err(|e| format!("bad seed {s:?}: {e}"))?,
            None => 0x5EED,
        };
        let runs = match args.next() {
            Some(s) => s.parse().map_err(|e| format!("bad run count {s:?}: {e}"))?,
            None => 3,
        };
        let tuning = match args.next() {
            Some(path) => {
                let json = std::fs::read_to_string(&path).map_err(|e| format!("{path}: {e}"))?;
                Tuning::from_json(&json).map_err(|e| format!("{path}: {e}"))?
            }
            None => Tuning::default(),
        };
        let store = std::env::var_os("LANE_RUNNER_STORE")
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("lane-runner.json"));
        Ok(Args {
            seed,
            runs,
            tuning,
            store,
        })
    }

    pub fn run() -> Result<(), String> {
        let args = parse_args()?;
        let store = JsonFileStore::open(&args.store).map_err(|e| e.to_string())?;
        log::info!("Progress file: {}", args.store.display());

        let mut game = Game::new(args.tuning, args.seed)
            .with_store(store)
            .with_gate(OpenGate);
        let pilot = Autopilot::new();

        for run in 0..args.runs {
            if run == 0 {
                game.start().map_err(|e| e.to_string())?;
            } else {
                game.restart().map_err(|e| e.to_string())?;
            }
            // Spend spare coins on a shield before each run
            if let Err(e) = game.buy_power_up(PowerUpKind::Shield) {
                log::debug!("No shield this run: {}", e);
            }

            while !game.session().is_over() && game.session().time_ticks < MAX_RUN_TICKS {
                for gesture in pilot.decide(game.session()) {
                    game.push_gesture(gesture);
                }
                game.step();
            }

            let hud = game.hud();
            let payout = game
                .take_events()
                .iter()
                .filter_map(|e| match e {
                    GameEvent::Payout { coins } => Some(*coins),
                    _ => None,
                })
                .sum::<u64>();
            log::info!(
                "Run {}: score {} distance {:.0} payout {} (coins {}, best {})",
                run + 1,
                hud.score,
                hud.distance,
                payout,
                hud.coins,
                hud.high_score
            );
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Lane Runner (headless) starting...");

    if let Err(e) = headless::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host drives `Game` directly; there is no standalone entry point
}
