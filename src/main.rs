//! Pool Sim headless driver
//!
//! Racks a table, plays a number of seeded random shots against the
//! headless scene and prints the final table as JSON.

#[cfg(not(target_arch = "wasm32"))]
use rand::{Rng, SeedableRng};
#[cfg(not(target_arch = "wasm32"))]
use rand_pcg::Pcg32;

#[cfg(not(target_arch = "wasm32"))]
use pool_sim::Settings;
#[cfg(not(target_arch = "wasm32"))]
use pool_sim::consts::MAX_FRAME_DT;
#[cfg(not(target_arch = "wasm32"))]
use pool_sim::scene::{HeadlessEngine, HeadlessScene};
#[cfg(not(target_arch = "wasm32"))]
use pool_sim::sim::{Game, GameEvent, GamePhase};

#[cfg(not(target_arch = "wasm32"))]
const USAGE: &str = "usage: pool-sim [settings.json] [--seed N] [--shots N]";

/// Safety cap on frames simulated per shot (a minute at 60 FPS)
#[cfg(not(target_arch = "wasm32"))]
const MAX_FRAMES_PER_SHOT: u32 = 60 * 60;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
struct Options {
    settings_path: Option<String>,
    seed: u64,
    shots: u32,
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options, String> {
    let mut options = Options {
        settings_path: None,
        seed: 1,
        shots: 5,
    };

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                let value = args.next().ok_or("--seed needs a value")?;
                options.seed = value.parse().map_err(|e| format!("bad seed {value:?}: {e}"))?;
            }
            "--shots" => {
                let value = args.next().ok_or("--shots needs a value")?;
                options.shots = value.parse().map_err(|e| format!("bad shot count {value:?}: {e}"))?;
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            path => options.settings_path = Some(path.to_string()),
        }
    }

    Ok(options)
}

/// Fixed step for the driver loop. Long frames let fast balls skip through
/// each other, so the step is capped.
#[cfg(not(target_arch = "wasm32"))]
fn frame_step(settings: &Settings) -> f32 {
    settings.frame_dt().min(MAX_FRAME_DT)
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let options = match parse_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(msg) => {
            eprintln!("{msg}\n{USAGE}");
            std::process::exit(2);
        }
    };

    let settings = options
        .settings_path
        .as_deref()
        .map(Settings::load_or_default)
        .unwrap_or_default();

    log::info!("Pool Sim (headless) starting, seed {}", options.seed);

    let mut scene = HeadlessScene::new();
    let mut engine = HeadlessEngine::default();
    let mut game = Game::new(settings.clone());
    game.init(&mut scene, &mut engine);

    let dt = frame_step(&settings);
    let (hw, hh) = (0.5 * settings.table_width, 0.5 * settings.table_height);
    let mut rng = Pcg32::seed_from_u64(options.seed);

    for shot in 1..=options.shots {
        let hold = rng.random_range(0.2..=1.0f32) * settings.charge_time;
        let aim = (rng.random_range(-hw..hw), rng.random_range(-hh..hh));

        game.mouse_button_pressed(aim.0, aim.1);
        let mut held = 0.0;
        while held < hold {
            game.update(&mut scene, dt);
            held += dt;
        }
        game.mouse_button_released(aim.0, aim.1);

        let mut frames = 0;
        while game.phase() == GamePhase::BallsMoving && frames < MAX_FRAMES_PER_SHOT {
            game.update(&mut scene, dt);
            frames += 1;
        }
        if game.phase() == GamePhase::BallsMoving {
            log::warn!("Shot {shot}: balls still moving after {frames} frames");
        }

        for event in game.drain_events() {
            match event {
                GameEvent::BallPocketed { ball, pocket } => {
                    log::info!("Shot {shot}: ball {ball} dropped in pocket {pocket}")
                }
                GameEvent::CueBallPocketed { pocket } => {
                    log::info!("Shot {shot}: scratch in pocket {pocket}")
                }
                other => log::debug!("Shot {shot}: {other:?}"),
            }
        }

        log::info!(
            "Shot {shot}: settled after {frames} frames, {} balls down",
            game.table().pocketed_count()
        );
    }

    match serde_json::to_string_pretty(&game.table().snapshot()) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Cannot serialize table: {e}"),
    }

    game.deinit(&mut scene);
    log::info!("Meshes created {}, destroyed {}", scene.created, scene.destroyed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is embedded by a host page; nothing to run here
}
