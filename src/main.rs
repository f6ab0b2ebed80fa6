//! Pentaro entry point
//!
//! Headless native runner: drives a session at a fixed frame rate with a
//! scripted player, then records the final score on the leaderboard.
//!
//! Usage: `pentaro [settings.json]`

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use pentaro::settings::ConfigError;
use pentaro::sim::{EffectTracker, FrameOutput, GameOver, GameState};
use pentaro::{FrameDriver, FrameObserver, HighScores, Settings};

/// Logs what a renderer would draw
#[derive(Default)]
struct ConsoleObserver {
    now_ms: f64,
    effects: EffectTracker,
    merges: u32,
    vanishes: u32,
    game_over: Option<GameOver>,
}

impl FrameObserver for ConsoleObserver {
    fn on_frame(&mut self, frame: &FrameOutput) {
        self.effects.update(self.now_ms, &frame.effects);
        for effect in &frame.effects {
            if effect.is_vanish {
                self.vanishes += 1;
            } else {
                self.merges += 1;
            }
        }
        if frame.score_delta > 0 {
            log::debug!(
                "+{} (score {}, {} tokens, {} effects on screen)",
                frame.score_delta,
                frame.score,
                frame.tokens.len(),
                self.effects.len()
            );
        }
    }

    fn on_game_over(&mut self, over: &GameOver) {
        self.game_over = Some(*over);
    }
}

fn wall_clock_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

fn run() -> Result<(), ConfigError> {
    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(Path::new(&path))?,
        None => Settings::default(),
    };
    let tuning = settings.tuning()?;
    let seed = settings.seed.unwrap_or_else(|| wall_clock_ms() as u64);
    log::info!("Pentaro (native) starting with seed {}", seed);

    let (left, right) = (tuning.drop_margin, tuning.container_width - tuning.drop_margin);
    let mut player = Pcg32::seed_from_u64(seed.wrapping_add(1));
    let mut driver = FrameDriver::new(GameState::new(tuning, seed));
    let mut observer = ConsoleObserver::default();

    let drop_every = settings.drop_every_frames.max(1) as u64;
    let start = Instant::now();
    let mut frame = 0u64;

    while let Some(request) = driver.request_frame() {
        if frame >= settings.max_frames {
            log::warn!("Frame limit reached without a loss");
            driver.stop();
            break;
        }

        if frame % drop_every == 0 {
            driver.set_drop_x(player.random_range(left..=right.max(left)));
            driver.drop_token();
        }
        if settings.auto_punch && driver.state().can_punch() {
            driver.punch();
        }

        observer.now_ms = start.elapsed().as_secs_f64() * 1000.0;
        driver.on_frame(request, observer.now_ms, &mut observer);
        if observer.game_over.is_some() {
            driver.stop();
        }

        frame += 1;
        thread::sleep(Duration::from_millis(settings.frame_interval_ms));
    }

    let final_score = observer
        .game_over
        .map(|over| over.final_score)
        .unwrap_or(driver.state().score);
    println!(
        "Game over after {} frames: score {} ({} merges, {} vanishes)",
        frame, final_score, observer.merges, observer.vanishes
    );

    let mut scores = match &settings.highscores_path {
        Some(path) => HighScores::load(path)?,
        None => HighScores::new(),
    };
    match scores.add_score(&settings.player_name, final_score, wall_clock_ms()) {
        Some(rank) => println!("Leaderboard rank #{}", rank),
        None => println!("Did not make the leaderboard"),
    }
    if let Some(top) = scores.top_score() {
        println!("Best on record: {}", top);
    }
    if let Some(path) = &settings.highscores_path {
        scores.save(path)?;
    }

    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("{e}");
        eprintln!("pentaro: {e}");
        std::process::exit(1);
    }
}
