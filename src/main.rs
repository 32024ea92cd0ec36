//! Bubble Shooter headless demo
//!
//! Plays the game in idle mode without a window and logs how it goes.
//! Settings are read from `bubble_shooter_settings.json` if present.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::Path;

    use bubble_shooter::sim::{GamePhase, RngColors};
    use bubble_shooter::{JsonFileStore, LogFeedback, Session, Settings};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load(Path::new("bubble_shooter_settings.json"));
    let store = JsonFileStore::new(settings.high_score_path.clone());
    let mut session = Session::new(
        &settings,
        Box::new(RngColors::from_entropy()),
        Box::new(store),
        Box::new(LogFeedback),
    );

    session.start_new_game();
    session.set_idle_mode(true);

    // Five minutes of play at 60 Hz
    let frames = 5 * 60 * 60;
    for _ in 0..frames {
        session.update(1.0 / 60.0);
        if session.state().phase == GamePhase::GameOver {
            break;
        }
    }

    let progress = session.state().progress;
    log::info!(
        "Demo finished: level {}, score {}, best {}, phase {:?}",
        progress.level,
        progress.score,
        progress.high_score,
        session.state().phase
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The wasm build is used as a library; nothing to run here
}
