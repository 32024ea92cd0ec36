//! Game session: the sim plus its collaborators
//!
//! Owns the [`GameState`], latches input between frames, runs fixed
//! substeps, forwards events to feedback and saves new high scores.

use glam::Vec2;
use serde::Serialize;

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::feedback::{FeedbackSink, dispatch};
use crate::highscores::HighScoreStore;
use crate::settings::Settings;
use crate::sim::{
    ActiveShot, Bubble, BubbleColor, ColorSource, GamePhase, GameState, Progression, TickInput, tick,
};

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub phase: GamePhase,
    pub bubbles: Vec<Bubble>,
    pub shot: Option<ActiveShot>,
    pub next_color: Option<BubbleColor>,
    pub aim_dir: Vec2,
    pub trajectory: Vec<Vec2>,
    pub progress: Progression,
}

/// A running game wired to storage and feedback
pub struct Session {
    state: GameState,
    input: TickInput,
    accumulator: f32,
    show_trajectory: bool,
    /// Best score known to be in the store
    saved_high_score: u64,
    store: Box<dyn HighScoreStore>,
    feedback: Box<dyn FeedbackSink>,
}

impl Session {
    pub fn new(
        settings: &Settings,
        colors: Box<dyn ColorSource + Send>,
        store: Box<dyn HighScoreStore>,
        feedback: Box<dyn FeedbackSink>,
    ) -> Self {
        let fallback;
        let settings = match settings.validate() {
            Ok(()) => settings,
            Err(e) => {
                log::warn!("Ignoring settings: {e}");
                fallback = Settings::default();
                &fallback
            }
        };
        let mut state = GameState::from_settings(settings, colors);
        let saved_high_score = match store.load_high_score() {
            Ok(score) => score,
            Err(e) => {
                log::warn!("High score unavailable, starting from 0: {e}");
                0
            }
        };
        state.progress.high_score = saved_high_score;

        Self {
            state,
            input: TickInput::default(),
            accumulator: 0.0,
            show_trajectory: settings.show_trajectory,
            saved_high_score,
            store,
            feedback,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for tools and tests
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    // === Lifecycle ===

    pub fn start_new_game(&mut self) {
        self.input = TickInput::default();
        self.state.start_new_game();
        self.flush();
    }

    pub fn restart_level(&mut self) {
        self.input = TickInput::default();
        self.state.restart_level();
        self.flush();
    }

    pub fn continue_game(&mut self) {
        self.state.continue_game();
        self.flush();
    }

    pub fn go_to_menu(&mut self) {
        self.state.go_to_menu();
        self.flush();
    }

    // === Input (applied on the next tick) ===

    /// Aim with a direction vector
    pub fn set_aim(&mut self, dir: Vec2) {
        self.input.aim = Some(dir);
    }

    /// Aim toward a playfield point
    pub fn set_aim_point(&mut self, point: Vec2) {
        self.input.aim_point = Some(point);
    }

    pub fn cancel_aim(&mut self) {
        self.input.cancel_aim = true;
    }

    /// Release the aim and fire
    pub fn release(&mut self) {
        self.input.fire = true;
    }

    pub fn toggle_pause(&mut self) {
        self.input.pause = true;
    }

    pub fn set_idle_mode(&mut self, idle: bool) {
        self.input.idle_mode = idle;
    }

    // === Simulation ===

    /// Run one fixed tick
    pub fn step(&mut self) {
        tick(&mut self.state, &self.input, SIM_DT);

        // Clear one-shot inputs after processing
        self.input.aim = None;
        self.input.aim_point = None;
        self.input.cancel_aim = false;
        self.input.fire = false;
        self.input.pause = false;

        self.flush();
    }

    /// Advance by a frame's wall time; returns the number of ticks run
    pub fn update(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, 0.1);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.step();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Drop time we could not catch up on
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    /// Frame data for the renderer
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            phase: self.state.phase,
            bubbles: self.state.board.iter().copied().collect(),
            shot: self.state.shot,
            next_color: self.state.next_color,
            aim_dir: self.state.aim.dir,
            trajectory: if self.show_trajectory {
                self.state.preview_path()
            } else {
                Vec::new()
            },
            progress: self.state.progress,
        }
    }

    /// Hand queued events to feedback and persist a beaten high score
    fn flush(&mut self) {
        for event in self.state.drain_events() {
            dispatch(self.feedback.as_mut(), &event);
        }

        let best = self.state.progress.high_score;
        if best > self.saved_high_score {
            if let Err(e) = self.store.save_high_score(best) {
                log::warn!("Could not save high score {best}: {e}");
            }
            // Only retry once the score climbs again
            self.saved_high_score = best;
        }
    }
}
