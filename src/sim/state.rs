//! Game state and core simulation types
//!
//! Everything a tick reads or writes lives in [`GameState`], so several
//! games can run side by side and tests can build boards directly.

use std::fmt;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::spatial::SpatialSet;
use super::tick::generate_level;
use super::trajectory::predict_trajectory;
use crate::consts::*;
use crate::settings::Settings;
use crate::{aim_toward, upward_unit};

/// Identifier of a settled bubble (monotonic within a board)
pub type BubbleId = u32;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Main menu, nothing simulates
    Menu,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Bubbles reached the shooter line
    GameOver,
}

/// Bubble colors, in the order they unlock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BubbleColor {
    Red,
    Yellow,
    Green,
    Blue,
    Purple,
}

impl BubbleColor {
    pub const ALL: [BubbleColor; 5] = [
        BubbleColor::Red,
        BubbleColor::Yellow,
        BubbleColor::Green,
        BubbleColor::Blue,
        BubbleColor::Purple,
    ];

    /// Palette entry for renderers
    pub fn hex(self) -> &'static str {
        match self {
            BubbleColor::Red => "#ff595e",
            BubbleColor::Yellow => "#ffca3a",
            BubbleColor::Green => "#8ac926",
            BubbleColor::Blue => "#1982c4",
            BubbleColor::Purple => "#6a4c93",
        }
    }

    /// Color at `index` in unlock order (wraps)
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }
}

/// A settled bubble
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bubble {
    pub id: BubbleId,
    pub pos: Vec2,
    pub radius: f32,
    pub color: BubbleColor,
}

/// Playfield geometry. Y grows downward; the ceiling is y = 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    pub radius: f32,
    /// Y of the cannon; loaded shots sit here
    pub shooter_y: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(BOARD_WIDTH, BOARD_HEIGHT, BUBBLE_RADIUS)
    }
}

impl Arena {
    pub fn new(width: f32, height: f32, radius: f32) -> Self {
        Self {
            width,
            height,
            radius,
            shooter_y: height - SHOOTER_OFFSET,
        }
    }

    /// Cannon position (horizontal center of the shooter line)
    pub fn shooter_pos(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.shooter_y)
    }

    /// Squared distance under which two bubbles are color-graph neighbors
    pub fn neighbor_dist_sq(&self) -> f32 {
        let d = self.radius * NEIGHBOR_FACTOR;
        d * d
    }

    /// Squared distance under which a moving bubble strikes a settled one
    pub fn collision_dist_sq(&self) -> f32 {
        let d = self.radius * 2.0;
        d * d * COLLISION_FACTOR
    }

    /// Bubbles at or above this y anchor the ceiling
    pub fn ceiling_anchor_y(&self) -> f32 {
        self.radius * CEILING_ANCHOR_FACTOR
    }

    /// A bubble whose bottom edge reaches this y ends the game
    pub fn lose_line(&self) -> f32 {
        self.shooter_y - LOSE_MARGIN
    }
}

/// The in-flight (or loaded) bubble
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveShot {
    pub pos: Vec2,
    /// Velocity in px/s
    pub vel: Vec2,
    pub color: BubbleColor,
    pub radius: f32,
    /// False while loaded in the cannon
    pub moving: bool,
}

impl ActiveShot {
    /// A shot loaded in the cannon
    pub fn loaded(arena: &Arena, color: BubbleColor) -> Self {
        Self {
            pos: arena.shooter_pos(),
            vel: Vec2::ZERO,
            color,
            radius: arena.radius,
            moving: false,
        }
    }
}

/// Aiming input, the only source of the shot direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimState {
    /// Unit direction (always points upward)
    pub dir: Vec2,
    /// Last pointer position, if aiming came from a pointer
    pub point: Option<Vec2>,
    /// True between aim start and release
    pub aiming: bool,
}

impl Default for AimState {
    fn default() -> Self {
        Self {
            dir: Vec2::NEG_Y,
            point: None,
            aiming: false,
        }
    }
}

/// Level, score and shot counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    pub level: u32,
    pub score: u64,
    pub shot_count: u32,
    pub high_score: u64,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            level: 1,
            score: 0,
            shot_count: 0,
            high_score: 0,
        }
    }
}

impl Progression {
    /// Add points; raises the in-memory high score when beaten
    pub fn add_score(&mut self, points: u64) {
        self.score += points;
        if self.score > self.high_score {
            self.high_score = self.score;
        }
    }
}

/// Discrete notifications for the feedback collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    ShotFired,
    MatchPopped { count: usize },
    FloatersFell { count: usize },
    LevelWon { level: u32 },
    LevelLost { score: u64 },
    LevelStarted { level: u32 },
}

/// Level advance scheduled after a board clear
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingAdvance {
    /// `GameState::epoch` at scheduling time
    pub epoch: u64,
    /// Seconds of Playing time left
    pub remaining: f32,
}

/// Source of bubble colors
pub trait ColorSource {
    /// Pick one of the first `pool` colors
    fn next_color(&mut self, pool: usize) -> BubbleColor;
}

/// Color source backed by any `rand` generator
#[derive(Debug, Clone)]
pub struct RngColors<R>(pub R);

impl RngColors<Pcg32> {
    /// Non-deterministic source seeded from the thread RNG
    pub fn from_entropy() -> Self {
        Self(Pcg32::from_rng(&mut rand::rng()))
    }

    /// Reproducible source
    pub fn seeded(seed: u64) -> Self {
        Self(Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> ColorSource for RngColors<R> {
    fn next_color(&mut self, pool: usize) -> BubbleColor {
        let pool = pool.clamp(1, BubbleColor::ALL.len());
        BubbleColor::from_index(self.0.random_range(0..pool))
    }
}

/// Complete game state (the simulation context)
pub struct GameState {
    /// Playfield geometry
    pub arena: Arena,
    /// Settled bubbles
    pub board: SpatialSet,
    /// Loaded or in-flight bubble
    pub shot: Option<ActiveShot>,
    /// Preview of the next loaded color
    pub next_color: Option<BubbleColor>,
    pub aim: AimState,
    pub progress: Progression,
    pub phase: GamePhase,
    /// Shot speed in px/s
    pub shot_speed: f32,
    /// Seconds between a board clear and the next level
    pub level_advance_delay: f32,
    pub pending_advance: Option<PendingAdvance>,
    /// Bumped whenever a scheduled level advance must be invalidated
    pub epoch: u64,
    /// Simulation tick counter (Playing ticks only)
    pub time_ticks: u64,
    /// True once a game has been started
    pub session_started: bool,
    events: Vec<GameEvent>,
    colors: Box<dyn ColorSource + Send>,
}

impl fmt::Debug for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameState")
            .field("phase", &self.phase)
            .field("progress", &self.progress)
            .field("bubbles", &self.board.len())
            .field("shot", &self.shot)
            .field("pending_advance", &self.pending_advance)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl GameState {
    /// Create a game sitting in the menu
    pub fn new(arena: Arena, colors: Box<dyn ColorSource + Send>) -> Self {
        Self {
            arena,
            board: SpatialSet::new(arena.radius),
            shot: None,
            next_color: None,
            aim: AimState::default(),
            progress: Progression::default(),
            phase: GamePhase::Menu,
            shot_speed: SHOT_SPEED,
            level_advance_delay: LEVEL_ADVANCE_DELAY,
            pending_advance: None,
            epoch: 0,
            time_ticks: 0,
            session_started: false,
            events: Vec::new(),
            colors,
        }
    }

    /// Create a game configured from settings
    pub fn from_settings(settings: &Settings, colors: Box<dyn ColorSource + Send>) -> Self {
        let mut state = Self::new(settings.arena(), colors);
        state.shot_speed = settings.shot_speed;
        state.level_advance_delay = settings.level_advance_delay;
        state
    }

    /// Default arena with a reproducible color sequence
    pub fn seeded(seed: u64) -> Self {
        Self::new(Arena::default(), Box::new(RngColors::seeded(seed)))
    }

    /// Number of colors in play at the current level
    pub fn color_pool(&self) -> usize {
        (BASE_COLOR_POOL + self.progress.level as usize).min(BubbleColor::ALL.len())
    }

    /// Draw a color from the current pool
    pub fn draw_color(&mut self) -> BubbleColor {
        let pool = self.color_pool();
        self.colors.next_color(pool)
    }

    /// Queue an event for the feedback collaborator
    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// True while a fired bubble is still flying
    pub fn shot_in_flight(&self) -> bool {
        self.shot.is_some_and(|s| s.moving)
    }

    /// Load the next bubble into the cannon
    pub fn spawn_shot(&mut self) {
        let color = match self.next_color.take() {
            Some(color) => color,
            None => self.draw_color(),
        };
        self.shot = Some(ActiveShot::loaded(&self.arena, color));
        self.next_color = Some(self.draw_color());
    }

    /// Rebuild the board for the current level and load a shot
    fn build_level(&mut self) {
        self.pending_advance = None;
        self.aim.aiming = false;
        self.progress.shot_count = 0;
        generate_level(self);
        self.next_color = Some(self.draw_color());
        self.spawn_shot();
        let level = self.progress.level;
        self.push_event(GameEvent::LevelStarted { level });
        log::debug!("Level {} built with {} bubbles", level, self.board.len());
    }

    /// Menu -> Playing with fresh progression (high score survives)
    pub fn start_new_game(&mut self) {
        self.epoch += 1;
        self.progress = Progression {
            high_score: self.progress.high_score,
            ..Progression::default()
        };
        self.phase = GamePhase::Playing;
        self.session_started = true;
        self.build_level();
    }

    /// Replay the current level keeping score and level
    pub fn restart_level(&mut self) {
        if !self.session_started {
            self.start_new_game();
            return;
        }
        self.epoch += 1;
        self.phase = GamePhase::Playing;
        self.build_level();
    }

    /// Menu -> Playing, resuming the in-memory game if there is one
    pub fn continue_game(&mut self) {
        if self.phase != GamePhase::Menu {
            return;
        }
        if !self.session_started {
            self.start_new_game();
            return;
        }
        match (self.shot.is_none(), self.board.is_empty()) {
            // Lost before leaving to the menu; nothing to resume
            (true, false) => {
                log::info!("Previous game is over, starting a new one");
                self.start_new_game();
            }
            // A clear whose advance was cancelled by leaving to the menu
            (true, true) => {
                self.phase = GamePhase::Playing;
                self.advance_level();
            }
            _ => self.phase = GamePhase::Playing,
        }
    }

    /// Playing -> Paused
    pub fn pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
        }
    }

    /// Paused -> Playing
    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
        }
    }

    /// Any phase -> Menu; invalidates a scheduled level advance
    pub fn go_to_menu(&mut self) {
        self.epoch += 1;
        self.aim.aiming = false;
        self.phase = GamePhase::Menu;
    }

    /// Playing -> GameOver
    pub(crate) fn end_game(&mut self) {
        self.epoch += 1;
        self.aim.aiming = false;
        self.phase = GamePhase::GameOver;
        let score = self.progress.score;
        self.push_event(GameEvent::LevelLost { score });
        log::info!(
            "Game over at level {} with score {}",
            self.progress.level,
            score
        );
    }

    /// Next level: one more row, possibly one more color
    pub fn advance_level(&mut self) {
        self.progress.level += 1;
        self.build_level();
    }

    /// Schedule the delayed level advance after a board clear
    pub(crate) fn schedule_level_advance(&mut self) {
        self.pending_advance = Some(PendingAdvance {
            epoch: self.epoch,
            remaining: self.level_advance_delay,
        });
    }

    /// Run a scheduled advance; stale epochs or non-Playing phases are no-ops
    pub(crate) fn complete_level_advance(&mut self, epoch: u64) {
        if epoch != self.epoch || self.phase != GamePhase::Playing {
            log::debug!("Dropping stale level advance (epoch {epoch}, now {})", self.epoch);
            return;
        }
        self.advance_level();
    }

    /// True when aim input has an effect
    fn can_aim(&self) -> bool {
        self.phase == GamePhase::Playing && self.shot.is_some_and(|s| !s.moving)
    }

    /// Start or move the aim with a direction vector
    pub fn aim(&mut self, dir: Vec2) {
        if !self.can_aim() {
            return;
        }
        if let Some(dir) = upward_unit(dir) {
            self.aim.dir = dir;
            self.aim.aiming = true;
        }
    }

    /// Start or move the aim toward a pointer position
    pub fn aim_at(&mut self, point: Vec2) {
        if !self.can_aim() {
            return;
        }
        self.aim.dir = aim_toward(self.arena.shooter_pos(), point);
        self.aim.point = Some(point);
        self.aim.aiming = true;
    }

    /// Pointer left the playfield
    pub fn cancel_aim(&mut self) {
        self.aim.aiming = false;
    }

    /// Release: launch the loaded bubble along the aim.
    ///
    /// Returns false (and changes nothing) unless Playing, aiming, and a
    /// bubble is loaded but not yet moving.
    pub fn fire(&mut self) -> bool {
        if !self.aim.aiming || !self.can_aim() {
            return false;
        }
        let vel = self.aim.dir * self.shot_speed;
        let Some(shot) = self.shot.as_mut() else {
            return false;
        };
        shot.vel = vel;
        shot.moving = true;
        self.aim.aiming = false;
        self.progress.shot_count += 1;
        self.push_event(GameEvent::ShotFired);
        true
    }

    /// Predicted path for the loaded bubble, empty unless one is ready
    pub fn preview_path(&self) -> Vec<Vec2> {
        match self.shot {
            Some(shot) if !shot.moving && self.phase == GamePhase::Playing => {
                predict_trajectory(shot.pos, self.aim.dir, &self.board, &self.arena)
            }
            _ => Vec::new(),
        }
    }
}
