//! Bubble Shooter - a hex-packed bubble popping arcade game
//!
//! Core modules:
//! - `sim`: Simulation engine (board, matching, snapping, shots, game state)
//! - `session`: Fixed-timestep driver wiring the sim to its collaborators
//! - `feedback`: Audio/feedback event sink
//! - `highscores`: High score persistence
//! - `settings`: Data-driven configuration

pub mod error;
pub mod feedback;
pub mod highscores;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::StoreError;
pub use feedback::{FeedbackSink, LogFeedback};
pub use highscores::{HighScoreStore, JsonFileStore, MemoryStore};
#[cfg(target_arch = "wasm32")]
pub use highscores::LocalStorageStore;
pub use session::{RenderSnapshot, Session};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per 60 Hz display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Playfield dimensions
    pub const BOARD_WIDTH: f32 = 480.0;
    pub const BOARD_HEIGHT: f32 = 720.0;
    /// Shooter line sits this far above the bottom edge
    pub const SHOOTER_OFFSET: f32 = 60.0;

    /// Bubble defaults
    pub const BUBBLE_RADIUS: f32 = 16.0;
    /// Shot speed in px/s (8 px per frame at 60 Hz)
    pub const SHOT_SPEED: f32 = 480.0;

    /// Color adjacency distance as a multiple of radius (looser than contact)
    pub const NEIGHBOR_FACTOR: f32 = 2.3;
    /// Fraction of the squared contact distance that counts as a hit
    pub const COLLISION_FACTOR: f32 = 0.9;
    /// Snap candidates may sit this much closer than contact to other bubbles
    pub const SNAP_OVERLAP_SLACK: f32 = 2.0;
    /// Bubbles with y <= this multiple of radius anchor to the ceiling
    pub const CEILING_ANCHOR_FACTOR: f32 = 1.5;
    /// Lose when a bubble's bottom edge gets this close to the shooter line
    pub const LOSE_MARGIN: f32 = 5.0;

    /// Minimum same-color component size that pops
    pub const MATCH_MIN: usize = 3;
    /// Score per popped bubble
    pub const POP_POINTS: u64 = 10;
    /// Score per fallen floater
    pub const FALL_POINTS: u64 = 5;

    /// Rows in the opening grid are BASE_ROWS + level
    pub const BASE_ROWS: u32 = 4;
    /// Vertical pitch between grid rows as a multiple of radius
    pub const ROW_PITCH_FACTOR: f32 = 1.75;
    /// Colors available at level 1 are BASE_COLOR_POOL + 1
    pub const BASE_COLOR_POOL: usize = 3;

    /// Delay between clearing the board and the next level (seconds)
    pub const LEVEL_ADVANCE_DELAY: f32 = 0.9;

    /// Trajectory preview step length (px)
    pub const TRAJECTORY_STEP: f32 = 8.0;
    /// Hard cap on preview steps
    pub const MAX_TRAJECTORY_STEPS: usize = 1200;

    /// Pointer aims are clamped to at least this far above the shooter (px)
    pub const MIN_AIM_RISE: f32 = 40.0;
}

/// Unit aim direction from the shooter toward a pointer position.
///
/// The vertical offset is clamped so the cannon never points below
/// `MIN_AIM_RISE` px above itself.
pub fn aim_toward(shooter: Vec2, point: Vec2) -> Vec2 {
    let mut delta = point - shooter;
    delta.y = delta.y.min(-consts::MIN_AIM_RISE);
    delta.normalize_or(Vec2::NEG_Y)
}

/// Force a direction to point upward, then normalize it.
///
/// Returns `None` for a zero vector.
pub fn upward_unit(dir: Vec2) -> Option<Vec2> {
    let unit = dir.try_normalize()?;
    // Keep at least a small upward component so every shot terminates
    let min_rise = 0.05;
    if unit.y > -min_rise {
        Vec2::new(unit.x, -min_rise).try_normalize()
    } else {
        Some(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aim_toward_clamps_downward_pointer() {
        let shooter = Vec2::new(240.0, 660.0);
        let dir = aim_toward(shooter, Vec2::new(240.0, 700.0));
        assert!((dir - Vec2::NEG_Y).length() < 1e-5);
    }

    #[test]
    fn test_aim_toward_is_unit() {
        let shooter = Vec2::new(240.0, 660.0);
        let dir = aim_toward(shooter, Vec2::new(100.0, 200.0));
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert!(dir.x < 0.0 && dir.y < 0.0);
    }

    #[test]
    fn test_upward_unit() {
        assert!(upward_unit(Vec2::ZERO).is_none());
        let up = upward_unit(Vec2::new(0.0, -3.0)).unwrap();
        assert!((up - Vec2::NEG_Y).length() < 1e-6);
        let flat = upward_unit(Vec2::new(1.0, 0.5)).unwrap();
        assert!(flat.y < 0.0);
        assert!((flat.length() - 1.0).abs() < 1e-5);
    }
}
