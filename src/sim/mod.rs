//! Simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Fixed timestep only
//! - Colors come from an injected source
//! - Stable iteration order (by bubble ID)
//! - No rendering, audio or storage dependencies

pub mod collision;
pub mod matching;
pub mod snap;
pub mod spatial;
pub mod state;
pub mod tick;
pub mod trajectory;

pub use collision::{ShotStep, advance_shot, reflect_off_walls};
pub use matching::{
    MatchOutcome, ceiling_connected, flood_fill_color, handle_matches, remove_floating_bubbles,
};
pub use snap::{find_snap_position, resolve_placement, snap_candidates};
pub use spatial::SpatialSet;
pub use state::{
    ActiveShot, AimState, Arena, Bubble, BubbleColor, BubbleId, ColorSource, GameEvent, GamePhase,
    GameState, PendingAdvance, Progression, RngColors,
};
pub use tick::{TickInput, attach_shot, generate_level, reached_shooter_line, tick};
pub use trajectory::predict_trajectory;
