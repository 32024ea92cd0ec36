//! In-flight shot stepping and collision detection
//!
//! Walls reflect perfectly; the ceiling and settled bubbles stop the shot.

use glam::Vec2;

use super::spatial::SpatialSet;
use super::state::{ActiveShot, Arena, BubbleId};

/// Result of advancing a shot by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotStep {
    /// Still moving
    Flying,
    /// Reached the ceiling; attach without an anchor
    HitCeiling,
    /// Struck a settled bubble; attach next to it
    HitBubble(BubbleId),
}

/// Reflect off the side walls.
///
/// If the circle's edge reaches either wall, the center is clamped back
/// inside and the horizontal velocity is pointed away from that wall.
/// Returns true on a bounce.
pub fn reflect_off_walls(pos: &mut Vec2, vel: &mut Vec2, radius: f32, width: f32) -> bool {
    if pos.x - radius <= 0.0 {
        pos.x = radius;
        vel.x = vel.x.abs();
        true
    } else if pos.x + radius >= width {
        pos.x = width - radius;
        vel.x = -vel.x.abs();
        true
    } else {
        false
    }
}

/// True if a circle's top edge has reached the ceiling
#[inline]
pub fn touches_ceiling(pos: Vec2, radius: f32) -> bool {
    pos.y - radius <= 0.0
}

/// Advance a moving shot one tick.
///
/// Order: move, bounce off walls, ceiling, then bubbles. A ceiling contact
/// wins over a bubble contact in the same tick.
pub fn advance_shot(shot: &mut ActiveShot, board: &SpatialSet, arena: &Arena, dt: f32) -> ShotStep {
    shot.pos += shot.vel * dt;

    reflect_off_walls(&mut shot.pos, &mut shot.vel, shot.radius, arena.width);

    if touches_ceiling(shot.pos, shot.radius) {
        shot.pos.y = shot.radius;
        return ShotStep::HitCeiling;
    }

    match board.first_within(shot.pos, arena.collision_dist_sq()) {
        Some(bubble) => ShotStep::HitBubble(bubble.id),
        None => ShotStep::Flying,
    }
}
