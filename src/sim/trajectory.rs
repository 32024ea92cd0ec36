//! Aim preview: the bounce path a shot would take
//!
//! Mirrors the shot stepping rules with a fixed step length and a hard
//! step cap. Read-only over the board.

use glam::Vec2;

use super::collision::{reflect_off_walls, touches_ceiling};
use super::spatial::SpatialSet;
use super::state::Arena;
use crate::consts::{MAX_TRAJECTORY_STEPS, TRAJECTORY_STEP};

/// Polyline from `origin` along `dir` until the ceiling, a predicted
/// bubble hit, or the step cap. The first point is `origin`.
pub fn predict_trajectory(origin: Vec2, dir: Vec2, board: &SpatialSet, arena: &Arena) -> Vec<Vec2> {
    let mut path = vec![origin];
    let Some(mut dir) = dir.try_normalize() else {
        return path;
    };
    let mut pos = origin;
    let hit_sq = arena.collision_dist_sq();

    for _ in 0..MAX_TRAJECTORY_STEPS {
        pos += dir * TRAJECTORY_STEP;
        reflect_off_walls(&mut pos, &mut dir, arena.radius, arena.width);

        if touches_ceiling(pos, arena.radius) {
            pos.y = arena.radius;
            path.push(pos);
            break;
        }

        path.push(pos);
        if board.first_within(pos, hit_sq).is_some() {
            break;
        }
    }

    path
}
