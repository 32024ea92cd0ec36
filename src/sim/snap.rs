//! Hex-slot snapping for a shot that struck a settled bubble

use glam::Vec2;

use super::spatial::SpatialSet;
use super::state::{ActiveShot, Arena, Bubble};
use crate::consts::SNAP_OVERLAP_SLACK;

/// The six lattice slots around `anchor`, at 0°, 60°, ... 300°
pub fn snap_candidates(anchor: Vec2, radius: f32) -> [Vec2; 6] {
    let step = std::f32::consts::PI / 3.0;
    std::array::from_fn(|i| {
        let angle = step * i as f32;
        anchor + Vec2::new(angle.cos(), angle.sin()) * (radius * 2.0)
    })
}

/// True if `pos` is a legal resting place next to `anchor`
fn is_valid_slot(board: &SpatialSet, anchor: &Bubble, pos: Vec2, arena: &Arena) -> bool {
    let r = arena.radius;
    if pos.x < r || pos.x > arena.width - r {
        return false;
    }
    if pos.y < r {
        return false;
    }
    let min_dist = r * 2.0 - SNAP_OVERLAP_SLACK;
    let min_dist_sq = min_dist * min_dist;
    !board
        .within(pos, min_dist_sq)
        .iter()
        .any(|b| b.id != anchor.id && b.pos.distance_squared(pos) < min_dist_sq)
}

/// Closest valid hex slot around `anchor` to where the shot was when it hit.
///
/// Ties keep the earlier angle.
pub fn find_snap_position(
    board: &SpatialSet,
    anchor: &Bubble,
    shot_pos: Vec2,
    arena: &Arena,
) -> Option<Vec2> {
    let mut best: Option<(Vec2, f32)> = None;
    for pos in snap_candidates(anchor.pos, arena.radius) {
        if !is_valid_slot(board, anchor, pos, arena) {
            continue;
        }
        let dist = pos.distance_squared(shot_pos);
        if best.is_none_or(|(_, d)| dist < d) {
            best = Some((pos, dist));
        }
    }
    best.map(|(pos, _)| pos)
}

/// Where the shot settles: the best hex slot, or if none is free, one
/// diameter back from the anchor along the incoming direction.
pub fn resolve_placement(
    board: &SpatialSet,
    anchor: &Bubble,
    shot: &ActiveShot,
    arena: &Arena,
) -> Vec2 {
    if let Some(pos) = find_snap_position(board, anchor, shot.pos, arena) {
        return pos;
    }
    log::debug!("No free slot around bubble {}, backing off", anchor.id);
    let heading = shot.vel.normalize_or(Vec2::NEG_Y);
    anchor.pos - heading * (shot.radius * 2.0)
}
