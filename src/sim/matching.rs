//! Color matching and ceiling connectivity
//!
//! Both searches are breadth-first over the neighbor-threshold proximity
//! graph of the board.

use std::collections::{HashSet, VecDeque};

use super::spatial::SpatialSet;
use super::state::{Arena, Bubble, BubbleId};
use crate::consts::{FALL_POINTS, MATCH_MIN, POP_POINTS};

/// What a placement removed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOutcome {
    /// Same-color component that popped (BFS discovery order)
    pub popped: Vec<Bubble>,
    /// Floaters cut loose by the pop
    pub fallen: Vec<Bubble>,
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        !self.popped.is_empty()
    }

    /// Score for the popped component
    pub fn pop_points(&self) -> u64 {
        self.popped.len() as u64 * POP_POINTS
    }

    /// Score for the fallen floaters
    pub fn fall_points(&self) -> u64 {
        self.fallen.len() as u64 * FALL_POINTS
    }
}

/// Connected same-color component containing `start`, in BFS discovery
/// order. Empty if `start` is not on the board.
pub fn flood_fill_color(board: &SpatialSet, start: BubbleId, arena: &Arena) -> Vec<BubbleId> {
    let Some(origin) = board.get(start) else {
        return Vec::new();
    };
    let color = origin.color;
    let neighbor_sq = arena.neighbor_dist_sq();

    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([*origin]);
    let mut component = Vec::new();

    while let Some(bubble) = queue.pop_front() {
        component.push(bubble.id);
        for other in board.within(bubble.pos, neighbor_sq) {
            if other.color != color || visited.contains(&other.id) {
                continue;
            }
            visited.insert(other.id);
            queue.push_back(*other);
        }
    }

    component
}

/// Pop the component around a freshly placed bubble if it is big enough,
/// then drop whatever lost its path to the ceiling.
///
/// Below `MATCH_MIN` nothing is removed and floaters are not re-checked:
/// adding a bubble can never disconnect another one.
pub fn handle_matches(board: &mut SpatialSet, placed: BubbleId, arena: &Arena) -> MatchOutcome {
    let component = flood_fill_color(board, placed, arena);
    if component.len() < MATCH_MIN {
        return MatchOutcome::default();
    }

    let ids: HashSet<BubbleId> = component.iter().copied().collect();
    let mut removed = board.remove(&ids);
    // Report in discovery order rather than board order
    removed.sort_by_key(|b| component.iter().position(|id| *id == b.id));

    let fallen = remove_floating_bubbles(board, arena);
    log::debug!("Popped {} bubbles, {} fell", removed.len(), fallen.len());

    MatchOutcome {
        popped: removed,
        fallen,
    }
}

/// Ids of every bubble with a neighbor path to a ceiling anchor
pub fn ceiling_connected(board: &SpatialSet, arena: &Arena) -> HashSet<BubbleId> {
    let neighbor_sq = arena.neighbor_dist_sq();
    let anchor_y = arena.ceiling_anchor_y();

    let mut connected = HashSet::new();
    let mut queue = VecDeque::new();
    for bubble in board.iter().filter(|b| b.pos.y <= anchor_y) {
        connected.insert(bubble.id);
        queue.push_back(*bubble);
    }

    while let Some(bubble) = queue.pop_front() {
        for other in board.within(bubble.pos, neighbor_sq) {
            if connected.insert(other.id) {
                queue.push_back(*other);
            }
        }
    }

    connected
}

/// Remove every bubble not connected to the ceiling, returning them in
/// board order. Only meaningful right after a match removal.
pub fn remove_floating_bubbles(board: &mut SpatialSet, arena: &Arena) -> Vec<Bubble> {
    let connected = ceiling_connected(board, arena);
    let floaters: HashSet<BubbleId> = board
        .iter()
        .filter(|b| !connected.contains(&b.id))
        .map(|b| b.id)
        .collect();
    board.remove(&floaters)
}
