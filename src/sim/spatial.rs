//! Settled-bubble storage with proximity queries
//!
//! Adjacency is purely distance based. Queries go through a uniform grid
//! bucketed at `2 * radius`, but always return exactly what a linear scan
//! over the board would, in insertion order.

use std::collections::{HashMap, HashSet};

use glam::Vec2;

use super::state::{Bubble, BubbleColor, BubbleId};

/// Above this many cells per axis a query falls back to the linear scan
const MAX_CELL_SPAN: i32 = 8;

/// The set of settled bubbles
#[derive(Debug, Clone, Default)]
pub struct SpatialSet {
    /// Sorted by id (ids are handed out in increasing order)
    bubbles: Vec<Bubble>,
    cells: HashMap<(i32, i32), Vec<BubbleId>>,
    cell_size: f32,
    next_id: BubbleId,
}

impl SpatialSet {
    /// Empty set indexed for bubbles of `radius`
    pub fn new(radius: f32) -> Self {
        Self::with_cell_size(radius * 2.0)
    }

    pub fn with_cell_size(cell_size: f32) -> Self {
        Self {
            bubbles: Vec::new(),
            cells: HashMap::new(),
            cell_size: cell_size.max(1.0),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    /// Bubbles in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Bubble> {
        self.bubbles.iter()
    }

    pub fn get(&self, id: BubbleId) -> Option<&Bubble> {
        self.bubbles
            .binary_search_by_key(&id, |b| b.id)
            .ok()
            .map(|i| &self.bubbles[i])
    }

    /// Remove everything (ids keep counting up)
    pub fn clear(&mut self) {
        self.bubbles.clear();
        self.cells.clear();
    }

    fn cell_of(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    /// Settle a bubble and return its id
    pub fn insert(&mut self, pos: Vec2, radius: f32, color: BubbleColor) -> BubbleId {
        let id = self.next_id;
        self.next_id += 1;
        self.bubbles.push(Bubble {
            id,
            pos,
            radius,
            color,
        });
        let cell = self.cell_of(pos);
        self.cells.entry(cell).or_default().push(id);
        id
    }

    /// Remove every bubble in `ids` at once, returning them in insertion order
    pub fn remove(&mut self, ids: &HashSet<BubbleId>) -> Vec<Bubble> {
        if ids.is_empty() {
            return Vec::new();
        }
        let mut removed = Vec::with_capacity(ids.len());
        self.bubbles.retain(|b| {
            if ids.contains(&b.id) {
                removed.push(*b);
                false
            } else {
                true
            }
        });
        for bubble in &removed {
            let cell = self.cell_of(bubble.pos);
            if let Some(bucket) = self.cells.get_mut(&cell) {
                bucket.retain(|id| *id != bubble.id);
                if bucket.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
        removed
    }

    /// Bubbles whose center lies within `threshold_sq` (squared distance,
    /// inclusive) of `point`, in insertion order
    pub fn within(&self, point: Vec2, threshold_sq: f32) -> Vec<&Bubble> {
        let reach = threshold_sq.max(0.0).sqrt();
        // One extra ring absorbs rounding at cell borders
        let span = (reach / self.cell_size).ceil() as i32 + 1;
        if span > MAX_CELL_SPAN {
            return self.within_linear(point, threshold_sq);
        }

        let (cx, cy) = self.cell_of(point);
        let mut ids = Vec::new();
        for dx in -span..=span {
            for dy in -span..=span {
                if let Some(bucket) = self.cells.get(&(cx + dx, cy + dy)) {
                    ids.extend_from_slice(bucket);
                }
            }
        }
        ids.sort_unstable();

        ids.into_iter()
            .filter_map(|id| self.get(id))
            .filter(|b| b.pos.distance_squared(point) <= threshold_sq)
            .collect()
    }

    /// Reference query: scan every bubble
    pub fn within_linear(&self, point: Vec2, threshold_sq: f32) -> Vec<&Bubble> {
        self.bubbles
            .iter()
            .filter(|b| b.pos.distance_squared(point) <= threshold_sq)
            .collect()
    }

    /// First bubble (insertion order) within `threshold_sq` of `point`
    pub fn first_within(&self, point: Vec2, threshold_sq: f32) -> Option<&Bubble> {
        self.within(point, threshold_sq).into_iter().next()
    }
}
