//! Region quadtree used as the per-tick spatial index.
//!
//! The tree stores copies of positions together with a small handle (the
//! index of the organism in its species list). It never owns organisms and
//! is cleared and repopulated once per tick, so nothing has to be removed
//! from it individually.

use geo::{Rect, coord};

use super::error::{Result, SimulationError};
use super::geometric_utils::{Shape, rect_contains};
use super::vector2d::Vector2D;

/// Quadrant order used when subdividing: NE, NW, SW, SE.
const QUADRANTS: usize = 4;

/// A capacity- and depth-bounded quadtree node.
#[derive(Debug, Clone)]
pub struct QuadTree<T> {
    boundary: Rect<f64>,
    capacity: usize,
    depth: usize,
    max_depth: usize,
    occupants: Vec<(Vector2D, T)>,
    children: Option<Box<[QuadTree<T>; QUADRANTS]>>,
}

impl<T: Copy> QuadTree<T> {
    /// Creates an empty root node.
    ///
    /// `capacity` is the number of occupants a leaf holds before it splits;
    /// nodes at `max_depth` never split and accept any number of occupants.
    pub fn new(boundary: Rect<f64>, capacity: usize, max_depth: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(SimulationError::InvalidCapacity(capacity));
        }
        let (w, h) = (boundary.width(), boundary.height());
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(SimulationError::InvalidBounds {
                width: w,
                height: h,
            });
        }
        Ok(Self::node(boundary, capacity, 0, max_depth))
    }

    fn node(boundary: Rect<f64>, capacity: usize, depth: usize, max_depth: usize) -> Self {
        Self {
            boundary,
            capacity,
            depth,
            max_depth,
            occupants: Vec::new(),
            children: None,
        }
    }

    /// Area covered by this node.
    pub fn boundary(&self) -> Rect<f64> {
        self.boundary
    }

    /// Points a leaf holds before it splits.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Depth below which leaves never split.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Changes the split threshold. Takes effect from the next rebuild.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<()> {
        if capacity == 0 {
            return Err(SimulationError::InvalidCapacity(capacity));
        }
        self.capacity = capacity;
        self.clear();
        Ok(())
    }

    /// Changes the depth limit. Takes effect from the next rebuild.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
        self.clear();
    }

    /// Whether this node has children.
    pub fn is_divided(&self) -> bool {
        self.children.is_some()
    }

    /// Inserts `item` at `location`.
    ///
    /// Returns `false` when the point lies outside this node's boundary.
    pub fn insert(&mut self, location: Vector2D, item: T) -> bool {
        if !rect_contains(&self.boundary, location) {
            return false;
        }

        if self.children.is_none() {
            if self.occupants.len() < self.capacity || self.depth >= self.max_depth {
                self.occupants.push((location, item));
                return true;
            }
            self.subdivide();
        }

        match self.children.as_deref_mut() {
            Some(children) => children.iter_mut().any(|c| c.insert(location, item)),
            None => false,
        }
    }

    /// Splits this leaf into four equal quadrants and hands its occupants down.
    fn subdivide(&mut self) {
        let min = self.boundary.min();
        let (half_w, half_h) = (self.boundary.width() / 2.0, self.boundary.height() / 2.0);
        let (mid_x, mid_y) = (min.x + half_w, min.y + half_h);
        let max = self.boundary.max();
        let depth = self.depth + 1;

        let quadrant = |x0: f64, y0: f64, x1: f64, y1: f64| {
            Self::node(
                Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 }),
                self.capacity,
                depth,
                self.max_depth,
            )
        };
        let mut children = Box::new([
            quadrant(mid_x, min.y, max.x, mid_y), // NE
            quadrant(min.x, min.y, mid_x, mid_y), // NW
            quadrant(min.x, mid_y, mid_x, max.y), // SW
            quadrant(mid_x, mid_y, max.x, max.y), // SE
        ]);

        let mut stragglers = Vec::new();
        for (location, item) in self.occupants.drain(..) {
            if !children.iter_mut().any(|c| c.insert(location, item)) {
                stragglers.push((location, item));
            }
        }
        // points lost to rounding at the split line stay with the parent
        self.occupants = stragglers;
        self.children = Some(children);
    }

    /// Drops every occupant and child, leaving an undivided empty leaf.
    pub fn clear(&mut self) {
        self.occupants.clear();
        self.children = None;
    }

    /// Handles of all occupants whose point lies inside `shape`.
    ///
    /// The order of the result is unspecified.
    pub fn query(&self, shape: &Shape) -> Vec<T> {
        let mut found = Vec::new();
        self.query_into(shape, &mut found);
        found
    }

    /// Like [`QuadTree::query`], appending to an existing buffer.
    pub fn query_into(&self, shape: &Shape, found: &mut Vec<T>) {
        if !shape.intersects_rect(&self.boundary) {
            return;
        }
        found.extend(
            self.occupants
                .iter()
                .filter(|(location, _)| shape.contains(*location))
                .map(|&(_, item)| item),
        );
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.query_into(shape, found);
            }
        }
    }

    /// Total number of occupants in this subtree.
    pub fn len(&self) -> usize {
        self.occupants.len()
            + self
                .children
                .as_deref()
                .map_or(0, |c| c.iter().map(QuadTree::len).sum::<usize>())
    }

    /// True when no point is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Boundaries of every leaf, for drawing the partition.
    pub fn leaf_boundaries(&self) -> Vec<Rect<f64>> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<Rect<f64>>) {
        match &self.children {
            Some(children) => children.iter().for_each(|c| c.collect_leaves(out)),
            None => out.push(self.boundary),
        }
    }

    /// Largest number of occupants held directly by any node below `max_depth`.
    pub fn max_leaf_occupancy(&self) -> usize {
        let own = if self.depth < self.max_depth {
            self.occupants.len()
        } else {
            0
        };
        self.children
            .as_deref()
            .map_or(0, |c| c.iter().map(QuadTree::max_leaf_occupancy).max().unwrap_or(0))
            .max(own)
    }
}
