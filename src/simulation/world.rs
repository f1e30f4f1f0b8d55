//! World bounds and the two per-tick spatial indices.

use geo::Rect;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::{Result, SimulationError};
use super::geometric_utils::{rect, rect_contains};
use super::locatable::Locatable;
use super::quadtree::QuadTree;
use super::vector2d::Vector2D;

/// Default depth limit for both quadtrees.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// What happens to organisms that move past the world edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EdgePolicy {
    /// Positions wrap around to the opposite edge.
    #[default]
    Wrap,
    /// Organisms may leave; they drop out of the spatial index while outside.
    Open,
}

/// The simulated area and its spatial indices.
///
/// Both trees hold indices into the simulation's species lists and are
/// rebuilt from scratch every tick.
#[derive(Debug, Clone)]
pub struct World {
    width: f64,
    height: f64,
    edge_policy: EdgePolicy,
    animals: QuadTree<usize>,
    plants: QuadTree<usize>,
}

impl World {
    /// Creates a `width x height` world with the given leaf capacities.
    pub fn new(
        width: f64,
        height: f64,
        animal_capacity: usize,
        plant_capacity: usize,
    ) -> Result<Self> {
        Self::with_max_depth(width, height, animal_capacity, plant_capacity, DEFAULT_MAX_DEPTH)
    }

    /// Like [`World::new`] with an explicit quadtree depth limit.
    pub fn with_max_depth(
        width: f64,
        height: f64,
        animal_capacity: usize,
        plant_capacity: usize,
        max_depth: usize,
    ) -> Result<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(SimulationError::InvalidBounds { width, height });
        }
        let bounds = rect(0.0, 0.0, width, height);
        Ok(Self {
            width,
            height,
            edge_policy: EdgePolicy::default(),
            animals: QuadTree::new(bounds, animal_capacity, max_depth)?,
            plants: QuadTree::new(bounds, plant_capacity, max_depth)?,
        })
    }

    /// Sets the edge policy.
    #[must_use]
    pub fn with_edge_policy(mut self, edge_policy: EdgePolicy) -> Self {
        self.edge_policy = edge_policy;
        self
    }

    /// Horizontal extent.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Vertical extent.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// The world rectangle, anchored at the origin.
    pub fn bounds(&self) -> Rect<f64> {
        rect(0.0, 0.0, self.width, self.height)
    }

    /// What happens at the edges.
    pub fn edge_policy(&self) -> EdgePolicy {
        self.edge_policy
    }

    /// Half-open containment in the world rectangle.
    pub fn contains(&self, location: Vector2D) -> bool {
        rect_contains(&self.bounds(), location)
    }

    /// Applies the edge policy to a freshly integrated position.
    pub fn confine(&self, location: Vector2D) -> Vector2D {
        match self.edge_policy {
            EdgePolicy::Wrap => location.wrap(self.width, self.height),
            EdgePolicy::Open => location,
        }
    }

    /// Uniformly random in-bounds location.
    pub fn random_location<R: Rng>(&self, rng: &mut R) -> Vector2D {
        Vector2D::random_in(rng, self.width, self.height)
    }

    /// Empties both indices.
    pub fn clear_quadtrees(&mut self) {
        self.animals.clear();
        self.plants.clear();
    }

    /// Indexes the animal at `index` in the animal list.
    pub fn insert_animal(&mut self, index: usize, animal: &impl Locatable) -> bool {
        self.animals.insert(animal.location(), index)
    }

    /// Indexes the plant at `index` in the plant list.
    pub fn insert_plant(&mut self, index: usize, plant: &impl Locatable) -> bool {
        self.plants.insert(plant.location(), index)
    }

    /// Index of animal list positions.
    pub fn animal_tree(&self) -> &QuadTree<usize> {
        &self.animals
    }

    /// Index of plant list positions.
    pub fn plant_tree(&self) -> &QuadTree<usize> {
        &self.plants
    }

    /// Changes the leaf capacity of both trees.
    pub fn set_capacities(&mut self, animal_capacity: usize, plant_capacity: usize) -> Result<()> {
        if animal_capacity == 0 || plant_capacity == 0 {
            return Err(SimulationError::InvalidCapacity(0));
        }
        self.animals.set_capacity(animal_capacity)?;
        self.plants.set_capacity(plant_capacity)
    }

    /// Changes the depth limit of both trees.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.animals.set_max_depth(max_depth);
        self.plants.set_max_depth(max_depth);
    }
}
