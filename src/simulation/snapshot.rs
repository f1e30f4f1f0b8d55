//! Read-only per-tick picture of the world for renderers and tooling.

use geo::Rect;
use serde::Serialize;

use super::organism::{Organism, SpeciesKind};
use super::stats::PopulationStats;
use super::vector2d::Vector2D;

/// What a renderer needs to draw one organism.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganismSnapshot {
    /// Organism id.
    pub id: u64,
    /// Animal or plant.
    pub species: SpeciesKind,
    /// Position.
    pub location: Vector2D,
    /// Velocity; zero for plants.
    pub velocity: Vector2D,
    /// Body diameter.
    pub size: f64,
    /// Expressed color.
    pub color: [u8; 3],
    /// Health relative to its maximum.
    pub health_ratio: f64,
    /// Energy relative to its maximum.
    pub energy_ratio: f64,
}

impl OrganismSnapshot {
    /// Captures any organism.
    pub fn of(organism: &impl Organism) -> Self {
        let core = organism.core();
        Self {
            id: core.id,
            species: organism.species(),
            location: core.transform.location,
            velocity: core.transform.velocity,
            size: core.transform.size,
            color: core.traits.color,
            health_ratio: core.health_ratio(),
            energy_ratio: core.energy_ratio(),
        }
    }
}

/// Everything visible after a tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldSnapshot {
    /// World width.
    pub width: f64,
    /// World height.
    pub height: f64,
    /// Every animal, in list order.
    pub animals: Vec<OrganismSnapshot>,
    /// Every plant, in list order.
    pub plants: Vec<OrganismSnapshot>,
    /// Leaf rectangles of the animal quadtree as `[x, y, width, height]`.
    pub animal_leaves: Vec<[f64; 4]>,
    /// Leaf rectangles of the plant quadtree as `[x, y, width, height]`.
    pub plant_leaves: Vec<[f64; 4]>,
    /// Figures of the latest tick.
    pub stats: PopulationStats,
}

/// `[x, y, width, height]` of a rectangle.
pub fn rect_to_array(rect: &Rect<f64>) -> [f64; 4] {
    let min = rect.min();
    [min.x, min.y, rect.width(), rect.height()]
}
