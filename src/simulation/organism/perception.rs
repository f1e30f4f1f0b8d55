//! What an animal can see during a tick, and how that becomes brain input.
//!
//! At the start of the decision phase the driver freezes a compact view of
//! every organism ([`AnimalView`], [`PlantView`]) and indexes the same
//! positions in the world's quadtrees. Every animal perceives this frozen
//! state, so the outcome does not depend on the order in which animals are
//! updated.

use std::f64::consts::PI;

use super::super::geometric_utils::Shape;
use super::super::params::Params;
use super::super::vector2d::Vector2D;
use super::super::world::World;
use super::animal::{Animal, Gender};

/// Length of the brain input vector.
pub const INPUT_SIZE: usize = 22;
/// Length of the brain output vector.
pub const OUTPUT_SIZE: usize = 8;

/// Frozen per-tick facts about an animal, as seen by others.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimalView {
    /// Identifier of the animal.
    pub id: u64,
    /// Position at the start of the tick.
    pub location: Vector2D,
    /// Velocity at the start of the tick.
    pub velocity: Vector2D,
    /// Body diameter.
    pub size: f64,
    /// Display color.
    pub color: [u8; 3],
    /// Gender.
    pub gender: Gender,
    /// Whether it was eligible to mate at the start of the tick.
    pub can_mate: bool,
    /// Health relative to max health.
    pub health_ratio: f64,
    /// Maturity.
    pub maturity: f64,
    /// Mate appeal.
    pub attractiveness: f64,
    /// Drive to mate at the end of the previous tick.
    pub reproductive_urge: f64,
    /// Attack strength.
    pub strength: f64,
}

/// Frozen per-tick facts about a plant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantView {
    /// Identifier of the plant.
    pub id: u64,
    /// Position.
    pub location: Vector2D,
    /// Body diameter.
    pub size: f64,
}

/// Read-only state shared by every organism during the decision phase.
pub struct TickView<'a> {
    /// World with freshly rebuilt quadtrees.
    pub world: &'a World,
    /// Views indexed like the animal list.
    pub animals: &'a [AnimalView],
    /// Views indexed like the plant list.
    pub plants: &'a [PlantView],
    /// Simulation parameters.
    pub params: &'a Params,
    /// Current tick.
    pub tick: u64,
}

/// Whether two bodies overlap.
#[inline]
pub fn in_contact(a: Vector2D, a_size: f64, b: Vector2D, b_size: f64) -> bool {
    let reach = (a_size + b_size) / 2.0;
    a.dist_sq(b) <= reach * reach
}

/// Whether `target` lies within `half_angle_deg` of `heading` as seen from
/// `here`.
///
/// A zero heading (a stationary animal) sees all around, as does a half
/// angle of 180 degrees.
pub fn in_field_of_view(here: Vector2D, heading: Vector2D, half_angle_deg: f64, target: Vector2D) -> bool {
    half_angle_deg >= 180.0 || heading.angle_between(target - here) <= half_angle_deg.to_radians()
}

/// Result of one animal looking around.
#[derive(Debug, Clone, Default)]
pub struct Senses {
    /// Indices of other animals inside the sensory radius.
    pub animals: Vec<usize>,
    /// Indices of plants inside the sensory radius.
    pub plants: Vec<usize>,
    /// Other animals within view distance and inside the field of view.
    pub animals_in_sight: Vec<usize>,
    /// Closest animal in sight.
    pub nearest_animal: Option<usize>,
    /// Closest plant within view distance and inside the field of view.
    pub nearest_plant: Option<usize>,
}

impl Senses {
    /// Queries both quadtrees with the animal's sensory radius.
    ///
    /// Neighbour counts cover the whole sensory circle. Targets are picked
    /// only from what lies within view distance and inside the view cone.
    pub fn gather(animal: &Animal, index: usize, view: &TickView<'_>) -> Self {
        let here = animal.core.transform.location;
        let heading = animal.core.transform.velocity;
        let shape = Shape::circle(here, animal.sensory_radius());
        let view_sq = animal.traits.view_distance * animal.traits.view_distance;
        let sees = |target: Vector2D| {
            here.dist_sq(target) <= view_sq
                && in_field_of_view(here, heading, animal.traits.view_angle, target)
        };

        let mut animals = view.world.animal_tree().query(&shape);
        animals.retain(|&i| i != index);
        let plants = view.world.plant_tree().query(&shape);

        let animals_in_sight: Vec<usize> = animals
            .iter()
            .copied()
            .filter(|&i| sees(view.animals[i].location))
            .collect();
        let nearest_animal = closest(animals_in_sight.iter().copied(), here, |i| view.animals[i].location);
        let nearest_plant = closest(
            plants.iter().copied().filter(|&i| sees(view.plants[i].location)),
            here,
            |i| view.plants[i].location,
        );

        Self {
            animals,
            plants,
            animals_in_sight,
            nearest_animal,
            nearest_plant,
        }
    }

    /// Encodes the senses and the animal's own state as brain input.
    pub fn inputs(&self, animal: &Animal, view: &TickView<'_>) -> [f64; INPUT_SIZE] {
        let core = &animal.core;
        let here = core.transform.location;
        let mut x = [0.0; INPUT_SIZE];

        x[0] = 1.0;
        x[1] = core.energy_ratio();
        x[2] = core.maturity;
        x[3] = core.traits.attractiveness;
        x[4] = core.health_ratio();
        x[5] = core.transform.speed();
        x[6] = core.age(view.tick, view.params.tick_period_ms);
        x[7] = f64::from(u8::from(animal.can_mate(&view.params.animal)));

        if let Some(i) = self.nearest_animal {
            let other = &view.animals[i];
            (x[8], x[9]) = distance_and_bearing(here, other.location);
            x[14] = f64::from(other.color[0]) / 255.0;
            x[15] = f64::from(other.color[1]) / 255.0;
            x[16] = f64::from(other.color[2]) / 255.0;
            x[17] = f64::from(u8::from(other.gender != animal.gender));
            x[18] = f64::from(u8::from(other.can_mate));
            x[19] = other.health_ratio;
            x[20] = other.maturity;
            x[21] = other.attractiveness;
        }
        if let Some(i) = self.nearest_plant {
            (x[10], x[11]) = distance_and_bearing(here, view.plants[i].location);
        }
        x[12] = self.animals.len() as f64;
        x[13] = self.plants.len() as f64;
        x
    }
}

/// Candidate closest to `from`.
pub fn closest(
    candidates: impl Iterator<Item = usize>,
    from: Vector2D,
    location: impl Fn(usize) -> Vector2D,
) -> Option<usize> {
    candidates
        .map(|i| (i, from.dist_sq(location(i))))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// Inverse squared distance (1 on contact) and bearing scaled to `[-1, 1]`.
fn distance_and_bearing(from: Vector2D, to: Vector2D) -> (f64, f64) {
    let offset = to - from;
    let inv = 1.0 / offset.mag_sq().max(1.0);
    (inv, offset.heading() / PI)
}
