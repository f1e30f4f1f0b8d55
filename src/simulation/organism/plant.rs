//! Plants: stationary organisms that photosynthesize, grow on a timer and
//! spread seeds around themselves.

use std::convert::Infallible;

use rand::Rng;
use serde::Serialize;

use super::perception::{PlantView, TickView};
use super::{Birth, BodyRatios, Lifecycle, Organism, OrganismCore, SpeciesKind};
use crate::simulation::dna::{Dna, layout};
use crate::simulation::error::Result;
use crate::simulation::events::Interaction;
use crate::simulation::locatable::Locatable;
use crate::simulation::params::{Params, PlantParams};
use crate::simulation::transform::Transform;
use crate::simulation::vector2d::Vector2D;

/// Phenotype derived from the plant-specific genes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlantTraits {
    /// Maximum seed offset from the parent.
    pub spreading_range: f64,
    /// Time between growth or spreading attempts.
    pub growth_interval_ms: f64,
}

impl PlantTraits {
    /// Clamps the plant genes of `dna` into legal ranges.
    pub fn express(dna: &Dna, p: &PlantParams) -> Self {
        Self {
            spreading_range: dna.value(layout::plant::SPREADING_RANGE).max(0.0),
            growth_interval_ms: dna
                .value(layout::plant::GROWTH_INTERVAL)
                .max(p.min_growth_interval_ms),
        }
    }
}

/// A stationary organism that lives on sunlight.
#[derive(Debug, Clone, Serialize)]
pub struct Plant {
    /// Shared organism state.
    pub core: OrganismCore,
    /// Expressed plant genes.
    pub traits: PlantTraits,
    /// Ticks left until the next growth or spreading attempt.
    pub growth_timer: u64,
}

impl Plant {
    /// Creates a plant with full health and a full growth timer.
    pub fn new(
        id: u64,
        location: Vector2D,
        dna: Dna,
        maturity: f64,
        tick: u64,
        params: &Params,
    ) -> Self {
        let p = &params.plant;
        let ratios = BodyRatios {
            health_body_ratio: p.health_body_ratio,
            body_energy_ratio: p.body_energy_ratio,
            exhaustion_damage: p.exhaustion_damage,
        };
        let core = OrganismCore::new(id, Transform::at(location, 1.0), dna, maturity, tick, ratios);
        let traits = PlantTraits::express(&core.dna, p);
        let mut plant = Self {
            core,
            traits,
            growth_timer: params.ticks_for_ms(traits.growth_interval_ms),
        };
        plant.refresh_size(p.max_size);
        plant.core.fill(1.0, p.initial_energy_ratio);
        plant
    }

    /// Population top-up: a mutated copy of the template at full maturity.
    ///
    /// The timer starts at a random point of its interval so top-ups do not
    /// spread in lockstep.
    pub fn from_template<R: Rng>(
        id: u64,
        location: Vector2D,
        template: &Dna,
        tick: u64,
        params: &Params,
        rng: &mut R,
    ) -> Self {
        let mut dna = template.clone();
        let traits = super::OrganismTraits::express(&dna);
        dna.percentage_mutate(traits.mut_prob_dna, traits.mut_size_dna, rng);

        let mut plant = Self::new(id, location, dna, 1.0, tick, params);
        plant.growth_timer = rng.random_range(1..=plant.growth_timer.max(1));
        plant
    }

    /// Recomputes the body diameter from maturity.
    pub fn refresh_size(&mut self, max_size: f64) {
        self.core.transform.size = max_size * self.core.traits.size_ratio * self.core.maturity + 1.0;
    }

    /// Energy a spread costs right now.
    pub fn spread_cost(&self, p: &PlantParams) -> f64 {
        self.core.max_energy() * p.spread_cost
    }

    /// Frozen view for this tick.
    pub fn view(&self) -> PlantView {
        PlantView {
            id: self.core.id,
            location: self.core.transform.location,
            size: self.core.transform.size,
        }
    }
}

impl Locatable for Plant {
    fn location(&self) -> Vector2D {
        self.core.transform.location
    }

    fn size(&self) -> f64 {
        self.core.transform.size
    }
}

impl Organism for Plant {
    fn core(&self) -> &OrganismCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut OrganismCore {
        &mut self.core
    }

    fn species(&self) -> SpeciesKind {
        SpeciesKind::Plant
    }
}

impl Lifecycle for Plant {
    /// Plants spread asexually.
    type Partner = Infallible;

    fn update<R: Rng>(
        &mut self,
        index: usize,
        view: &TickView<'_>,
        _rng: &mut R,
    ) -> Vec<Interaction> {
        let p = &view.params.plant;
        self.core.restore_energy(p.photosynthesis_rate);

        self.growth_timer = self.growth_timer.saturating_sub(1);
        if self.growth_timer > 0 {
            return Vec::new();
        }
        self.growth_timer = view.params.ticks_for_ms(self.traits.growth_interval_ms);

        if self.core.maturity < 1.0 {
            self.grow(1.0, view.params);
            Vec::new()
        } else if self.core.energy() >= self.spread_cost(p) {
            vec![Interaction::Spread { plant: index }]
        } else {
            Vec::new()
        }
    }

    fn grow(&mut self, factor: f64, params: &Params) {
        self.core.grow(factor, params.plant.growth_speed);
        self.refresh_size(params.plant.max_size);
    }

    /// Drops one seed within the spreading range, clamped into the world.
    fn reproduce<R: Rng>(
        &mut self,
        _partner: Option<&Infallible>,
        birth: &Birth<'_>,
        rng: &mut R,
    ) -> Result<Self> {
        let p = &birth.params.plant;
        self.core.use_energy(self.spread_cost(p));

        let mut dna = self.core.dna.clone();
        let traits = self.core.traits;
        dna.percentage_mutate(traits.mut_prob_dna, traits.mut_size_dna, rng);

        let world = birth.world;
        let mut location = self.location() + Vector2D::random_surrounding(rng, self.traits.spreading_range);
        if !world.contains(location) {
            location = location.clamp_to(world.width(), world.height());
        }

        let mut seedling = Plant::new(birth.id, location, dna, p.seedling_maturity, birth.tick, birth.params);
        seedling.core.generation = self.core.generation + 1;
        Ok(seedling)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::simulation::world::{EdgePolicy, World};

    fn params() -> Params {
        Params::default()
    }

    #[test]
    fn immature_plant_grows_when_timer_expires() {
        let params = params();
        let world = World::new(100.0, 100.0, 4, 4).unwrap();
        let mut plant = Plant::new(1, Vector2D::new(50.0, 50.0), params.species.plant.to_dna(), 0.2, 0, &params);
        plant.core.restore_energy(1e9);
        plant.growth_timer = 1;
        let size = plant.size();
        let view = TickView {
            world: &world,
            animals: &[],
            plants: &[],
            params: &params,
            tick: 0,
        };
        let out = plant.update(0, &view, &mut StdRng::seed_from_u64(1));
        assert!(out.is_empty());
        assert!(plant.core.maturity > 0.2);
        assert!(plant.size() > size);
        assert!(plant.growth_timer > 1);
    }

    #[test]
    fn mature_plant_with_energy_requests_spread() {
        let params = params();
        let world = World::new(100.0, 100.0, 4, 4).unwrap();
        let mut plant = Plant::new(1, Vector2D::new(50.0, 50.0), params.species.plant.to_dna(), 1.0, 0, &params);
        plant.core.restore_energy(1e9);
        plant.growth_timer = 1;
        let view = TickView {
            world: &world,
            animals: &[],
            plants: &[],
            params: &params,
            tick: 0,
        };
        let out = plant.update(3, &view, &mut StdRng::seed_from_u64(1));
        assert_eq!(out, vec![Interaction::Spread { plant: 3 }]);
    }

    #[test]
    fn seed_lands_in_bounds_and_costs_energy() {
        let params = params();
        let world = World::new(20.0, 20.0, 4, 4).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let mut parent = Plant::new(1, Vector2D::new(1.0, 1.0), params.species.plant.to_dna(), 1.0, 0, &params);
        parent.core.restore_energy(1e9);
        for id in 2..50 {
            parent.core.restore_energy(1e9);
            let energy = parent.core.energy();
            let birth = Birth {
                id,
                tick: 5,
                params: &params,
                world: &world,
            };
            let seed = parent.reproduce(None, &birth, &mut rng).unwrap();
            assert!(world.contains(seed.location()));
            assert_eq!(seed.core.maturity, params.plant.seedling_maturity);
            assert!(parent.core.energy() < energy);
        }
    }

    #[test]
    fn seeds_past_far_edge_stay_near_parent() {
        let params = params();
        for policy in [EdgePolicy::Wrap, EdgePolicy::Open] {
            let world = World::new(100.0, 100.0, 4, 4).unwrap().with_edge_policy(policy);
            let mut rng = StdRng::seed_from_u64(3);
            let mut parent =
                Plant::new(1, Vector2D::new(99.0, 99.0), params.species.plant.to_dna(), 1.0, 0, &params);
            let reach = parent.traits.spreading_range;
            for id in 2..200 {
                parent.core.restore_energy(1e9);
                let birth = Birth {
                    id,
                    tick: 1,
                    params: &params,
                    world: &world,
                };
                let seed = parent.reproduce(None, &birth, &mut rng).unwrap();
                let at = seed.location();
                assert!(world.contains(at), "{policy:?}: {at:?} outside");
                assert!(at.x >= 99.0 - reach - 1e-9, "{policy:?}: {at:?} jumped edges");
                assert!(at.y >= 99.0 - reach - 1e-9, "{policy:?}: {at:?} jumped edges");
            }
        }
    }
}
