//! Organism state shared by every species, and the capability traits
//! each species implements.
//!
//! Species are a closed set ([`SpeciesKind`]). Each one composes an
//! [`OrganismCore`] and implements [`Organism`] for access to it and
//! [`Lifecycle`] for its behaviour.

pub mod animal;
pub mod perception;
pub mod plant;
pub mod steering;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::dna::{Dna, layout};
use super::events::Interaction;
use super::locatable::Locatable;
use super::params::Params;
use super::transform::Transform;
use super::world::World;
use perception::TickView;

/// The species tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeciesKind {
    /// Mobile, brain-driven organism.
    Animal,
    /// Stationary organism that photosynthesizes and spreads.
    Plant,
}

/// Phenotype derived from the shared organism genes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrganismTraits {
    /// Body size relative to the species maximum, in `[0, 1]`.
    pub size_ratio: f64,
    /// Display color.
    pub color: [u8; 3],
    /// Percentage used when mutating offspring DNA.
    pub mut_size_dna: f64,
    /// Per-gene chance of mutating offspring DNA.
    pub mut_prob_dna: f64,
    /// Offset range used when mutating offspring brains.
    pub mut_size_nn: f64,
    /// Per-weight chance of mutating offspring brains.
    pub mut_prob_nn: f64,
    /// Appeal as a mate.
    pub attractiveness: f64,
    /// Overall growth speed.
    pub growth_scale_factor: f64,
    /// Damping of growth as maturity rises.
    pub growth_maturity_factor: f64,
    /// Exponent of the maturity damping.
    pub growth_maturity_exponent: f64,
}

impl OrganismTraits {
    /// Clamps the shared prefix of `dna` into legal ranges.
    pub fn express(dna: &Dna) -> Self {
        let channel = |i: usize| dna.value(i).clamp(0.0, 255.0).round() as u8;
        Self {
            size_ratio: dna.value(layout::SIZE_RATIO).clamp(0.0, 1.0),
            color: [
                channel(layout::COLOR_RED),
                channel(layout::COLOR_GREEN),
                channel(layout::COLOR_BLUE),
            ],
            mut_size_dna: dna.value(layout::MUT_SIZE_DNA).max(0.0),
            mut_prob_dna: dna.value(layout::MUT_PROB_DNA).clamp(0.0, 1.0),
            mut_size_nn: dna.value(layout::MUT_SIZE_NN).max(0.0),
            mut_prob_nn: dna.value(layout::MUT_PROB_NN).clamp(0.0, 1.0),
            attractiveness: dna.value(layout::ATTRACTIVENESS).max(0.0),
            growth_scale_factor: dna.value(layout::GROWTH_SCALE_FACTOR).max(0.0),
            growth_maturity_factor: dna.value(layout::GROWTH_MATURITY_FACTOR).max(1.0),
            growth_maturity_exponent: dna.value(layout::GROWTH_MATURITY_EXPONENT).clamp(0.0, 5.0),
        }
    }
}

/// Body ratios copied from the species parameters at birth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyRatios {
    /// Max health per body point.
    pub health_body_ratio: f64,
    /// Max energy per body point.
    pub body_energy_ratio: f64,
    /// Damage per unit of unpaid energy.
    pub exhaustion_damage: f64,
}

/// State every organism carries.
#[derive(Debug, Clone, Serialize)]
pub struct OrganismCore {
    /// Unique identifier.
    pub id: u64,
    /// Kinematic state.
    pub transform: Transform,
    /// Genome.
    pub dna: Dna,
    /// Expressed shared phenotype.
    pub traits: OrganismTraits,
    /// Developmental stage in `[0, 1]`.
    pub maturity: f64,
    /// Tick on which the organism was created.
    pub birth_tick: u64,
    /// Number of ancestors along the longest line.
    pub generation: u32,
    health: f64,
    energy: f64,
    ratios: BodyRatios,
}

impl OrganismCore {
    /// Creates a core with zero health and energy; callers fill them via
    /// [`OrganismCore::fill`].
    pub fn new(
        id: u64,
        transform: Transform,
        dna: Dna,
        maturity: f64,
        birth_tick: u64,
        ratios: BodyRatios,
    ) -> Self {
        let traits = OrganismTraits::express(&dna);
        Self {
            id,
            transform,
            dna,
            traits,
            maturity: maturity.clamp(0.0, 1.0),
            birth_tick,
            generation: 0,
            health: 0.0,
            energy: 0.0,
            ratios,
        }
    }

    /// Sets health and energy to the given fractions of their maxima.
    pub fn fill(&mut self, health_ratio: f64, energy_ratio: f64) {
        self.health = self.max_health() * health_ratio.clamp(0.0, 1.0);
        self.energy = self.max_energy() * energy_ratio.clamp(0.0, 1.0);
    }

    /// Amount of body tissue; scales health and energy capacity.
    pub fn body_points(&self) -> f64 {
        100.0 * self.traits.size_ratio * self.maturity
    }

    /// Health of an unharmed body of this size.
    pub fn max_health(&self) -> f64 {
        self.body_points() * self.ratios.health_body_ratio
    }

    /// Energy a body of this size can store.
    pub fn max_energy(&self) -> f64 {
        self.body_points() * self.ratios.body_energy_ratio
    }

    /// Current health.
    pub fn health(&self) -> f64 {
        self.health
    }

    /// Current energy.
    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// Health relative to its maximum, 0 when the maximum is 0.
    pub fn health_ratio(&self) -> f64 {
        ratio(self.health, self.max_health())
    }

    /// Energy relative to its maximum, 0 when the maximum is 0.
    pub fn energy_ratio(&self) -> f64 {
        ratio(self.energy, self.max_energy())
    }

    /// Dead once health reaches zero.
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Age in simulated seconds.
    pub fn age(&self, now_tick: u64, tick_period_ms: f64) -> f64 {
        now_tick.saturating_sub(self.birth_tick) as f64 * tick_period_ms / 1000.0
    }

    /// Removes health, never below zero.
    pub fn take_damage(&mut self, amount: f64) {
        self.health = (self.health - amount.max(0.0)).max(0.0);
    }

    /// Adds health, never above the maximum.
    pub fn restore_health(&mut self, amount: f64) {
        self.health = (self.health + amount.max(0.0)).min(self.max_health());
    }

    /// Adds energy, never above the maximum.
    pub fn restore_energy(&mut self, amount: f64) {
        self.energy = (self.energy + amount.max(0.0)).min(self.max_energy());
    }

    /// Pays `amount` energy. An unpaid remainder is taken from health.
    pub fn use_energy(&mut self, amount: f64) {
        let amount = amount.max(0.0);
        if self.energy >= amount {
            self.energy -= amount;
        } else {
            let deficit = amount - self.energy;
            self.energy = 0.0;
            self.take_damage(deficit * self.ratios.exhaustion_damage);
        }
    }

    /// Maturity gained per unit of growth effort at the current maturity.
    pub fn growth_rate(&self, growth_speed: f64) -> f64 {
        let t = &self.traits;
        t.growth_scale_factor
            / (t.growth_maturity_factor * (1.0 + self.maturity).powf(t.growth_maturity_exponent))
            * growth_speed
    }

    /// Invests energy into maturity.
    ///
    /// New tissue arrives healthy: max health and health rise together. The
    /// energy cost is charged through [`OrganismCore::use_energy`].
    pub fn grow(&mut self, factor: f64, growth_speed: f64) {
        if self.maturity >= 1.0 || factor <= 0.0 {
            return;
        }
        let before = self.max_health();
        let growth = (self.growth_rate(growth_speed) * factor).min(1.0 - self.maturity);
        self.maturity += growth;
        self.health += self.max_health() - before;

        let r = &self.ratios;
        let tissue = 100.0 * growth * self.traits.size_ratio;
        self.use_energy(tissue * r.body_energy_ratio * (1.0 + 1.0 / r.health_body_ratio));
        self.clamp_vitals();
    }

    /// Re-establishes `0 <= health <= max_health` and `0 <= energy <= max_energy`.
    pub fn clamp_vitals(&mut self) {
        self.health = self.health.clamp(0.0, self.max_health());
        self.energy = self.energy.clamp(0.0, self.max_energy());
    }
}

#[inline]
fn ratio(value: f64, max: f64) -> f64 {
    if max > 0.0 { value / max } else { 0.0 }
}

/// Access to the shared state of an organism.
pub trait Organism: Locatable {
    /// Shared state.
    fn core(&self) -> &OrganismCore;

    /// Mutable shared state.
    fn core_mut(&mut self) -> &mut OrganismCore;

    /// Species tag.
    fn species(&self) -> SpeciesKind;

    fn id(&self) -> u64 {
        self.core().id
    }

    fn is_dead(&self) -> bool {
        self.core().is_dead()
    }
}

/// Context handed to [`Lifecycle::reproduce`].
pub struct Birth<'a> {
    /// Identifier for the offspring.
    pub id: u64,
    /// Current tick.
    pub tick: u64,
    /// Simulation parameters.
    pub params: &'a Params,
    /// World, for bounds.
    pub world: &'a World,
}

/// Per-tick behaviour shared by every species.
pub trait Lifecycle: Organism + Sized {
    /// Genetic material contributed by a partner, if the species has one.
    type Partner;

    /// Runs one tick of behaviour.
    ///
    /// Implementations mutate only `self`. Effects on other organisms are
    /// returned as [`Interaction`]s and applied afterwards.
    fn update<R: Rng>(&mut self, index: usize, view: &TickView<'_>, rng: &mut R)
    -> Vec<Interaction>;

    /// Invests energy into maturity, scaled by `factor`.
    fn grow(&mut self, factor: f64, params: &Params);

    /// Produces one offspring.
    fn reproduce<R: Rng>(
        &mut self,
        partner: Option<&Self::Partner>,
        birth: &Birth<'_>,
        rng: &mut R,
    ) -> super::error::Result<Self>;
}
