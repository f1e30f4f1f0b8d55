//! Animals: brain-driven organisms that move, eat plants, fight, heal, grow
//! and reproduce sexually.

use std::f64::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::perception::{AnimalView, OUTPUT_SIZE, Senses, TickView, closest, in_contact};
use super::steering::{Boid, Neighbor};
use super::{Birth, BodyRatios, Lifecycle, Organism, OrganismCore, SpeciesKind};
use crate::simulation::brain::NeuralNetwork;
use crate::simulation::dna::{Dna, layout};
use crate::simulation::error::Result;
use crate::simulation::events::Interaction;
use crate::simulation::locatable::Locatable;
use crate::simulation::params::{AnimalParams, Params};
use crate::simulation::species::SpeciesConfig;
use crate::simulation::transform::Transform;
use crate::simulation::vector2d::Vector2D;

/// Output indices of the animal brain.
pub mod output {
    /// Heading of the drive force, as a fraction of a full turn.
    pub const DIRECTION: usize = 0;
    /// Drive force relative to the force limit.
    pub const MAGNITUDE: usize = 1;
    /// Flocking gate.
    pub const HERDING: usize = 2;
    /// Mating gate and urge.
    pub const MATING: usize = 3;
    /// Biting gate.
    pub const EATING: usize = 4;
    /// Growth gate and rate.
    pub const GROWTH: usize = 5;
    /// Healing gate and strength.
    pub const HEALING: usize = 6;
    /// Attack gate.
    pub const ATTACK: usize = 7;
}

/// Biological sex. Mating needs one of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Fathers offspring.
    Male,
    /// Carries offspring.
    Female,
}

impl Gender {
    /// Either gender with equal probability.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        if rng.random_bool(0.5) {
            Gender::Male
        } else {
            Gender::Female
        }
    }
}

/// Whether an animal with `attractiveness` and `urge` accepts a partner of
/// `suitor_attractiveness`. Without any urge nobody is accepted.
pub fn accepts_mate(attractiveness: f64, urge: f64, suitor_attractiveness: f64) -> bool {
    urge > 0.0 && attractiveness / urge <= suitor_attractiveness
}

/// Phenotype derived from the animal-specific genes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnimalTraits {
    /// Raw speed ratio gene, in `[0, 1]`.
    pub speed_ratio: f64,
    /// Bite and attack strength.
    pub strength: f64,
    /// Gestation in milliseconds.
    pub gestation_duration_ms: f64,
    /// Steering force limit.
    pub max_force: f64,
    /// Effective speed limit.
    pub max_speed: f64,
    /// Half-angle of the field of view in degrees.
    pub view_angle: f64,
    /// Sight range.
    pub view_distance: f64,
    /// Weight of the separation force.
    pub separation_weight: f64,
    /// Weight of the alignment force.
    pub alignment_weight: f64,
    /// Weight of the cohesion force.
    pub cohesion_weight: f64,
    /// Preferred spacing, never beyond the view distance.
    pub separation_distance: f64,
}

impl AnimalTraits {
    /// Clamps the animal genes of `dna` into legal ranges.
    pub fn express(dna: &Dna, all_max_speed: f64) -> Self {
        use layout::animal as g;

        let speed_ratio = dna.value(g::SPEED_RATIO).clamp(0.0, 1.0);
        let view_distance = dna.value(g::VIEW_DISTANCE).max(0.0);
        Self {
            speed_ratio,
            strength: dna.value(g::STRENGTH).max(0.0),
            gestation_duration_ms: dna.value(g::GESTATION_DURATION).max(1000.0),
            max_force: dna.value(g::MAX_FORCE).max(0.0),
            max_speed: (dna.value(g::MAX_SPEED) * (0.5 + speed_ratio)).clamp(0.0, all_max_speed),
            view_angle: dna.value(g::VIEW_ANGLE).clamp(0.0, 180.0),
            view_distance,
            separation_weight: dna.value(g::SEPARATION_WEIGHT).max(0.0),
            alignment_weight: dna.value(g::ALIGNMENT_WEIGHT).max(0.0),
            cohesion_weight: dna.value(g::COHESION_WEIGHT).max(0.0),
            separation_distance: dna.value(g::SEPARATION_DISTANCE).clamp(0.0, view_distance),
        }
    }
}

/// Heritable material of an animal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Genome {
    /// Genes.
    pub dna: Dna,
    /// Brain weights.
    pub brain: NeuralNetwork,
    /// Generation of the carrier.
    pub generation: u32,
}

impl Genome {
    /// Blueprint genome with a freshly randomized brain.
    pub fn blueprint(config: &SpeciesConfig) -> Self {
        Self {
            dna: config.animal.to_dna(),
            brain: NeuralNetwork::new(config.brain),
            generation: 0,
        }
    }
}

/// A mobile organism controlled by a neural network.
#[derive(Debug, Clone, Serialize)]
pub struct Animal {
    /// Shared organism state.
    pub core: OrganismCore,
    /// Expressed animal genes.
    pub traits: AnimalTraits,
    /// Gender, fixed at birth.
    pub gender: Gender,
    /// Decision network.
    pub brain: NeuralNetwork,
    /// Current drive to mate.
    pub reproductive_urge: f64,
    /// Carrying offspring.
    pub pregnant: bool,
    /// Recently gave birth and cannot conceive yet.
    pub recovering: bool,
    /// Animals killed by this one.
    pub animals_killed: u32,
    /// Plants killed by this one.
    pub plants_killed: u32,
    /// Offspring born to this one.
    pub offspring: u32,
}

impl Animal {
    /// Creates an animal with full health from a genome.
    pub fn new<R: Rng>(
        id: u64,
        location: Vector2D,
        genome: Genome,
        maturity: f64,
        tick: u64,
        params: &Params,
        rng: &mut R,
    ) -> Self {
        let p = &params.animal;
        let ratios = BodyRatios {
            health_body_ratio: p.health_body_ratio,
            body_energy_ratio: p.body_energy_ratio,
            exhaustion_damage: p.exhaustion_damage,
        };
        let mut core = OrganismCore::new(
            id,
            Transform::at(location, 1.0),
            genome.dna,
            maturity,
            tick,
            ratios,
        );
        core.generation = genome.generation;
        let traits = AnimalTraits::express(&core.dna, p.all_max_speed);

        let mut animal = Self {
            core,
            traits,
            gender: Gender::random(rng),
            brain: genome.brain,
            reproductive_urge: 0.0,
            pregnant: false,
            recovering: false,
            animals_killed: 0,
            plants_killed: 0,
            offspring: 0,
        };
        animal.refresh_size(p.base_size);
        animal.core.fill(1.0, p.initial_energy_ratio);
        animal
    }

    /// Population top-up derived from a template genome.
    ///
    /// The template is bred with itself, then mutated more heavily than a
    /// natural birth and given a random color.
    pub fn from_template<R: Rng>(
        id: u64,
        location: Vector2D,
        template: &Genome,
        tick: u64,
        params: &Params,
        rng: &mut R,
    ) -> Result<Self> {
        let mut dna = Dna::crossover(&template.dna, &template.dna, rng)?;
        dna.percentage_mutate(0.2, 0.2, rng);
        for channel in [layout::COLOR_RED, layout::COLOR_GREEN, layout::COLOR_BLUE] {
            dna.set_value(channel, rng.random_range(0.0..=255.0));
        }
        let mut brain = NeuralNetwork::crossover(&template.brain, &template.brain, rng)?;
        brain.ranged_mutate(1.0, 1.0, rng);

        let maturity = dna.value(layout::animal::GESTATION_DURATION).max(1000.0)
            / params.animal.full_gestation_ms;
        let genome = Genome {
            dna,
            brain,
            generation: template.generation,
        };
        Ok(Self::new(id, location, genome, maturity, tick, params, rng))
    }

    /// Copy of the heritable material.
    pub fn genome(&self) -> Genome {
        Genome {
            dna: self.core.dna.clone(),
            brain: self.brain.clone(),
            generation: self.core.generation,
        }
    }

    /// Recomputes the body diameter from maturity.
    pub fn refresh_size(&mut self, base_size: f64) {
        self.core.transform.size = base_size * self.core.traits.size_ratio * self.core.maturity + 1.0;
    }

    /// Radius of the perception query around the animal.
    pub fn sensory_radius(&self) -> f64 {
        self.core.transform.size / 2.0 + self.traits.view_distance
    }

    /// Healthy, mature, and neither pregnant nor recovering from a birth.
    pub fn can_mate(&self, p: &AnimalParams) -> bool {
        !self.pregnant
            && !self.recovering
            && self.core.health_ratio() >= p.min_health_to_reproduce
            && self.core.maturity >= p.min_maturity_to_reproduce
    }

    /// Higher for healthy, well-fed animals that have eaten a lot.
    pub fn fitness(&self) -> f64 {
        (self.core.health_ratio() + self.core.energy_ratio()) * f64::from(self.plants_killed)
    }

    /// Frozen view for this tick.
    pub fn view(&self, p: &AnimalParams) -> AnimalView {
        AnimalView {
            id: self.core.id,
            location: self.core.transform.location,
            velocity: self.core.transform.velocity,
            size: self.core.transform.size,
            color: self.core.traits.color,
            gender: self.gender,
            can_mate: self.can_mate(p),
            health_ratio: self.core.health_ratio(),
            maturity: self.core.maturity,
            attractiveness: self.core.traits.attractiveness,
            reproductive_urge: self.reproductive_urge,
            strength: self.traits.strength,
        }
    }

    /// Energy burned per tick just by living.
    pub fn metabolism_cost(&self, p: &AnimalParams) -> f64 {
        let size = self.core.transform.size.max(1.0);
        (self.core.transform.speed() + 3.0) * p.metabolism_factor / (2.0 * size)
    }

    fn boid(&self) -> Boid {
        Boid {
            location: self.core.transform.location,
            velocity: self.core.transform.velocity,
            max_speed: self.traits.max_speed,
            max_force: self.traits.max_force,
        }
    }

    /// Weighted separation, cohesion and alignment against visible animals.
    fn herd(&mut self, senses: &Senses, view: &TickView<'_>) {
        let neighbors: Vec<Neighbor> = senses
            .animals
            .iter()
            .map(|&i| Neighbor {
                location: view.animals[i].location,
                velocity: view.animals[i].velocity,
            })
            .collect();
        let boid = self.boid();
        let t = &self.traits;
        let forces = [
            boid.separate(&neighbors, t.separation_distance) * t.separation_weight,
            boid.cohesion(&neighbors, t.separation_distance) * t.cohesion_weight,
            boid.align(&neighbors, t.separation_distance) * t.alignment_weight,
        ];
        for force in forces {
            self.core.transform.apply_force(force.limit(t.max_force));
        }
    }

    /// Picks the most appealing eligible partner in sight.
    ///
    /// Partners of the other gender who can mate are scored by their
    /// attractiveness times the own urge over squared distance, less the own
    /// attractiveness. Only partners whose urge lets them accept this animal
    /// are scored; if none does, the closest eligible partner is chosen.
    pub fn choose_mate(&self, senses: &Senses, view: &TickView<'_>) -> Option<usize> {
        let here = self.core.transform.location;
        let own = self.core.traits.attractiveness;
        let eligible = move || {
            senses.animals_in_sight.iter().copied().filter(move |&i| {
                let other = &view.animals[i];
                other.gender != self.gender && other.can_mate
            })
        };

        eligible()
            .filter(|&i| accepts_mate(view.animals[i].attractiveness, view.animals[i].reproductive_urge, own))
            .map(|i| {
                let other = &view.animals[i];
                let d_sq = here.dist_sq(other.location).max(1.0);
                (i, other.attractiveness * self.reproductive_urge / d_sq - own)
            })
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
            .or_else(|| closest(eligible(), here, |i| view.animals[i].location))
    }

    /// Mates with the chosen partner on contact and steers towards it
    /// otherwise; falls back to rare self-fertilization.
    fn seek_mate<R: Rng>(
        &mut self,
        index: usize,
        senses: &Senses,
        view: &TickView<'_>,
        rng: &mut R,
    ) -> Option<Interaction> {
        let p = &view.params.animal;
        if !self.can_mate(p) {
            return None;
        }
        if let Some(i) = self.choose_mate(senses, view) {
            let other = &view.animals[i];
            let t = &self.core.transform;
            if in_contact(t.location, t.size, other.location, other.size) {
                return Some(Interaction::Mate {
                    initiator: index,
                    partner: i,
                });
            }
            let force = self.boid().seek(other.location);
            self.core.transform.apply_force(force);
        }
        let chance = self.core.health_ratio() * p.asexual_chance;
        (self.gender == Gender::Female && rng.random::<f64>() < chance)
            .then_some(Interaction::SelfFertilize { mother: index })
    }

    fn bite(&self, index: usize, senses: &Senses, view: &TickView<'_>) -> Option<Interaction> {
        let j = senses.nearest_plant?;
        let plant = &view.plants[j];
        let t = &self.core.transform;
        in_contact(t.location, t.size, plant.location, plant.size).then(|| Interaction::Eat {
            animal: index,
            plant: j,
            damage: self.traits.strength * view.params.animal.damage_factor,
        })
    }

    fn strike(&self, index: usize, senses: &Senses, view: &TickView<'_>) -> Option<Interaction> {
        let i = senses.nearest_animal?;
        let other = &view.animals[i];
        let t = &self.core.transform;
        if !in_contact(t.location, t.size, other.location, other.size)
            || self.traits.strength < other.strength
        {
            return None;
        }
        let speed = t.speed();
        Some(Interaction::Attack {
            attacker: index,
            target: i,
            damage: self.traits.strength * view.params.animal.attack_factor * speed * speed,
        })
    }

    fn heal(&mut self, desire: f64, p: &AnimalParams) {
        let missing = self.core.max_health() - self.core.health();
        let amount = (desire * p.healing_factor).min(missing);
        if amount > 0.0 {
            self.core.use_energy(amount);
            self.core.restore_health(amount);
        }
    }
}

impl Locatable for Animal {
    fn location(&self) -> Vector2D {
        self.core.transform.location
    }

    fn size(&self) -> f64 {
        self.core.transform.size
    }
}

impl Organism for Animal {
    fn core(&self) -> &OrganismCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut OrganismCore {
        &mut self.core
    }

    fn species(&self) -> SpeciesKind {
        SpeciesKind::Animal
    }
}

impl Lifecycle for Animal {
    type Partner = Genome;

    fn update<R: Rng>(
        &mut self,
        index: usize,
        view: &TickView<'_>,
        rng: &mut R,
    ) -> Vec<Interaction> {
        let p = &view.params.animal;
        let senses = Senses::gather(self, index, view);
        let inputs = senses.inputs(self, view);
        let out = match self.brain.predict(&inputs) {
            Ok(out) if out.len() >= OUTPUT_SIZE => out,
            Ok(out) => {
                warn!(id = self.core.id, len = out.len(), "brain produced too few outputs");
                vec![0.0; OUTPUT_SIZE]
            }
            Err(err) => {
                warn!(id = self.core.id, %err, "brain evaluation failed");
                vec![0.0; OUTPUT_SIZE]
            }
        };

        let mut interactions = Vec::new();

        let drive = Vector2D::from_angle(out[output::DIRECTION] * TAU)
            .set_mag(out[output::MAGNITUDE] * self.traits.max_force);
        self.core.transform.apply_force(drive);

        if out[output::HERDING] > p.herding_threshold {
            self.herd(&senses, view);
        }

        if out[output::MATING] > p.mating_threshold {
            self.reproductive_urge = out[output::MATING] * p.reproductive_urge_factor;
            interactions.extend(self.seek_mate(index, &senses, view, rng));
        } else {
            self.reproductive_urge = 0.0;
        }

        if out[output::EATING] > p.eating_threshold {
            interactions.extend(self.bite(index, &senses, view));
        }

        if out[output::GROWTH] > p.growth_threshold {
            self.grow(out[output::GROWTH], view.params);
        }

        if out[output::HEALING] > p.healing_threshold {
            self.heal(out[output::HEALING], p);
        }

        if out[output::ATTACK] > p.attack_threshold {
            interactions.extend(self.strike(index, &senses, view));
        }

        self.core.use_energy(self.metabolism_cost(p));

        let health_ratio = self.core.health_ratio();
        let t = &mut self.core.transform;
        t.acceleration = t.acceleration.limit(self.traits.max_force) * health_ratio;
        t.step(self.traits.max_speed);
        t.location = view.world.confine(t.location);

        self.core.clamp_vitals();
        interactions
    }

    fn grow(&mut self, factor: f64, params: &Params) {
        self.core.grow(factor, params.animal.growth_speed);
        self.refresh_size(params.animal.base_size);
    }

    /// Gives birth. `partner` is the father's genome; `None` means the
    /// mother fertilized herself.
    fn reproduce<R: Rng>(
        &mut self,
        partner: Option<&Genome>,
        birth: &Birth<'_>,
        rng: &mut R,
    ) -> Result<Self> {
        let p = &birth.params.animal;
        let own = self.genome();
        let father = partner.unwrap_or(&own);
        let traits = self.core.traits;

        let mut dna = Dna::crossover(&father.dna, &own.dna, rng)?;
        dna.percentage_mutate(traits.mut_prob_dna, traits.mut_size_dna, rng);
        let mut brain = NeuralNetwork::crossover(&father.brain, &own.brain, rng)?;
        brain.ranged_mutate(traits.mut_prob_nn, traits.mut_size_nn, rng);

        let genome = Genome {
            dna,
            brain,
            generation: father.generation.max(own.generation) + 1,
        };
        let maturity = self.traits.gestation_duration_ms / p.full_gestation_ms;
        let mut child = Animal::new(
            birth.id,
            self.location(),
            genome,
            maturity,
            birth.tick,
            birth.params,
            rng,
        );
        child
            .core
            .fill(p.min_health_to_reproduce * p.newborn_health_factor, p.initial_energy_ratio);

        self.offspring += 1;
        self.pregnant = false;
        Ok(child)
    }
}
