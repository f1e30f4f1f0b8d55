//! The simulation driver.
//!
//! One call to [`Simulation::tick`] runs the whole pipeline:
//! - due gestation and cooldown events fire
//! - dead organisms are removed
//! - both quadtrees are rebuilt from the survivors
//! - every organism decides in parallel against a frozen view of the world
//! - the resulting interactions are applied in list order
//! - population control tops up each species by at most one batch
//!
//! Each organism draws from its own RNG seeded from the simulation seed, the
//! tick and its id, so results do not depend on how rayon schedules work.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, trace, warn};

use super::dna::Dna;
use super::error::{Result, SimulationError};
use super::events::{EventQueue, Interaction, PendingEvent};
use super::organism::animal::{Animal, Gender, Genome};
use super::organism::perception::{AnimalView, PlantView, TickView};
use super::organism::plant::Plant;
use super::organism::{Birth, Lifecycle, Organism};
use super::params::{DisplayOptions, Params, PopulationParams, WorldParams, check_band};
use super::snapshot::{OrganismSnapshot, WorldSnapshot, rect_to_array};
use super::stats::{AnimalStats, PopulationStats, SpeciesLedger, SpeciesStats};
use super::world::World;

/// Per-organism RNG for one tick.
fn agent_rng(seed: u64, tick: u64, id: u64) -> StdRng {
    // splitmix64 finalizer over the three inputs
    let mut z = seed ^ tick.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ id.wrapping_mul(0xD1B5_4A32_D192_ED03);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    StdRng::seed_from_u64(z ^ (z >> 31))
}

/// The ecosystem: both species, their world and the pending events.
pub struct Simulation {
    world: World,
    params: Params,
    animals: Vec<Animal>,
    plants: Vec<Plant>,
    events: EventQueue,
    tick: u64,
    next_id: u64,
    seed: u64,
    rng: StdRng,
    animal_template: Genome,
    plant_template: Dna,
    animal_ledger: SpeciesLedger,
    plant_ledger: SpeciesLedger,
    last_stats: PopulationStats,
}

impl Simulation {
    /// Creates a simulation on `world` with default behaviour constants.
    pub fn new(population: PopulationParams, world: World) -> Result<Self> {
        let params = Params {
            world: WorldParams {
                width: world.width(),
                height: world.height(),
                animal_capacity: world.animal_tree().capacity(),
                plant_capacity: world.plant_tree().capacity(),
                max_depth: world.animal_tree().max_depth(),
                edge_policy: world.edge_policy(),
            },
            population,
            ..Params::default()
        };
        Self::with_world(params, world)
    }

    /// Creates the world described by `params` and a simulation on it.
    pub fn from_params(params: Params) -> Result<Self> {
        let w = &params.world;
        let world = World::with_max_depth(
            w.width,
            w.height,
            w.animal_capacity,
            w.plant_capacity,
            w.max_depth,
        )?
        .with_edge_policy(w.edge_policy);
        Self::with_world(params, world)
    }

    fn with_world(params: Params, world: World) -> Result<Self> {
        params.validate()?;
        let seed = params.seed.unwrap_or_else(|| rand::rng().random());
        let rng = StdRng::seed_from_u64(seed);

        let animal_template = Genome::blueprint(&params.species);
        let plant_template = params.species.plant.to_dna();

        let mut sim = Self {
            world,
            params,
            animals: Vec::new(),
            plants: Vec::new(),
            events: EventQueue::new(),
            tick: 0,
            next_id: 0,
            seed,
            rng,
            animal_template,
            plant_template,
            animal_ledger: SpeciesLedger::default(),
            plant_ledger: SpeciesLedger::default(),
            last_stats: PopulationStats::default(),
        };

        let pop = &sim.params.population;
        let (start_plants, start_animals) = (
            pop.start_plants.min(pop.max_plants),
            pop.start_animals.min(pop.max_animals),
        );
        for _ in 0..start_plants {
            sim.spawn_plant();
        }
        for _ in 0..start_animals {
            sim.spawn_animal();
        }
        sim.last_stats = sim.stats();
        info!(
            seed,
            animals = sim.animals.len(),
            plants = sim.plants.len(),
            "simulation created"
        );
        Ok(sim)
    }

    /// Advances the simulation by one tick and reports the new state.
    pub fn tick(&mut self) -> PopulationStats {
        self.fire_due_events();
        self.remove_dead();
        self.rebuild_index();
        let interactions = self.decide();
        self.apply_interactions(interactions);
        self.control_pops();

        let stats = self.stats();
        self.tick += 1;
        self.last_stats = stats.clone();
        stats
    }

    fn fire_due_events(&mut self) {
        for event in self.events.drain_due(self.tick) {
            match event {
                PendingEvent::Birth { mother_id, father } => self.give_birth(mother_id, &father),
                PendingEvent::CooldownEnds { mother_id } => {
                    if let Some(mother) = self.animals.iter_mut().find(|a| a.core.id == mother_id) {
                        mother.recovering = false;
                    }
                }
            }
        }
    }

    fn give_birth(&mut self, mother_id: u64, father: &Genome) {
        let Some(m) = self.animals.iter().position(|a| a.core.id == mother_id) else {
            debug!(mother_id, "mother gone before birth");
            return;
        };
        if self.animals[m].is_dead() {
            debug!(mother_id, "mother died before birth");
            return;
        }

        if self.animals.len() < self.params.population.max_animals {
            let birth = Birth {
                id: self.allocate_id(),
                tick: self.tick,
                params: &self.params,
                world: &self.world,
            };
            match self.animals[m].reproduce(Some(father), &birth, &mut self.rng) {
                Ok(child) => {
                    debug!(mother_id, child = child.core.id, generation = child.core.generation, "animal born");
                    self.animal_ledger.births += 1;
                    self.animals.push(child);
                }
                Err(err) => warn!(mother_id, %err, "birth failed"),
            }
        } else {
            debug!(mother_id, "population at capacity, pregnancy lost");
        }

        let mother = &mut self.animals[m];
        mother.pregnant = false;
        mother.recovering = true;
        let fire = self.tick + self.params.ticks_for_ms(self.params.animal.pregnancy_cooldown_ms);
        self.events.schedule(fire, PendingEvent::CooldownEnds { mother_id });
    }

    fn remove_dead(&mut self) {
        let (tick, period) = (self.tick, self.params.tick_period_ms);

        let ledger = &mut self.animal_ledger;
        self.animals.retain(|a| {
            if !a.is_dead() {
                return true;
            }
            let age = a.core.age(tick, period);
            debug!(id = a.core.id, age, "animal died");
            ledger.record_death(age);
            false
        });

        let ledger = &mut self.plant_ledger;
        self.plants.retain(|p| {
            if !p.is_dead() {
                return true;
            }
            let age = p.core.age(tick, period);
            debug!(id = p.core.id, age, "plant died");
            ledger.record_death(age);
            false
        });
    }

    fn rebuild_index(&mut self) {
        self.world.clear_quadtrees();
        let animals = self
            .animals
            .iter()
            .enumerate()
            .filter(|&(i, a)| self.world.insert_animal(i, a))
            .count();
        let plants = self
            .plants
            .iter()
            .enumerate()
            .filter(|&(i, p)| self.world.insert_plant(i, p))
            .count();
        trace!(tick = self.tick, animals, plants, "quadtrees rebuilt");
    }

    /// Parallel decision phase. Every organism mutates only itself.
    fn decide(&mut self) -> Vec<Interaction> {
        let animal_views: Vec<AnimalView> = self
            .animals
            .iter()
            .map(|a| a.view(&self.params.animal))
            .collect();
        let plant_views: Vec<PlantView> = self.plants.iter().map(Plant::view).collect();
        let view = TickView {
            world: &self.world,
            animals: &animal_views,
            plants: &plant_views,
            params: &self.params,
            tick: self.tick,
        };
        let (seed, tick) = (self.seed, self.tick);

        let animal_requests: Vec<Vec<Interaction>> = self
            .animals
            .par_iter_mut()
            .enumerate()
            .map(|(i, animal)| {
                let mut rng = agent_rng(seed, tick, animal.core.id);
                animal.update(i, &view, &mut rng)
            })
            .collect();
        let plant_requests: Vec<Vec<Interaction>> = self
            .plants
            .par_iter_mut()
            .enumerate()
            .map(|(i, plant)| {
                let mut rng = agent_rng(seed, tick, plant.core.id);
                plant.update(i, &view, &mut rng)
            })
            .collect();

        animal_requests
            .into_iter()
            .chain(plant_requests)
            .flatten()
            .collect()
    }

    /// Applies interaction requests in order.
    ///
    /// Indices refer to the species lists as they were when the requests
    /// were made; organisms added meanwhile are appended and leave them
    /// valid. Requests naming an index past the end of a list, or from or
    /// against organisms that died earlier in the same batch, are dropped.
    pub fn apply_interactions(&mut self, interactions: Vec<Interaction>) {
        for interaction in interactions {
            match interaction {
                Interaction::Eat { animal, plant, damage } => self.eat(animal, plant, damage),
                Interaction::Attack { attacker, target, damage } => self.attack(attacker, target, damage),
                Interaction::Mate { initiator, partner } => self.resolve_mating(initiator, partner),
                Interaction::SelfFertilize { mother } => self.self_fertilize(mother),
                Interaction::Spread { plant } => self.spread(plant),
            }
        }
    }

    fn animal_alive(&self, index: usize) -> bool {
        let alive = self.animals.get(index).is_some_and(|a| !a.is_dead());
        if index >= self.animals.len() {
            debug!(index, "interaction names unknown animal");
        }
        alive
    }

    fn plant_alive(&self, index: usize) -> bool {
        let alive = self.plants.get(index).is_some_and(|p| !p.is_dead());
        if index >= self.plants.len() {
            debug!(index, "interaction names unknown plant");
        }
        alive
    }

    fn eat(&mut self, animal: usize, plant: usize, damage: f64) {
        if !self.animal_alive(animal) || !self.plant_alive(plant) {
            return;
        }
        let target = &mut self.plants[plant];
        let bite = damage.min(target.core.health());
        if bite <= 0.0 {
            return;
        }
        target.core.take_damage(bite);
        let killed = target.is_dead();

        let eater = &mut self.animals[animal];
        eater.core.restore_energy(bite * self.params.animal.nutrition_factor);
        if killed {
            eater.plants_killed += 1;
        }
    }

    fn attack(&mut self, attacker: usize, target: usize, damage: f64) {
        if attacker == target || !self.animal_alive(attacker) || !self.animal_alive(target) {
            return;
        }
        let victim = &mut self.animals[target];
        victim.core.take_damage(damage);
        if victim.is_dead() {
            self.animals[attacker].animals_killed += 1;
        }
    }

    /// Turns a mating request into at most one pregnancy.
    ///
    /// Same-gender pairs and pairs where either side is no longer eligible
    /// are ignored; once the female is pregnant, repeated requests for the
    /// pair schedule nothing.
    fn resolve_mating(&mut self, a: usize, b: usize) {
        if !self.animal_alive(a) || !self.animal_alive(b) {
            return;
        }
        let (female, male) = match (self.animals[a].gender, self.animals[b].gender) {
            (Gender::Female, Gender::Male) => (a, b),
            (Gender::Male, Gender::Female) => (b, a),
            _ => return,
        };
        let p = &self.params.animal;
        if !self.animals[male].can_mate(p) || !self.animals[female].can_mate(p) {
            return;
        }
        let father = self.animals[male].genome();
        self.conceive(female, father);
    }

    fn self_fertilize(&mut self, mother: usize) {
        if !self.animal_alive(mother) {
            return;
        }
        let female = &self.animals[mother];
        if female.gender == Gender::Female && female.can_mate(&self.params.animal) {
            let father = female.genome();
            self.conceive(mother, father);
        }
    }

    fn conceive(&mut self, mother: usize, father: Genome) {
        let fire = self.tick + self.params.ticks_for_ms(self.animals[mother].traits.gestation_duration_ms);
        let mother = &mut self.animals[mother];
        mother.pregnant = true;
        debug!(mother = mother.core.id, fire, "gestation scheduled");
        self.events.schedule(
            fire,
            PendingEvent::Birth {
                mother_id: mother.core.id,
                father: Box::new(father),
            },
        );
    }

    fn spread(&mut self, plant: usize) {
        if !self.plant_alive(plant) || self.plants.len() >= self.params.population.max_plants {
            return;
        }
        let birth = Birth {
            id: self.allocate_id(),
            tick: self.tick,
            params: &self.params,
            world: &self.world,
        };
        match self.plants[plant].reproduce(None, &birth, &mut self.rng) {
            Ok(seedling) => {
                self.plant_ledger.births += 1;
                self.plants.push(seedling);
            }
            Err(err) => warn!(plant, %err, "spreading failed"),
        }
    }

    /// Adds at most one batch per species. Returns how many animals and
    /// plants were added.
    ///
    /// Animals are topped up only while below their minimum. Plants are
    /// topped up while below their minimum, or with regrowth enabled
    /// whenever a whole batch still fits under the maximum.
    pub fn control_pops(&mut self) -> (usize, usize) {
        let pop = &self.params.population;

        let n = self.animals.len();
        let animals = if n < pop.min_animals {
            pop.new_animals_per_tick.min(pop.max_animals.saturating_sub(n))
        } else {
            0
        };

        let n = self.plants.len();
        let plants = if n < pop.min_plants
            || (pop.plant_regrowth && n + pop.new_plants_per_tick <= pop.max_plants)
        {
            pop.new_plants_per_tick.min(pop.max_plants.saturating_sub(n))
        } else {
            0
        };

        for _ in 0..animals {
            self.spawn_animal();
        }
        for _ in 0..plants {
            self.spawn_plant();
        }
        if animals + plants > 0 {
            debug!(tick = self.tick, animals, plants, "population topped up");
        }
        (animals, plants)
    }

    fn fittest_genome(&self) -> Option<Genome> {
        self.animals
            .iter()
            .filter(|a| a.fitness() > 0.0)
            .max_by(|a, b| a.fitness().total_cmp(&b.fitness()))
            .map(Animal::genome)
    }

    fn spawn_animal(&mut self) {
        let fittest = if self.params.population.seed_from_fittest {
            self.fittest_genome()
        } else {
            None
        };
        let template = fittest.unwrap_or_else(|| self.animal_template.clone());

        let id = self.allocate_id();
        let location = self.world.random_location(&mut self.rng);
        match Animal::from_template(id, location, &template, self.tick, &self.params, &mut self.rng) {
            Ok(animal) => {
                self.animal_ledger.spawned += 1;
                self.animals.push(animal);
            }
            Err(err) => warn!(%err, "animal top-up failed"),
        }
    }

    fn spawn_plant(&mut self) {
        let id = self.allocate_id();
        let location = self.world.random_location(&mut self.rng);
        let plant = Plant::from_template(id, location, &self.plant_template, self.tick, &self.params, &mut self.rng);
        self.plant_ledger.spawned += 1;
        self.plants.push(plant);
    }

    /// Adds an animal unless the population is at its maximum.
    pub fn add_animal(&mut self, animal: Animal) -> bool {
        if self.animals.len() >= self.params.population.max_animals {
            return false;
        }
        self.animals.push(animal);
        true
    }

    /// Adds a plant unless the population is at its maximum.
    pub fn add_plant(&mut self, plant: Plant) -> bool {
        if self.plants.len() >= self.params.population.max_plants {
            return false;
        }
        self.plants.push(plant);
        true
    }

    /// Reserves a fresh organism id.
    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Figures for the current state.
    pub fn stats(&self) -> PopulationStats {
        let period = self.params.tick_period_ms;
        PopulationStats {
            tick: self.tick,
            animals: AnimalStats::collect(&self.animals, &self.animal_ledger, self.tick, period),
            plants: SpeciesStats::collect(
                self.plants.iter().map(Organism::core),
                &self.plant_ledger,
                self.tick,
                period,
            ),
            pending_events: self.events.len(),
        }
    }

    /// Read-only picture for renderers.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            width: self.world.width(),
            height: self.world.height(),
            animals: self.animals.iter().map(OrganismSnapshot::of).collect(),
            plants: self.plants.iter().map(OrganismSnapshot::of).collect(),
            animal_leaves: self.world.animal_tree().leaf_boundaries().iter().map(rect_to_array).collect(),
            plant_leaves: self.world.plant_tree().leaf_boundaries().iter().map(rect_to_array).collect(),
            stats: self.last_stats.clone(),
        }
    }

    /// World bounds and the quadtrees of the last rebuild.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Current parameters, including live changes.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Living animals, and any that died since the last tick.
    pub fn animals(&self) -> &[Animal] {
        &self.animals
    }

    /// Mutable access to the animals.
    pub fn animals_mut(&mut self) -> &mut [Animal] {
        &mut self.animals
    }

    /// Plants, and any eaten since the last tick.
    pub fn plants(&self) -> &[Plant] {
        &self.plants
    }

    /// Index of the next tick to run.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Seed every random draw derives from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Births scheduled but not yet delivered.
    pub fn pending_births(&self) -> usize {
        self.events.pending_births()
    }

    /// Births and cooldowns scheduled.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Sets the plant maximum. Fails if it would drop below the minimum.
    pub fn set_max_plants(&mut self, max: usize) -> Result<()> {
        check_band("plants", self.params.population.min_plants, max)?;
        self.params.population.max_plants = max;
        Ok(())
    }

    /// Sets the plant minimum. Fails if it would exceed the maximum.
    pub fn set_min_plants(&mut self, min: usize) -> Result<()> {
        check_band("plants", min, self.params.population.max_plants)?;
        self.params.population.min_plants = min;
        Ok(())
    }

    /// Sets the animal maximum. Fails if it would drop below the minimum.
    pub fn set_max_animals(&mut self, max: usize) -> Result<()> {
        check_band("animals", self.params.population.min_animals, max)?;
        self.params.population.max_animals = max;
        Ok(())
    }

    /// Sets the animal minimum. Fails if it would exceed the maximum.
    pub fn set_min_animals(&mut self, min: usize) -> Result<()> {
        check_band("animals", min, self.params.population.max_animals)?;
        self.params.population.min_animals = min;
        Ok(())
    }

    /// Plants added per top-up batch.
    pub fn set_new_plants_per_tick(&mut self, n: usize) {
        self.params.population.new_plants_per_tick = n;
    }

    /// Animals added per top-up batch.
    pub fn set_new_animals_per_tick(&mut self, n: usize) {
        self.params.population.new_animals_per_tick = n;
    }

    /// Changes the simulated duration of a tick. Already scheduled events
    /// keep their tick.
    pub fn set_tick_period_ms(&mut self, ms: f64) -> Result<()> {
        if !(ms.is_finite() && ms > 0.0) {
            return Err(SimulationError::InvalidConfig(format!(
                "tick period must be positive, got {ms}"
            )));
        }
        self.params.tick_period_ms = ms;
        Ok(())
    }

    /// Changes the leaf capacity of both quadtrees. Takes effect on the next
    /// rebuild.
    pub fn set_quadtree_capacity(&mut self, animal_capacity: usize, plant_capacity: usize) -> Result<()> {
        self.world.set_capacities(animal_capacity, plant_capacity)?;
        self.params.world.animal_capacity = animal_capacity;
        self.params.world.plant_capacity = plant_capacity;
        Ok(())
    }

    /// Changes the depth limit of both quadtrees.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.world.set_max_depth(max_depth);
        self.params.world.max_depth = max_depth;
    }

    /// Overlay toggles.
    pub fn display(&self) -> DisplayOptions {
        self.params.display
    }

    /// Replaces the overlay toggles.
    pub fn set_display(&mut self, display: DisplayOptions) {
        self.params.display = display;
    }
}
