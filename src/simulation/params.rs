//! Simulation parameters, loaded from JSON and validated before use.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::{Result, SimulationError};
use super::organism::perception;
use super::species::SpeciesConfig;
use super::world::{DEFAULT_MAX_DEPTH, EdgePolicy};

/// World size and spatial index settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldParams {
    /// Simulation area width.
    pub width: f64,
    /// Simulation area height.
    pub height: f64,
    /// Leaf capacity of the animal quadtree.
    pub animal_capacity: usize,
    /// Leaf capacity of the plant quadtree.
    pub plant_capacity: usize,
    /// Depth limit of both quadtrees.
    pub max_depth: usize,
    /// Behaviour at the world edge.
    pub edge_policy: EdgePolicy,
}

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 800.0,
            animal_capacity: 4,
            plant_capacity: 4,
            max_depth: DEFAULT_MAX_DEPTH,
            edge_policy: EdgePolicy::Wrap,
        }
    }
}

/// Population bands enforced by the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationParams {
    /// Plants placed at construction.
    pub start_plants: usize,
    /// Animals placed at construction.
    pub start_animals: usize,
    /// Hard ceiling on plants.
    pub max_plants: usize,
    /// Plants are topped up whenever fewer than this are alive.
    pub min_plants: usize,
    /// Hard ceiling on animals.
    pub max_animals: usize,
    /// Animals are topped up whenever fewer than this are alive.
    pub min_animals: usize,
    /// Batch size of one plant top-up.
    pub new_plants_per_tick: usize,
    /// Batch size of one animal top-up.
    pub new_animals_per_tick: usize,
    /// Keep adding plant batches above `min_plants` while the ceiling allows.
    pub plant_regrowth: bool,
    /// Derive animal top-ups from the fittest living animal instead of the blueprint.
    pub seed_from_fittest: bool,
}

impl Default for PopulationParams {
    fn default() -> Self {
        Self {
            start_plants: 300,
            start_animals: 50,
            max_plants: 600,
            min_plants: 50,
            max_animals: 300,
            min_animals: 20,
            new_plants_per_tick: 2,
            new_animals_per_tick: 1,
            plant_regrowth: true,
            seed_from_fittest: false,
        }
    }
}

/// Constants governing animal behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimalParams {
    /// Body diameter of a fully grown animal with size ratio 1, minus one.
    pub base_size: f64,
    /// Upper bound for the genetic top speed.
    pub all_max_speed: f64,
    /// Max health per body point.
    pub health_body_ratio: f64,
    /// Max energy per body point.
    pub body_energy_ratio: f64,
    /// Damage taken per unit of energy that could not be paid.
    pub exhaustion_damage: f64,
    /// Output 2 gate.
    pub herding_threshold: f64,
    /// Output 3 gate.
    pub mating_threshold: f64,
    /// Output 4 gate.
    pub eating_threshold: f64,
    /// Output 5 gate.
    pub growth_threshold: f64,
    /// Output 6 gate.
    pub healing_threshold: f64,
    /// Output 7 gate.
    pub attack_threshold: f64,
    /// Health ratio needed to mate.
    pub min_health_to_reproduce: f64,
    /// Maturity needed to mate.
    pub min_maturity_to_reproduce: f64,
    /// Scales the mating output into the reproductive urge.
    pub reproductive_urge_factor: f64,
    /// Bite damage per point of strength.
    pub damage_factor: f64,
    /// Energy gained per point of plant damage.
    pub nutrition_factor: f64,
    /// Attack damage per point of strength and squared speed.
    pub attack_factor: f64,
    /// Health restored per tick at full healing output.
    pub healing_factor: f64,
    /// Energy burned per tick, before size and speed scaling.
    pub metabolism_factor: f64,
    /// Maturity gained per tick at full growth output, before gene scaling.
    pub growth_speed: f64,
    /// Pause after a birth before the mother can conceive again.
    pub pregnancy_cooldown_ms: f64,
    /// Per-tick chance, scaled by health ratio, of self-fertilization.
    pub asexual_chance: f64,
    /// Energy of a freshly spawned animal relative to its maximum.
    pub initial_energy_ratio: f64,
    /// Newborn health relative to `min_health_to_reproduce`.
    pub newborn_health_factor: f64,
    /// Gestation duration that yields a fully mature newborn, in milliseconds.
    pub full_gestation_ms: f64,
}

impl Default for AnimalParams {
    fn default() -> Self {
        Self {
            base_size: 20.0,
            all_max_speed: 4.0,
            health_body_ratio: 2.0,
            body_energy_ratio: 3.0,
            exhaustion_damage: 1.0,
            herding_threshold: 0.5,
            mating_threshold: 0.5,
            eating_threshold: 0.5,
            growth_threshold: 0.5,
            healing_threshold: 0.5,
            attack_threshold: 0.5,
            min_health_to_reproduce: 0.5,
            min_maturity_to_reproduce: 0.5,
            reproductive_urge_factor: 50.0,
            damage_factor: 4.0,
            nutrition_factor: 3.0,
            attack_factor: 1.0,
            healing_factor: 0.2,
            metabolism_factor: 0.03,
            growth_speed: 0.01,
            pregnancy_cooldown_ms: 10_000.0,
            asexual_chance: 0.005,
            initial_energy_ratio: 0.5,
            newborn_health_factor: 0.9,
            full_gestation_ms: 6000.0,
        }
    }
}

/// Constants governing plant behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantParams {
    /// Body diameter of a fully grown plant with size ratio 1, minus one.
    pub max_size: f64,
    /// Max health per body point.
    pub health_body_ratio: f64,
    /// Max energy per body point.
    pub body_energy_ratio: f64,
    /// Damage taken per unit of energy that could not be paid.
    pub exhaustion_damage: f64,
    /// Energy produced per tick.
    pub photosynthesis_rate: f64,
    /// Maturity gained per growth step, before gene scaling.
    pub growth_speed: f64,
    /// Lower bound of the growth interval gene in milliseconds.
    pub min_growth_interval_ms: f64,
    /// Fraction of max energy a plant pays to spread.
    pub spread_cost: f64,
    /// Maturity of a plant grown from a seed.
    pub seedling_maturity: f64,
    /// Energy of a fresh plant relative to its maximum.
    pub initial_energy_ratio: f64,
}

impl Default for PlantParams {
    fn default() -> Self {
        Self {
            max_size: 8.0,
            health_body_ratio: 1.0,
            body_energy_ratio: 1.0,
            exhaustion_damage: 1.0,
            photosynthesis_rate: 0.05,
            growth_speed: 4.0,
            min_growth_interval_ms: 1000.0,
            spread_cost: 0.3,
            seedling_maturity: 0.2,
            initial_energy_ratio: 0.5,
        }
    }
}

/// Overlay toggles read by the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    /// Draw health bars.
    pub show_health: bool,
    /// Draw energy bars.
    pub show_energy: bool,
    /// Draw quadtree leaf boundaries.
    pub show_quadtree: bool,
}

/// Simulation parameters that control ecosystem behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// World size and spatial index settings.
    pub world: WorldParams,
    /// Population bands.
    pub population: PopulationParams,
    /// Animal behaviour constants.
    pub animal: AnimalParams,
    /// Plant behaviour constants.
    pub plant: PlantParams,
    /// Species blueprints.
    pub species: SpeciesConfig,
    /// Simulated milliseconds per tick.
    pub tick_period_ms: f64,
    /// RNG seed; a random one is drawn when absent.
    pub seed: Option<u64>,
    /// Overlay toggles.
    pub display: DisplayOptions,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            world: WorldParams::default(),
            population: PopulationParams::default(),
            animal: AnimalParams::default(),
            plant: PlantParams::default(),
            species: SpeciesConfig::default(),
            tick_period_ms: 10.0,
            seed: None,
            display: DisplayOptions::default(),
        }
    }
}

impl Params {
    /// Reads parameters from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let params: Params = serde_json::from_str(&json)?;
        params.validate()?;
        Ok(params)
    }

    /// Writes the parameters as pretty-printed JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Number of ticks covering `ms` milliseconds, at least one.
    pub fn ticks_for_ms(&self, ms: f64) -> u64 {
        (ms / self.tick_period_ms).ceil().max(1.0) as u64
    }

    /// Rejects structurally invalid configurations.
    pub fn validate(&self) -> Result<()> {
        let w = &self.world;
        if !(w.width.is_finite() && w.height.is_finite() && w.width > 0.0 && w.height > 0.0) {
            return Err(SimulationError::InvalidBounds {
                width: w.width,
                height: w.height,
            });
        }
        if w.animal_capacity == 0 {
            return Err(SimulationError::InvalidCapacity(w.animal_capacity));
        }
        if w.plant_capacity == 0 {
            return Err(SimulationError::InvalidCapacity(w.plant_capacity));
        }
        check_band("plants", self.population.min_plants, self.population.max_plants)?;
        check_band("animals", self.population.min_animals, self.population.max_animals)?;
        if !(self.tick_period_ms.is_finite() && self.tick_period_ms > 0.0) {
            return Err(SimulationError::InvalidConfig(format!(
                "tick period must be positive, got {}",
                self.tick_period_ms
            )));
        }
        let brain = self.species.brain;
        if brain.input != perception::INPUT_SIZE || brain.output != perception::OUTPUT_SIZE {
            return Err(SimulationError::InvalidConfig(format!(
                "brain must map {} inputs to {} outputs, got {} -> {}",
                perception::INPUT_SIZE,
                perception::OUTPUT_SIZE,
                brain.input,
                brain.output
            )));
        }
        if brain.hidden == 0 {
            return Err(SimulationError::InvalidConfig(
                "brain needs at least one hidden node".into(),
            ));
        }
        if self.population.start_plants > self.population.max_plants {
            warn!(
                start = self.population.start_plants,
                max = self.population.max_plants,
                "start_plants exceeds max_plants, clamping"
            );
        }
        if self.population.start_animals > self.population.max_animals {
            warn!(
                start = self.population.start_animals,
                max = self.population.max_animals,
                "start_animals exceeds max_animals, clamping"
            );
        }
        Ok(())
    }
}

pub(crate) fn check_band(species: &str, min: usize, max: usize) -> Result<()> {
    if min > max {
        return Err(SimulationError::InvalidConfig(format!(
            "min {species} ({min}) exceeds max {species} ({max})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Params::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let params: Params =
            serde_json::from_str(r#"{ "population": { "max_plants": 42 }, "seed": 7 }"#).unwrap();
        assert_eq!(params.population.max_plants, 42);
        assert_eq!(params.population.min_plants, PopulationParams::default().min_plants);
        assert_eq!(params.seed, Some(7));
        assert_eq!(params.world, WorldParams::default());
    }

    #[test]
    fn inverted_band_is_rejected() {
        let mut params = Params::default();
        params.population.min_animals = 10;
        params.population.max_animals = 5;
        assert!(matches!(
            params.validate(),
            Err(SimulationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn gestation_converts_to_ticks() {
        let params = Params::default();
        assert_eq!(params.ticks_for_ms(2000.0), 200);
        assert_eq!(params.ticks_for_ms(0.0), 1);
    }
}
