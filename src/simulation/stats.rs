//! Population figures reported after every tick.

use serde::{Deserialize, Serialize};

use super::organism::animal::Animal;
use super::organism::{Organism, OrganismCore};

/// Incremental arithmetic mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningMean {
    count: u64,
    mean: f64,
}

impl RunningMean {
    /// Folds `value` into the mean.
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.mean += (value - self.mean) / self.count as f64;
    }

    /// Current mean, 0 before the first sample.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Samples folded in so far.
    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Lifetime counters of one species.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesLedger {
    /// Age at death, in seconds.
    pub death_age: RunningMean,
    /// Organisms removed after dying.
    pub deaths: u64,
    /// Organisms born to a parent.
    pub births: u64,
    /// Organisms added by population control.
    pub spawned: u64,
}

impl SpeciesLedger {
    /// Records a death at `age` seconds.
    pub fn record_death(&mut self, age: f64) {
        self.deaths += 1;
        self.death_age.push(age);
    }
}

/// Snapshot of one species.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesStats {
    /// Living individuals.
    pub count: usize,
    /// Average age in seconds.
    pub avg_age: f64,
    /// Average health.
    pub avg_health: f64,
    /// Average max health.
    pub avg_max_health: f64,
    /// Average health ratio.
    pub avg_health_ratio: f64,
    /// Average energy.
    pub avg_energy: f64,
    /// Average max energy.
    pub avg_max_energy: f64,
    /// Average energy ratio.
    pub avg_energy_ratio: f64,
    /// Running average of the age at death, in seconds.
    pub avg_death_age: f64,
    /// Total deaths so far.
    pub deaths: u64,
    /// Total births so far.
    pub births: u64,
    /// Total top-ups so far.
    pub spawned: u64,
}

impl SpeciesStats {
    /// Averages over `cores` plus the lifetime counters in `ledger`.
    pub fn collect<'a>(
        cores: impl Iterator<Item = &'a OrganismCore>,
        ledger: &SpeciesLedger,
        tick: u64,
        tick_period_ms: f64,
    ) -> Self {
        let mut stats = Self {
            avg_death_age: ledger.death_age.mean(),
            deaths: ledger.deaths,
            births: ledger.births,
            spawned: ledger.spawned,
            ..Self::default()
        };
        for core in cores {
            stats.count += 1;
            stats.avg_age += core.age(tick, tick_period_ms);
            stats.avg_health += core.health();
            stats.avg_max_health += core.max_health();
            stats.avg_health_ratio += core.health_ratio();
            stats.avg_energy += core.energy();
            stats.avg_max_energy += core.max_energy();
            stats.avg_energy_ratio += core.energy_ratio();
        }
        if stats.count > 0 {
            let n = stats.count as f64;
            stats.avg_age /= n;
            stats.avg_health /= n;
            stats.avg_max_health /= n;
            stats.avg_health_ratio /= n;
            stats.avg_energy /= n;
            stats.avg_max_energy /= n;
            stats.avg_energy_ratio /= n;
        }
        stats
    }
}

/// The fittest living animal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fittest {
    /// Id of the animal.
    pub id: u64,
    /// Its fitness.
    pub score: f64,
}

/// Animal-only figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimalStats {
    /// Figures shared with plants.
    pub species: SpeciesStats,
    /// Average generation.
    pub avg_generation: f64,
    /// Average of animals plus plants killed.
    pub avg_kills: f64,
    /// Average number of offspring born.
    pub avg_offspring: f64,
    /// Fittest animal, if any is alive.
    pub fittest: Option<Fittest>,
}

impl AnimalStats {
    /// Averages over `animals` plus the lifetime counters in `ledger`.
    pub fn collect(animals: &[Animal], ledger: &SpeciesLedger, tick: u64, tick_period_ms: f64) -> Self {
        let species = SpeciesStats::collect(animals.iter().map(Organism::core), ledger, tick, tick_period_ms);
        let fittest = animals
            .iter()
            .map(|a| Fittest {
                id: a.core.id,
                score: a.fitness(),
            })
            .max_by(|a, b| a.score.total_cmp(&b.score));

        let n = animals.len().max(1) as f64;
        let sum = |f: fn(&Animal) -> f64| animals.iter().map(f).sum::<f64>() / n;
        Self {
            species,
            avg_generation: sum(|a| f64::from(a.core.generation)),
            avg_kills: sum(|a| f64::from(a.animals_killed + a.plants_killed)),
            avg_offspring: sum(|a| f64::from(a.offspring)),
            fittest,
        }
    }
}

/// Figures reported after every tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    /// Tick these figures describe.
    pub tick: u64,
    /// Animal figures.
    pub animals: AnimalStats,
    /// Plant figures.
    pub plants: SpeciesStats,
    /// Births and cooldowns still scheduled.
    pub pending_events: usize,
}
