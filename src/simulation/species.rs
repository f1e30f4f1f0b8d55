//! Immutable per-species blueprints.
//!
//! A blueprint lists the default gene values of a species. The simulation
//! turns it into template DNA once at construction; every individual that is
//! not born from parents is derived from that template.

use serde::{Deserialize, Serialize};

use super::brain::Topology;
use super::dna::{Dna, Gene, GeneType};
use super::organism::perception;

/// Genes shared by animals and plants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganismGenes {
    /// Body size relative to the species maximum, in `[0, 1]`.
    pub size_ratio: f64,
    /// Red, green and blue channels.
    pub color: [f64; 3],
    /// Percentage applied when mutating offspring DNA.
    pub mut_size_dna: f64,
    /// Per-gene probability of mutating offspring DNA.
    pub mut_prob_dna: f64,
    /// Offset range applied when mutating offspring brains.
    pub mut_size_nn: f64,
    /// Per-weight probability of mutating offspring brains.
    pub mut_prob_nn: f64,
    /// How appealing the organism is as a mate.
    pub attractiveness: f64,
    /// Overall growth speed.
    pub growth_scale_factor: f64,
    /// Damping of growth as maturity rises.
    pub growth_maturity_factor: f64,
    /// Exponent of the maturity damping.
    pub growth_maturity_exponent: f64,
}

impl OrganismGenes {
    fn genes(&self) -> Vec<Gene> {
        vec![
            Gene::new("sizeRatio", self.size_ratio, GeneType::Smaller),
            Gene::new("colorRed", self.color[0], GeneType::Color),
            Gene::new("colorGreen", self.color[1], GeneType::Color),
            Gene::new("colorBlue", self.color[2], GeneType::Color),
            Gene::new("mutSizeDNA", self.mut_size_dna, GeneType::Probability),
            Gene::new("mutProbDNA", self.mut_prob_dna, GeneType::Probability),
            Gene::new("mutSizeNN", self.mut_size_nn, GeneType::Probability),
            Gene::new("mutProbNN", self.mut_prob_nn, GeneType::Probability),
            Gene::new("attractiveness", self.attractiveness, GeneType::Smaller),
            Gene::new("growthScaleFactor", self.growth_scale_factor, GeneType::Smaller),
            Gene::new("growthMaturityFactor", self.growth_maturity_factor, GeneType::Bigger),
            Gene::new("growthMaturityExponent", self.growth_maturity_exponent, GeneType::Smaller),
        ]
    }
}

impl Default for OrganismGenes {
    fn default() -> Self {
        Self {
            size_ratio: 0.6,
            color: [128.0, 128.0, 128.0],
            mut_size_dna: 0.05,
            mut_prob_dna: 0.1,
            mut_size_nn: 0.1,
            mut_prob_nn: 0.1,
            attractiveness: 0.5,
            growth_scale_factor: 1.0,
            growth_maturity_factor: 20.0,
            growth_maturity_exponent: 1.0,
        }
    }
}

/// Default genes of an animal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimalBlueprint {
    /// Shared organism genes.
    pub organism: OrganismGenes,
    /// Scales the genetic top speed by `0.5 + speed_ratio`.
    pub speed_ratio: f64,
    /// Bite and attack strength.
    pub strength: f64,
    /// Time from mating to birth in milliseconds.
    pub gestation_duration_ms: f64,
    /// Largest steering force per tick.
    pub max_force: f64,
    /// Largest speed per tick.
    pub max_speed: f64,
    /// Half-angle of the field of view in degrees.
    pub view_angle: f64,
    /// How far the animal can see.
    pub view_distance: f64,
    /// Weight of the separation force.
    pub separation_weight: f64,
    /// Weight of the alignment force.
    pub alignment_weight: f64,
    /// Weight of the cohesion force.
    pub cohesion_weight: f64,
    /// Preferred distance to neighbors.
    pub separation_distance: f64,
}

impl Default for AnimalBlueprint {
    fn default() -> Self {
        Self {
            organism: OrganismGenes::default(),
            speed_ratio: 0.5,
            strength: 20.0,
            gestation_duration_ms: 2000.0,
            max_force: 0.2,
            max_speed: 1.0,
            view_angle: 45.0,
            view_distance: 100.0,
            separation_weight: 1.0,
            alignment_weight: 0.5,
            cohesion_weight: 0.5,
            separation_distance: 30.0,
        }
    }
}

impl AnimalBlueprint {
    /// Template DNA in animal gene order.
    pub fn to_dna(&self) -> Dna {
        let mut genes = self.organism.genes();
        genes.extend([
            Gene::new("speedRatio", self.speed_ratio, GeneType::Smaller),
            Gene::new("strength", self.strength, GeneType::Bigger),
            Gene::new("gestationDuration", self.gestation_duration_ms, GeneType::Time),
            Gene::new("maxForce", self.max_force, GeneType::Smaller),
            Gene::new("maxSpeed", self.max_speed, GeneType::Smaller),
            Gene::new("viewAngle", self.view_angle, GeneType::Angle),
            Gene::new("viewDistance", self.view_distance, GeneType::Distance),
            Gene::new("separationWeight", self.separation_weight, GeneType::Smaller),
            Gene::new("alignmentWeight", self.alignment_weight, GeneType::Smaller),
            Gene::new("cohesionWeight", self.cohesion_weight, GeneType::Smaller),
            Gene::new("separationDistance", self.separation_distance, GeneType::Distance),
        ]);
        Dna::new(genes)
    }
}

/// Default genes of a plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantBlueprint {
    /// Shared organism genes.
    pub organism: OrganismGenes,
    /// How far seeds land from the parent.
    pub spreading_range: f64,
    /// Time between growth or spreading attempts in milliseconds.
    pub growth_interval_ms: f64,
}

impl Default for PlantBlueprint {
    fn default() -> Self {
        Self {
            organism: OrganismGenes {
                size_ratio: 0.5,
                color: [128.0, 180.0, 128.0],
                mut_size_dna: 0.1,
                mut_prob_dna: 0.01,
                mut_size_nn: 0.1,
                mut_prob_nn: 0.01,
                attractiveness: 1.0,
                ..OrganismGenes::default()
            },
            spreading_range: 30.0,
            growth_interval_ms: 10_000.0,
        }
    }
}

impl PlantBlueprint {
    /// Template DNA in plant gene order.
    pub fn to_dna(&self) -> Dna {
        let mut genes = self.organism.genes();
        genes.extend([
            Gene::new("spreadingRange", self.spreading_range, GeneType::Distance),
            Gene::new("growthInterval", self.growth_interval_ms, GeneType::Time),
        ]);
        Dna::new(genes)
    }
}

/// Blueprints of every species plus the animal brain layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesConfig {
    /// Animal defaults.
    pub animal: AnimalBlueprint,
    /// Plant defaults.
    pub plant: PlantBlueprint,
    /// Animal brain layout. Input and output sizes are fixed by perception.
    pub brain: Topology,
}

impl Default for SpeciesConfig {
    fn default() -> Self {
        Self {
            animal: AnimalBlueprint::default(),
            plant: PlantBlueprint::default(),
            brain: Topology {
                input: perception::INPUT_SIZE,
                hidden: 36,
                output: perception::OUTPUT_SIZE,
            },
        }
    }
}
