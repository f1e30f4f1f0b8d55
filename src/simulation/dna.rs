//! Positionally addressed genetic encoding with typed mutation policies.
//!
//! A [`Dna`] strand is a fixed-length list of [`Gene`]s. Every species reads
//! its genes by index (see [`layout`]); crossover and mutation never change
//! the length of a strand.

use rand::Rng;
use serde::Serialize;

use super::error::{Result, SimulationError};

/// Semantic type of a gene, selecting the scale used by percentage mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GeneType {
    /// Color channel in `[0, 255]`.
    Color,
    /// Duration in milliseconds.
    Time,
    /// Probability or small rate.
    Probability,
    /// Distance in world units.
    Distance,
    /// Scalar that is typically large.
    Bigger,
    /// Scalar that is typically small.
    Smaller,
    /// Anything else.
    Other,
    /// Angle in degrees.
    Angle,
}

impl GeneType {
    /// Absolute magnitude that one unit of "percent" corresponds to.
    pub fn scale(self) -> f64 {
        match self {
            GeneType::Color => 255.0,
            GeneType::Time => 1000.0,
            GeneType::Probability => 0.1,
            GeneType::Distance => 100.0,
            GeneType::Bigger => 10.0,
            GeneType::Smaller | GeneType::Other => 1.0,
            GeneType::Angle => 180.0,
        }
    }
}

/// A single named scalar trait.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gene {
    /// Raw, unclamped value.
    pub value: f64,
    /// Human-readable name, used for reporting.
    pub name: &'static str,
    /// Semantic type.
    pub kind: GeneType,
}

impl Gene {
    /// Creates a gene.
    pub fn new(name: &'static str, value: f64, kind: GeneType) -> Self {
        Self { value, name, kind }
    }

    /// Adds a uniform offset in `[-range, range]` with probability `chance`.
    pub fn ranged_mutate<R: Rng>(&mut self, chance: f64, range: f64, rng: &mut R) {
        if range > 0.0 && rng.random::<f64>() < chance {
            self.value += rng.random_range(-range..=range);
        }
    }

    /// Like [`Gene::ranged_mutate`], with the range taken from the type's scale.
    pub fn percentage_mutate<R: Rng>(&mut self, chance: f64, percent: f64, rng: &mut R) {
        let range = percent * self.kind.scale();
        self.ranged_mutate(chance, range, rng);
    }
}

/// Gene indices for each species.
pub mod layout {
    /// Number of genes shared by every organism.
    pub const ORGANISM_GENES: usize = 12;

    /// Body size relative to the species maximum.
    pub const SIZE_RATIO: usize = 0;
    /// Red channel.
    pub const COLOR_RED: usize = 1;
    /// Green channel.
    pub const COLOR_GREEN: usize = 2;
    /// Blue channel.
    pub const COLOR_BLUE: usize = 3;
    /// Step size of DNA mutation in offspring.
    pub const MUT_SIZE_DNA: usize = 4;
    /// Per-gene DNA mutation chance in offspring.
    pub const MUT_PROB_DNA: usize = 5;
    /// Step size of brain mutation in offspring.
    pub const MUT_SIZE_NN: usize = 6;
    /// Per-weight brain mutation chance in offspring.
    pub const MUT_PROB_NN: usize = 7;
    /// Mate appeal.
    pub const ATTRACTIVENESS: usize = 8;
    /// Numerator of the growth rate.
    pub const GROWTH_SCALE_FACTOR: usize = 9;
    /// Slows growth as maturity rises.
    pub const GROWTH_MATURITY_FACTOR: usize = 10;
    /// Exponent applied to `1 + maturity` in the growth rate.
    pub const GROWTH_MATURITY_EXPONENT: usize = 11;

    /// Animal-specific genes, following the organism prefix.
    pub mod animal {
        use super::ORGANISM_GENES;

        /// Scales the top speed.
        pub const SPEED_RATIO: usize = ORGANISM_GENES;
        /// Bite and attack strength.
        pub const STRENGTH: usize = ORGANISM_GENES + 1;
        /// Gestation in milliseconds.
        pub const GESTATION_DURATION: usize = ORGANISM_GENES + 2;
        /// Steering force limit.
        pub const MAX_FORCE: usize = ORGANISM_GENES + 3;
        /// Top speed before the speed ratio.
        pub const MAX_SPEED: usize = ORGANISM_GENES + 4;
        /// Half-angle of the view cone in degrees.
        pub const VIEW_ANGLE: usize = ORGANISM_GENES + 5;
        /// Sight range.
        pub const VIEW_DISTANCE: usize = ORGANISM_GENES + 6;
        /// Weight of the separation force.
        pub const SEPARATION_WEIGHT: usize = ORGANISM_GENES + 7;
        /// Weight of the alignment force.
        pub const ALIGNMENT_WEIGHT: usize = ORGANISM_GENES + 8;
        /// Weight of the cohesion force.
        pub const COHESION_WEIGHT: usize = ORGANISM_GENES + 9;
        /// Preferred spacing to neighbours.
        pub const SEPARATION_DISTANCE: usize = ORGANISM_GENES + 10;

        /// Total gene count of an animal strand.
        pub const LEN: usize = ORGANISM_GENES + 11;
    }

    /// Plant-specific genes, following the organism prefix.
    pub mod plant {
        use super::ORGANISM_GENES;

        /// Largest seed offset.
        pub const SPREADING_RANGE: usize = ORGANISM_GENES;
        /// Milliseconds between growth or spreading attempts.
        pub const GROWTH_INTERVAL: usize = ORGANISM_GENES + 1;

        /// Total gene count of a plant strand.
        pub const LEN: usize = ORGANISM_GENES + 2;
    }
}

/// An ordered strand of genes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dna {
    genes: Vec<Gene>,
}

impl Dna {
    /// Wraps a gene list. The length is fixed from here on.
    pub fn new(genes: Vec<Gene>) -> Self {
        Self { genes }
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// True without genes.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Genes in layout order.
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// Raw value of the gene at `index`.
    ///
    /// Panics if `index` is outside the strand; indices come from [`layout`].
    pub fn value(&self, index: usize) -> f64 {
        self.genes[index].value
    }

    /// Overwrites the raw value at `index`.
    pub fn set_value(&mut self, index: usize, value: f64) {
        self.genes[index].value = value;
    }

    /// Uniform crossover: each gene comes from either parent with equal probability.
    pub fn crossover<R: Rng>(father: &Dna, mother: &Dna, rng: &mut R) -> Result<Dna> {
        if father.len() != mother.len() {
            return Err(SimulationError::DnaLengthMismatch {
                left: father.len(),
                right: mother.len(),
            });
        }
        let genes = father
            .genes
            .iter()
            .zip(&mother.genes)
            .map(|(f, m)| if rng.random_bool(0.5) { f.clone() } else { m.clone() })
            .collect();
        Ok(Dna { genes })
    }

    /// Mutates every gene independently with probability `chance` by up to `range`.
    pub fn ranged_mutate<R: Rng>(&mut self, chance: f64, range: f64, rng: &mut R) {
        for gene in &mut self.genes {
            gene.ranged_mutate(chance, range, rng);
        }
    }

    /// Mutates every gene independently, scaled by its type.
    pub fn percentage_mutate<R: Rng>(&mut self, chance: f64, percent: f64, rng: &mut R) {
        for gene in &mut self.genes {
            gene.percentage_mutate(chance, percent, rng);
        }
    }
}
