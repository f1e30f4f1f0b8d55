//! # Ecosim - Evolving Animals and Plants
//!
//! A 2D ecosystem where animals driven by small neural networks eat,
//! herd, fight and breed among plants that photosynthesize and spread.
//! Brains and genes evolve through crossover and mutation at every birth.
//!
//! ## Features
//!
//! - Feed-forward neural network brains (one hidden layer, sigmoid)
//! - Typed genes with uniform crossover and scale-aware mutation
//! - Region quadtrees rebuilt every tick for neighbour queries
//! - Boids flocking (separation, cohesion, alignment)
//! - Gestation and pregnancy cooldown as scheduled events
//! - Parallel decision phase with deterministic per-organism randomness
//! - Real-time visualization with macroquad
//!
//! ## Core Modules
//!
//! - [`simulation::ecosystem`] - The tick pipeline
//! - [`simulation::organism`] - Animal and plant behaviour
//! - [`simulation::brain`] - Neural network implementation
//! - [`simulation::quadtree`] - Spatial index
//! - [`simulation::dna`] - Genes and the genetic operators

use tracing_subscriber::EnvFilter;

/// Core simulation logic and data structures.
pub mod simulation {
    /// Neural network and matrix implementation for animal brains.
    pub mod brain;
    /// Genes, DNA layout, crossover and mutation.
    pub mod dna;
    /// The simulation driver and its tick pipeline.
    pub mod ecosystem;
    /// Crate error type.
    pub mod error;
    /// Interactions applied after the decision phase and events scheduled
    /// for later ticks.
    pub mod events;
    /// Rectangles and query shapes.
    pub mod geometric_utils;
    /// Trait for entities with a position in the world.
    pub mod locatable;
    /// Organism state, behaviour and perception.
    pub mod organism;
    /// Simulation parameters.
    pub mod params;
    /// Point-region quadtree.
    pub mod quadtree;
    /// Read-only per-tick picture of the world.
    pub mod snapshot;
    /// Blueprint genes of every species.
    pub mod species;
    /// Population statistics.
    pub mod stats;
    /// Location, velocity and acceleration.
    pub mod transform;
    /// 2D vector math.
    pub mod vector2d;
    /// World bounds and spatial indices.
    pub mod world;
}

/// Installs a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Calling it again is a no-op.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // a subscriber may already be installed by an earlier call or a test harness
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
