//! Error types for the simulation core.
//!
//! Only construction and validation at public boundaries fail. Anything that
//! happens inside a tick (gene values out of range, health above its maximum,
//! an organism outside the world) is clamped or skipped locally instead.

use thiserror::Error;

/// Errors surfaced by the simulation's public API.
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Two matrices have incompatible shapes for the requested operation.
    #[error("shape mismatch in {op}: {left:?} vs {right:?}")]
    ShapeMismatch {
        /// Name of the operation that was attempted.
        op: &'static str,
        /// Shape (rows, cols) of the left operand.
        left: (usize, usize),
        /// Shape (rows, cols) of the right operand.
        right: (usize, usize),
    },

    /// A network received an input or target vector of the wrong length.
    #[error("expected {expected} values, got {actual}")]
    InputLength {
        /// Number of nodes in the receiving layer.
        expected: usize,
        /// Length of the slice that was passed in.
        actual: usize,
    },

    /// Two networks with different topologies cannot be crossed over.
    #[error("network topology mismatch: {left:?} vs {right:?}")]
    TopologyMismatch {
        /// (input, hidden, output) of the first parent.
        left: (usize, usize, usize),
        /// (input, hidden, output) of the second parent.
        right: (usize, usize, usize),
    },

    /// Two DNA strands of different length cannot be crossed over.
    #[error("DNA length mismatch: {left} vs {right} genes")]
    DnaLengthMismatch {
        /// Gene count of the first parent.
        left: usize,
        /// Gene count of the second parent.
        right: usize,
    },

    /// A quadtree node must hold at least one occupant.
    #[error("quadtree capacity must be positive, got {0}")]
    InvalidCapacity(usize),

    /// World extents must be finite and positive.
    #[error("invalid world bounds {width} x {height}")]
    InvalidBounds {
        /// Requested width.
        width: f64,
        /// Requested height.
        height: f64,
    },

    /// A vector with NaN or infinite components was passed in.
    #[error("non-finite vector ({x}, {y})")]
    NonFiniteVector {
        /// X component.
        x: f64,
        /// Y component.
        y: f64,
    },

    /// A configuration value is structurally invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reading a configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SimulationError>;
