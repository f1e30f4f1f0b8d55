//! Trait for entities that occupy a point in the world.
//!
//! Implemented by every organism so the [`World`](super::world::World) can
//! index them without knowing their species.

use super::vector2d::Vector2D;

/// Anything with a position that can be placed in the spatial index.
pub trait Locatable {
    /// Current position.
    fn location(&self) -> Vector2D;

    /// Body diameter, used for contact tests.
    fn size(&self) -> f64;
}
