//! Kinematic state of an organism and its integration step.

use serde::{Deserialize, Serialize};

use super::vector2d::Vector2D;

/// Location, velocity, accumulated acceleration and body size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    /// Position in world coordinates.
    pub location: Vector2D,
    /// Displacement per tick.
    pub velocity: Vector2D,
    /// Forces accumulated during the current tick.
    pub acceleration: Vector2D,
    /// Body diameter.
    pub size: f64,
}

impl Transform {
    /// Creates a resting transform at `location`.
    pub fn at(location: Vector2D, size: f64) -> Self {
        Self {
            location,
            size,
            ..Self::default()
        }
    }

    /// Adds a force to this tick's acceleration.
    pub fn apply_force(&mut self, force: Vector2D) {
        self.acceleration += force;
    }

    /// One semi-implicit Euler step.
    ///
    /// Velocity absorbs the acceleration and is then capped at `max_speed`,
    /// so `|velocity| <= max_speed` holds after every call.
    pub fn step(&mut self, max_speed: f64) {
        self.velocity = (self.velocity + self.acceleration).limit(max_speed);
        self.location += self.velocity;
        self.acceleration = Vector2D::ZERO;
    }

    /// Current speed.
    pub fn speed(&self) -> f64 {
        self.velocity.mag()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_limits_velocity_and_clears_acceleration() {
        let mut t = Transform::at(Vector2D::new(10.0, 10.0), 2.0);
        t.apply_force(Vector2D::new(30.0, 40.0));
        t.step(5.0);
        assert!((t.speed() - 5.0).abs() < 1e-9);
        assert_eq!(t.acceleration, Vector2D::ZERO);
        assert!((t.location.x - 13.0).abs() < 1e-9);
        assert!((t.location.y - 14.0).abs() < 1e-9);
    }
}
