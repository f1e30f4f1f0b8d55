//! Boids steering forces.
//!
//! Every force is `desired velocity - current velocity`, limited to the
//! agent's max force.

use super::super::vector2d::Vector2D;

/// Neighbourhood used by cohesion and alignment, in units of separation distance.
pub const FLOCK_RADIUS_FACTOR: f64 = 5.0;

/// A neighbour as seen by the steering rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the neighbour.
    pub location: Vector2D,
    /// Velocity of the neighbour.
    pub velocity: Vector2D,
}

/// Kinematic limits and state of the steering agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boid {
    /// Position of the agent.
    pub location: Vector2D,
    /// Velocity of the agent.
    pub velocity: Vector2D,
    /// Speed limit.
    pub max_speed: f64,
    /// Force limit.
    pub max_force: f64,
}

impl Boid {
    fn steer_towards(&self, desired: Vector2D) -> Vector2D {
        (desired - self.velocity).limit(self.max_force)
    }

    /// Steers towards `target` at full speed.
    pub fn seek(&self, target: Vector2D) -> Vector2D {
        let desired = (target - self.location).set_mag(self.max_speed);
        self.steer_towards(desired)
    }

    /// Pushes away from neighbours strictly closer than `distance`.
    ///
    /// Each repulsion is the normalized offset divided by the squared
    /// distance, so close neighbours dominate. Zero if nobody is that close.
    pub fn separate(&self, neighbors: &[Neighbor], distance: f64) -> Vector2D {
        let limit = distance * distance;
        let (sum, count) = neighbors
            .iter()
            .filter_map(|n| {
                let d2 = self.location.dist_sq(n.location);
                (d2 > 0.0 && d2 < limit).then(|| (self.location - n.location).normalize() / d2)
            })
            .fold((Vector2D::ZERO, 0usize), |(sum, count), v| (sum + v, count + 1));

        if count == 0 {
            return Vector2D::ZERO;
        }
        let average = sum / count as f64;
        if average.is_zero() {
            return Vector2D::ZERO;
        }
        self.steer_towards(average.set_mag(self.max_speed))
    }

    fn flockmates<'a>(
        &'a self,
        neighbors: &'a [Neighbor],
        separation_distance: f64,
    ) -> impl Iterator<Item = &'a Neighbor> + 'a {
        let radius = FLOCK_RADIUS_FACTOR * separation_distance;
        let limit = radius * radius;
        neighbors.iter().filter(move |n| {
            let d2 = self.location.dist_sq(n.location);
            d2 > 0.0 && d2 < limit
        })
    }

    /// Steers towards the centroid of nearby flockmates.
    pub fn cohesion(&self, neighbors: &[Neighbor], separation_distance: f64) -> Vector2D {
        let (sum, count) = self
            .flockmates(neighbors, separation_distance)
            .fold((Vector2D::ZERO, 0usize), |(sum, count), n| {
                (sum + n.location, count + 1)
            });
        if count == 0 {
            return Vector2D::ZERO;
        }
        self.seek(sum / count as f64)
    }

    /// Steers towards the average heading of nearby flockmates.
    pub fn align(&self, neighbors: &[Neighbor], separation_distance: f64) -> Vector2D {
        let (sum, count) = self
            .flockmates(neighbors, separation_distance)
            .fold((Vector2D::ZERO, 0usize), |(sum, count), n| {
                (sum + n.velocity, count + 1)
            });
        if count == 0 {
            return Vector2D::ZERO;
        }
        let heading = (sum / count as f64).normalize();
        if heading.is_zero() {
            return Vector2D::ZERO;
        }
        self.steer_towards(heading * self.max_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boid() -> Boid {
        Boid {
            location: Vector2D::new(50.0, 50.0),
            velocity: Vector2D::new(0.5, 0.0),
            max_speed: 2.0,
            max_force: 0.1,
        }
    }

    fn at(x: f64, y: f64) -> Neighbor {
        Neighbor {
            location: Vector2D::new(x, y),
            velocity: Vector2D::ZERO,
        }
    }

    #[test]
    fn separate_with_no_neighbors_is_zero() {
        assert_eq!(boid().separate(&[], 10.0), Vector2D::ZERO);
    }

    #[test]
    fn separate_ignores_distant_neighbors() {
        let far = [at(80.0, 50.0), at(50.0, 10.0)];
        assert_eq!(boid().separate(&far, 10.0), Vector2D::ZERO);
    }

    #[test]
    fn separate_points_away_and_is_limited() {
        let force = boid().separate(&[at(55.0, 50.0)], 10.0);
        assert!(force.x < 0.0);
        assert!(force.mag() <= 0.1 + 1e-12);
    }

    #[test]
    fn cohesion_points_at_centroid() {
        let b = Boid {
            velocity: Vector2D::ZERO,
            ..boid()
        };
        let force = b.cohesion(&[at(60.0, 40.0), at(60.0, 60.0)], 10.0);
        assert!(force.x > 0.0);
        assert!(force.y.abs() < 1e-12);
    }

    #[test]
    fn align_matches_neighbor_heading() {
        let b = Boid {
            velocity: Vector2D::ZERO,
            ..boid()
        };
        let mover = Neighbor {
            location: Vector2D::new(55.0, 50.0),
            velocity: Vector2D::new(0.0, 1.0),
        };
        let force = b.align(&[mover], 10.0);
        assert!(force.y > 0.0);
        assert!((force.mag() - 0.1).abs() < 1e-12);
    }
}
