//! Query shapes and containment rules shared by the spatial index.
//!
//! Rectangles use half-open containment: the left and top edges belong to a
//! rectangle, the right and bottom edges do not. Adjacent quadrants therefore
//! never both claim a point.

use geo::{Intersects, Rect, coord};

use super::vector2d::Vector2D;

/// Builds a rectangle from its top-left corner and extent.
pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Rect<f64> {
    Rect::new(coord! { x: x, y: y }, coord! { x: x + width, y: y + height })
}

/// Half-open point containment for rectangles.
#[inline]
pub fn rect_contains(rect: &Rect<f64>, p: Vector2D) -> bool {
    let (min, max) = (rect.min(), rect.max());
    p.x >= min.x && p.x < max.x && p.y >= min.y && p.y < max.y
}

/// A region that can be used to query the quadtree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned rectangle.
    Rect(Rect<f64>),
    /// Disc, boundary included.
    Circle {
        /// Centre of the disc.
        center: Vector2D,
        /// Radius of the disc.
        radius: f64,
    },
}

impl Shape {
    /// Disc around `center`.
    pub fn circle(center: Vector2D, radius: f64) -> Self {
        Shape::Circle {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Exact point containment.
    pub fn contains(&self, p: Vector2D) -> bool {
        match *self {
            Shape::Rect(r) => rect_contains(&r, p),
            Shape::Circle { center, radius } => center.dist_sq(p) <= radius * radius,
        }
    }

    /// Conservative overlap test against a node boundary, used to prune
    /// subtrees before any exact containment check.
    pub fn intersects_rect(&self, boundary: &Rect<f64>) -> bool {
        match *self {
            Shape::Rect(r) => r.intersects(boundary),
            Shape::Circle { center, radius } => {
                let (min, max) = (boundary.min(), boundary.max());
                let nearest = Vector2D::new(
                    center.x.clamp(min.x, max.x),
                    center.y.clamp(min.y, max.y),
                );
                center.dist_sq(nearest) <= radius * radius
            }
        }
    }
}
