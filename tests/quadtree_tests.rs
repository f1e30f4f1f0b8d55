#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use ecosim::simulation::geometric_utils::{Shape, rect};
use ecosim::simulation::quadtree::QuadTree;
use ecosim::simulation::vector2d::Vector2D;
use proptest::prelude::*;

fn tree(capacity: usize) -> QuadTree<usize> {
    QuadTree::new(rect(0.0, 0.0, 100.0, 100.0), capacity, 10).unwrap()
}

fn points() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((0.0..100.0f64, 0.0..100.0f64), 0..300)
}

proptest! {
    #[test]
    fn test_count_is_independent_of_capacity(pts in points()) {
        let mut small = tree(1);
        let mut large = tree(1000);
        for (i, &(x, y)) in pts.iter().enumerate() {
            prop_assert!(small.insert(Vector2D::new(x, y), i));
            prop_assert!(large.insert(Vector2D::new(x, y), i));
        }
        prop_assert_eq!(small.len(), pts.len());
        prop_assert_eq!(large.len(), pts.len());
        prop_assert!(!large.is_divided() || pts.len() > 1000);

        let everything = Shape::Rect(rect(0.0, 0.0, 100.0, 100.0));
        let mut found = small.query(&everything);
        found.sort_unstable();
        prop_assert_eq!(found, (0..pts.len()).collect::<Vec<_>>());
        prop_assert_eq!(large.query(&everything).len(), pts.len());
    }

    #[test]
    fn test_circle_query_matches_brute_force(
        pts in points(),
        cx in 0.0..100.0f64,
        cy in 0.0..100.0f64,
        r in 0.0..60.0f64,
    ) {
        let mut qt = tree(2);
        for (i, &(x, y)) in pts.iter().enumerate() {
            qt.insert(Vector2D::new(x, y), i);
        }
        let center = Vector2D::new(cx, cy);
        let mut found = qt.query(&Shape::circle(center, r));
        found.sort_unstable();
        let expected: Vec<usize> = pts
            .iter()
            .enumerate()
            .filter(|&(_, &(x, y))| center.dist_sq(Vector2D::new(x, y)) <= r * r)
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn test_leaves_respect_capacity_below_max_depth(pts in points()) {
        let mut qt = tree(3);
        for (i, &(x, y)) in pts.iter().enumerate() {
            qt.insert(Vector2D::new(x, y), i);
        }
        prop_assert!(qt.max_leaf_occupancy() <= 3);
    }
}

#[test]
fn test_outside_points_are_rejected() {
    let mut qt = tree(4);
    assert!(!qt.insert(Vector2D::new(-0.1, 50.0), 0));
    assert!(!qt.insert(Vector2D::new(50.0, 100.0), 1));
    assert!(!qt.insert(Vector2D::new(100.0, 0.0), 2));
    assert!(qt.insert(Vector2D::new(0.0, 0.0), 3));
    assert_eq!(qt.len(), 1);

    assert_eq!(qt.query(&Shape::Rect(rect(0.0, 0.0, 100.0, 100.0))), vec![3]);
    assert_eq!(qt.query(&Shape::Rect(rect(-50.0, -50.0, 200.0, 200.0))), vec![3]);
    assert_eq!(qt.query(&Shape::circle(Vector2D::new(50.0, 50.0), 500.0)), vec![3]);
}

#[test]
fn test_identical_points_stop_at_max_depth() {
    let mut qt = QuadTree::new(rect(0.0, 0.0, 64.0, 64.0), 1, 3).unwrap();
    for i in 0..50 {
        assert!(qt.insert(Vector2D::new(10.0, 10.0), i));
    }
    assert_eq!(qt.len(), 50);
    assert_eq!(qt.query(&Shape::circle(Vector2D::new(10.0, 10.0), 0.0)).len(), 50);
}

#[test]
fn test_clear_and_capacity_change() {
    let mut qt = tree(1);
    for i in 0..10 {
        qt.insert(Vector2D::new(i as f64 * 9.0, i as f64 * 9.0), i);
    }
    assert!(qt.is_divided());
    qt.clear();
    assert!(qt.is_empty());
    assert!(!qt.is_divided());
    assert!(qt.set_capacity(0).is_err());
    assert!(qt.set_capacity(8).is_ok());
    assert_eq!(qt.capacity(), 8);
}
