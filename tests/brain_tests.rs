#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use ecosim::simulation::brain::matrix::Matrix;
use ecosim::simulation::brain::{NeuralNetwork, Topology};
use ecosim::simulation::error::SimulationError;
use ecosim::simulation::organism::perception::{INPUT_SIZE, OUTPUT_SIZE};
use ecosim::simulation::species::SpeciesConfig;
use ndarray::Array2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn constant(rows: usize, cols: usize, value: f64) -> Matrix {
    Matrix::from_array(Array2::from_elem((rows, cols), value))
}

fn constant_network(topology: Topology, value: f64) -> NeuralNetwork {
    NeuralNetwork::from_parts(
        constant(topology.hidden, topology.input, value),
        constant(topology.output, topology.hidden, value),
        constant(topology.hidden, 1, value),
        constant(topology.output, 1, value),
    )
    .unwrap()
}

#[test]
fn test_default_brain_matches_perception() {
    let topology = SpeciesConfig::default().brain;
    assert_eq!(topology.input, INPUT_SIZE);
    assert_eq!(topology.output, OUTPUT_SIZE);
    let nn = NeuralNetwork::new(topology);
    let out = nn.predict(&[0.5; INPUT_SIZE]).unwrap();
    assert_eq!(out.len(), OUTPUT_SIZE);
}

#[test]
fn test_crossover_takes_every_weight_from_a_parent() {
    let topology = Topology {
        input: 4,
        hidden: 6,
        output: 3,
    };
    let a = constant_network(topology, 1.0);
    let b = constant_network(topology, -1.0);
    let mut rng = StdRng::seed_from_u64(5);
    let child = NeuralNetwork::crossover(&a, &b, &mut rng).unwrap();

    let weights = child.weights_ih.to_vec();
    assert!(weights.iter().all(|&w| w == 1.0 || w == -1.0));
    assert!(weights.contains(&1.0), "some weights come from the first parent");
    assert!(weights.contains(&-1.0), "some weights come from the second parent");
    assert_eq!(child.topology(), topology);
}

#[test]
fn test_crossover_rejects_other_topology() {
    let a = NeuralNetwork::new(Topology {
        input: 2,
        hidden: 2,
        output: 1,
    });
    let b = NeuralNetwork::new(Topology {
        input: 2,
        hidden: 3,
        output: 1,
    });
    let mut rng = StdRng::seed_from_u64(5);
    assert!(matches!(
        NeuralNetwork::crossover(&a, &b, &mut rng),
        Err(SimulationError::TopologyMismatch { .. })
    ));
}

#[test]
fn test_from_parts_rejects_inconsistent_shapes() {
    let result = NeuralNetwork::from_parts(
        constant(3, 2, 0.0),
        constant(1, 4, 0.0),
        constant(3, 1, 0.0),
        constant(1, 1, 0.0),
    );
    assert!(matches!(result, Err(SimulationError::ShapeMismatch { .. })));
}

#[test]
fn test_mult_rejects_mismatched_shapes() {
    let a = constant(2, 3, 1.0);
    let b = constant(2, 3, 1.0);
    assert!(a.mult(&b).is_err());
    let product = a.mult(&b.transpose()).unwrap();
    assert_eq!(product.shape(), (2, 2));
    assert!(product.to_vec().iter().all(|&v| v == 3.0));
}

#[test]
fn test_zero_weights_give_one_half() {
    let topology = Topology {
        input: 3,
        hidden: 2,
        output: 2,
    };
    let nn = constant_network(topology, 0.0);
    assert_eq!(nn.predict(&[9.0, -4.0, 1.0]).unwrap(), vec![0.5, 0.5]);
}

proptest! {
    #[test]
    fn test_predict_outputs_are_probabilities(
        input in prop::collection::vec(-100.0..100.0f64, INPUT_SIZE),
    ) {
        let nn = NeuralNetwork::new(SpeciesConfig::default().brain);
        let out = nn.predict(&input).unwrap();
        prop_assert!(out.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_ranged_mutation_is_bounded(seed in any::<u64>(), range in 0.0..2.0f64) {
        let topology = Topology { input: 3, hidden: 4, output: 2 };
        let mut nn = constant_network(topology, 0.0);
        let mut rng = StdRng::seed_from_u64(seed);
        nn.ranged_mutate(1.0, range, &mut rng);
        prop_assert!(nn.weights_ih.to_vec().iter().all(|w| w.abs() <= range + 1e-12));
        prop_assert!(nn.bias_o.to_vec().iter().all(|w| w.abs() <= range + 1e-12));
    }
}
