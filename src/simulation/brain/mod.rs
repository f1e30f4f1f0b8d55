//! Feed-forward neural network used as an animal's decision function.
//!
//! The network has a fixed input → hidden → output topology with sigmoid
//! activations. During the simulation it is only ever evaluated, crossed over
//! and mutated; [`NeuralNetwork::train`] exists for offline use.

pub mod matrix;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::simulation::error::{Result, SimulationError};
use matrix::Matrix;

/// Logistic activation.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Derivative of [`sigmoid`], expressed through its output `y = sigmoid(x)`.
#[inline]
fn dsigmoid(y: f64) -> f64 {
    y * (1.0 - y)
}

/// Input, hidden and output node counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// Number of input nodes.
    pub input: usize,
    /// Number of hidden nodes.
    pub hidden: usize,
    /// Number of output nodes.
    pub output: usize,
}

impl Topology {
    fn as_tuple(self) -> (usize, usize, usize) {
        (self.input, self.hidden, self.output)
    }
}

/// A two-layer perceptron.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuralNetwork {
    topology: Topology,
    /// Input to hidden weights (`hidden x input`).
    pub weights_ih: Matrix,
    /// Hidden to output weights (`output x hidden`).
    pub weights_ho: Matrix,
    /// Hidden layer bias (`hidden x 1`).
    pub bias_h: Matrix,
    /// Output layer bias (`output x 1`).
    pub bias_o: Matrix,
    /// Step size used by [`NeuralNetwork::train`].
    pub learning_rate: f64,
}

impl NeuralNetwork {
    /// Creates a network with weights and biases uniform in `[-1, 1)`.
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            weights_ih: Matrix::random(topology.hidden, topology.input, 1.0),
            weights_ho: Matrix::random(topology.output, topology.hidden, 1.0),
            bias_h: Matrix::random(topology.hidden, 1, 1.0),
            bias_o: Matrix::random(topology.output, 1, 1.0),
            learning_rate: 0.1,
        }
    }

    /// Assembles a network from explicit parameters, validating every shape.
    pub fn from_parts(
        weights_ih: Matrix,
        weights_ho: Matrix,
        bias_h: Matrix,
        bias_o: Matrix,
    ) -> Result<Self> {
        let topology = Topology {
            input: weights_ih.cols(),
            hidden: weights_ih.rows(),
            output: weights_ho.rows(),
        };
        let checks = [
            ("weights_ho", weights_ho.shape(), (topology.output, topology.hidden)),
            ("bias_h", bias_h.shape(), (topology.hidden, 1)),
            ("bias_o", bias_o.shape(), (topology.output, 1)),
        ];
        for (op, actual, expected) in checks {
            if actual != expected {
                return Err(SimulationError::ShapeMismatch {
                    op,
                    left: actual,
                    right: expected,
                });
            }
        }
        Ok(Self {
            topology,
            weights_ih,
            weights_ho,
            bias_h,
            bias_o,
            learning_rate: 0.1,
        })
    }

    /// Layer sizes of this network.
    pub fn topology(&self) -> Topology {
        self.topology
    }

    fn check_len(expected: usize, values: &[f64]) -> Result<()> {
        if values.len() == expected {
            Ok(())
        } else {
            Err(SimulationError::InputLength {
                expected,
                actual: values.len(),
            })
        }
    }

    fn forward(&self, inputs: &Matrix) -> Result<(Matrix, Matrix)> {
        let hidden = self
            .weights_ih
            .mult(inputs)?
            .add(&self.bias_h)?
            .map(sigmoid);
        let output = self
            .weights_ho
            .mult(&hidden)?
            .add(&self.bias_o)?
            .map(sigmoid);
        Ok((hidden, output))
    }

    /// One forward pass. Pure: identical weights and input give identical output.
    pub fn predict(&self, input: &[f64]) -> Result<Vec<f64>> {
        Self::check_len(self.topology.input, input)?;
        let (_, output) = self.forward(&Matrix::from_column(input))?;
        Ok(output.to_vec())
    }

    /// One step of backpropagation towards `target`.
    pub fn train(&mut self, input: &[f64], target: &[f64]) -> Result<()> {
        Self::check_len(self.topology.input, input)?;
        Self::check_len(self.topology.output, target)?;

        let inputs = Matrix::from_column(input);
        let (hidden, outputs) = self.forward(&inputs)?;

        let output_errors = Matrix::from_column(target).sub(&outputs)?;
        let gradients = outputs
            .map(dsigmoid)
            .hadamard(&output_errors)?
            .scale(self.learning_rate);
        let hidden_errors = self.weights_ho.transpose().mult(&output_errors)?;
        self.weights_ho
            .add_assign(&gradients.mult(&hidden.transpose())?)?;
        self.bias_o.add_assign(&gradients)?;

        let hidden_gradients = hidden
            .map(dsigmoid)
            .hadamard(&hidden_errors)?
            .scale(self.learning_rate);
        self.weights_ih
            .add_assign(&hidden_gradients.mult(&inputs.transpose())?)?;
        self.bias_h.add_assign(&hidden_gradients)?;
        Ok(())
    }

    /// Child network picking each weight and bias from either parent.
    pub fn crossover<R: Rng>(a: &Self, b: &Self, rng: &mut R) -> Result<Self> {
        if a.topology != b.topology {
            return Err(SimulationError::TopologyMismatch {
                left: a.topology.as_tuple(),
                right: b.topology.as_tuple(),
            });
        }
        Ok(Self {
            topology: a.topology,
            weights_ih: Matrix::crossover(&a.weights_ih, &b.weights_ih, rng)?,
            weights_ho: Matrix::crossover(&a.weights_ho, &b.weights_ho, rng)?,
            bias_h: Matrix::crossover(&a.bias_h, &b.bias_h, rng)?,
            bias_o: Matrix::crossover(&a.bias_o, &b.bias_o, rng)?,
            learning_rate: a.learning_rate,
        })
    }

    /// Additive mutation of every parameter.
    pub fn ranged_mutate<R: Rng>(&mut self, chance: f64, range: f64, rng: &mut R) {
        for m in self.parameters_mut() {
            m.ranged_mutate(chance, range, rng);
        }
    }

    /// Multiplicative mutation of every parameter.
    pub fn percentage_mutate<R: Rng>(&mut self, chance: f64, percent: f64, rng: &mut R) {
        for m in self.parameters_mut() {
            m.percentage_mutate(chance, percent, rng);
        }
    }

    fn parameters_mut(&mut self) -> [&mut Matrix; 4] {
        [
            &mut self.weights_ih,
            &mut self.weights_ho,
            &mut self.bias_h,
            &mut self.bias_o,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const SMALL: Topology = Topology {
        input: 3,
        hidden: 5,
        output: 2,
    };

    #[test]
    fn predict_is_pure_and_bounded() {
        let nn = NeuralNetwork::new(SMALL);
        let a = nn.predict(&[0.1, -0.5, 2.0]).unwrap();
        let b = nn.predict(&[0.1, -0.5, 2.0]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert!(a.iter().all(|&v| v > 0.0 && v < 1.0));
    }

    #[test]
    fn predict_rejects_wrong_input_length() {
        let nn = NeuralNetwork::new(SMALL);
        assert!(matches!(
            nn.predict(&[1.0]),
            Err(SimulationError::InputLength {
                expected: 3,
                actual: 1
            })
        ));
    }

    #[test]
    fn training_reduces_error() {
        let mut nn = NeuralNetwork::new(SMALL);
        nn.learning_rate = 0.5;
        let input = [1.0, 0.0, 1.0];
        let target = [0.9, 0.1];
        let error = |nn: &NeuralNetwork| {
            let out = nn.predict(&input).unwrap();
            out.iter()
                .zip(target)
                .map(|(o, t)| (o - t).powi(2))
                .sum::<f64>()
        };
        let before = error(&nn);
        for _ in 0..500 {
            nn.train(&input, &target).unwrap();
        }
        assert!(error(&nn) < before);
    }

    #[test]
    fn crossover_requires_matching_topology() {
        let mut rng = StdRng::seed_from_u64(11);
        let a = NeuralNetwork::new(SMALL);
        let b = NeuralNetwork::new(Topology { hidden: 4, ..SMALL });
        assert!(NeuralNetwork::crossover(&a, &b, &mut rng).is_err());
        let child = NeuralNetwork::crossover(&a, &a.clone(), &mut rng).unwrap();
        assert_eq!(child, a);
    }

    #[test]
    fn from_parts_validates_biases() {
        let result = NeuralNetwork::from_parts(
            Matrix::zeros(4, 2),
            Matrix::zeros(1, 4),
            Matrix::zeros(3, 1),
            Matrix::zeros(1, 1),
        );
        assert!(result.is_err());
    }
}
