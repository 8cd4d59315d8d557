//! Dense layer: flat weight buffer, forward pass, in-place SGD backward pass.
use crate::activations::Activation;
use crate::error::{Error, Result};
use rand::Rng;

/// Weight initialization policy for layers built without explicit weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Init {
    /// He et al. initialization: uniform over `±sqrt(2 / inputs)`. Suited to
    /// rectifying activations and the default here.
    #[default]
    HeUniform,
    /// Plain uniform over `[-1, 1]`.
    Uniform,
}

/// A fully-connected layer mapping `inputs` values to `units` values.
///
/// Weights are stored flat, one row per unit: `inputs` weight values followed
/// by a single bias slot when the bias is enabled (`units * (inputs + 1)`
/// values in total), or just the `inputs` weight values when it is not
/// (`units * inputs`). This row-major, trailing-bias layout is the interchange
/// format for externally trained weights.
///
/// The layer owns scratch buffers for its outputs and propagated errors,
/// sized once at construction and reused across calls. A single instance is
/// therefore not safe to share between concurrent callers without external
/// locking.
#[derive(Debug, Clone)]
pub struct DenseLayer {
    inputs: usize,
    units: usize,
    use_bias: bool,
    activation: Activation,
    weights: Vec<f64>,
    outputs: Vec<f64>,
    errors: Vec<f64>,
}

impl DenseLayer {
    /// Creates a layer with a bias column and He-uniform random weights.
    pub fn new(inputs: usize, units: usize, activation: Activation) -> Result<Self> {
        Self::with_init(inputs, units, activation, true, Init::default())
    }

    /// Creates a layer with the given bias setting and initialization policy.
    pub fn with_init(
        inputs: usize,
        units: usize,
        activation: Activation,
        use_bias: bool,
        init: Init,
    ) -> Result<Self> {
        check_dims(inputs, units)?;
        let range = match init {
            Init::HeUniform => (2.0 / inputs as f64).sqrt(),
            Init::Uniform => 1.0,
        };
        let len = units * (inputs + use_bias as usize);
        let mut rng = rand::thread_rng();
        let weights = (0..len).map(|_| rng.gen_range(-range..range)).collect();
        Ok(Self::assemble(inputs, units, use_bias, activation, weights))
    }

    /// Creates a layer from an explicit flat weight vector in the row-major,
    /// trailing-bias layout.
    pub fn with_weights(
        inputs: usize,
        units: usize,
        activation: Activation,
        use_bias: bool,
        weights: Vec<f64>,
    ) -> Result<Self> {
        check_dims(inputs, units)?;
        let expected = units * (inputs + use_bias as usize);
        if weights.len() != expected {
            return Err(Error::ShapeMismatch {
                what: "layer weights",
                expected,
                got: weights.len(),
            });
        }
        Ok(Self::assemble(inputs, units, use_bias, activation, weights))
    }

    fn assemble(
        inputs: usize,
        units: usize,
        use_bias: bool,
        activation: Activation,
        weights: Vec<f64>,
    ) -> Self {
        DenseLayer {
            inputs,
            units,
            use_bias,
            activation,
            weights,
            outputs: vec![0.0; units],
            errors: vec![0.0; inputs],
        }
    }

    /// Number of inputs this layer consumes.
    pub fn inputs(&self) -> usize {
        self.inputs
    }

    /// Number of units (outputs) in this layer.
    pub fn units(&self) -> usize {
        self.units
    }

    /// Whether a bias column is part of the weight buffer.
    pub fn use_bias(&self) -> bool {
        self.use_bias
    }

    /// The activation applied to every unit.
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// The flat weight buffer.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Replaces the flat weight buffer. The length must match the configured
    /// dimensions exactly.
    pub fn set_weights(&mut self, weights: Vec<f64>) -> Result<()> {
        if weights.len() != self.weights.len() {
            return Err(Error::ShapeMismatch {
                what: "layer weights",
                expected: self.weights.len(),
                got: weights.len(),
            });
        }
        self.weights = weights;
        Ok(())
    }

    // row stride in the flat buffer
    fn stride(&self) -> usize {
        self.inputs + self.use_bias as usize
    }

    /// Computes the layer outputs for `input`, writing into the cached output
    /// buffer and returning it. The buffer contents stay valid until the next
    /// `forward` call and are read again by [`DenseLayer::backward`].
    pub fn forward(&mut self, input: &[f64]) -> Result<&[f64]> {
        if input.len() != self.inputs {
            return Err(Error::ShapeMismatch {
                what: "layer input",
                expected: self.inputs,
                got: input.len(),
            });
        }
        let n = self.stride();
        for i in 0..self.units {
            let mut sum = 0.0;
            for j in 0..self.inputs {
                sum += input[j] * self.weights[i * n + j];
            }
            if self.use_bias {
                sum += self.weights[i * n + n - 1];
            }
            self.outputs[i] = self.activation.apply(sum);
        }
        Ok(&self.outputs)
    }

    /// Runs one backpropagation step through the layer.
    ///
    /// `input` must be the exact vector last passed to `forward`, and
    /// `upstream` holds the error signal (`target - actual` at the output
    /// layer) for each unit. The propagated error for the preceding layer is
    /// computed against the pre-update weights, then the weights and biases
    /// are adjusted in place by `rate` times the gradient. Returns the cached
    /// error buffer.
    pub fn backward(&mut self, input: &[f64], upstream: &[f64], rate: f64) -> Result<&[f64]> {
        if input.len() != self.inputs {
            return Err(Error::ShapeMismatch {
                what: "layer input",
                expected: self.inputs,
                got: input.len(),
            });
        }
        if upstream.len() != self.units {
            return Err(Error::ShapeMismatch {
                what: "upstream error",
                expected: self.units,
                got: upstream.len(),
            });
        }
        let n = self.stride();
        for j in 0..self.inputs {
            let mut sum = 0.0;
            for i in 0..self.units {
                sum += upstream[i]
                    * self.activation.derivative(self.outputs[i])
                    * self.weights[i * n + j];
            }
            self.errors[j] = sum;
        }
        for i in 0..self.units {
            let step = rate * upstream[i] * self.activation.derivative(self.outputs[i]);
            for j in 0..self.inputs {
                self.weights[i * n + j] += step * input[j];
            }
            if self.use_bias {
                self.weights[i * n + n - 1] += step;
            }
        }
        Ok(&self.errors)
    }
}

fn check_dims(inputs: usize, units: usize) -> Result<()> {
    if inputs == 0 || units == 0 {
        return Err(Error::InvalidConfig(format!(
            "layer dimensions must be positive, got {units} units with {inputs} inputs"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    macro_rules! assert_approx_eq {
        ($a:expr, $b:expr) => {
            assert!(($a - $b).abs() < 1e-4, "{} != {}", $a, $b)
        };
    }

    #[test]
    fn forward_reference_values() {
        let mut l = DenseLayer::with_weights(
            3,
            1,
            Activation::Sigmoid,
            true,
            vec![1.74481176, -0.7612069, 0.3190391, -0.24937038],
        )
        .unwrap();

        let z = l.forward(&[1.62434536, -0.52817175, 0.86540763]).unwrap();
        assert_approx_eq!(z[0], 0.96313579);

        let z = l.forward(&[-0.61175641, -1.07296862, -2.3015387]).unwrap();
        assert_approx_eq!(z[0], 0.22542973);
    }

    #[test]
    fn forward_without_bias() {
        // no bias column in the buffer at all
        let mut l =
            DenseLayer::with_weights(2, 1, Activation::Linear, false, vec![0.5, -1.5]).unwrap();
        assert_eq!(l.weights().len(), 2);
        let z = l.forward(&[2.0, 1.0]).unwrap();
        assert_approx_eq!(z[0], -0.5);
    }

    #[test]
    fn forward_rejects_wrong_input_length() {
        let mut l = DenseLayer::new(3, 2, Activation::Sigmoid).unwrap();
        assert!(matches!(
            l.forward(&[1.0, 2.0]),
            Err(Error::ShapeMismatch { expected: 3, got: 2, .. })
        ));
    }

    #[test]
    fn backward_rejects_wrong_error_length() {
        let mut l = DenseLayer::new(2, 2, Activation::Sigmoid).unwrap();
        l.forward(&[0.5, 0.5]).unwrap();
        assert!(l.backward(&[0.5, 0.5], &[1.0], 0.1).is_err());
    }

    #[test]
    fn set_weights_validates_length() {
        let mut l = DenseLayer::new(2, 2, Activation::Sigmoid).unwrap();
        assert!(l.set_weights(vec![0.0; 5]).is_err());
        assert!(l.set_weights(vec![0.0; 6]).is_ok());
        assert_eq!(l.weights(), &[0.0; 6]);
    }

    #[test]
    fn explicit_weights_validated() {
        assert!(DenseLayer::with_weights(2, 2, Activation::Sigmoid, true, vec![0.0; 4]).is_err());
        assert!(DenseLayer::with_weights(2, 2, Activation::Sigmoid, false, vec![0.0; 4]).is_ok());
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert!(DenseLayer::new(0, 2, Activation::Sigmoid).is_err());
        assert!(DenseLayer::new(2, 0, Activation::Sigmoid).is_err());
    }

    #[test]
    fn init_ranges() {
        let l = DenseLayer::with_init(8, 4, Activation::Relu, true, Init::HeUniform).unwrap();
        let bound = (2.0_f64 / 8.0).sqrt();
        assert!(l.weights().iter().all(|w| w.abs() <= bound));

        let l = DenseLayer::with_init(8, 4, Activation::Relu, true, Init::Uniform).unwrap();
        assert!(l.weights().iter().all(|w| w.abs() <= 1.0));
    }
}
