//! Activation functions and their derivatives.
use serde::{Deserialize, Serialize};

/// Activation function applied to every unit of a dense layer.
///
/// Each variant carries a forward formula and its derivative. The derivative
/// takes the *output* of the forward pass rather than the raw input, so a
/// backward pass can reuse cached outputs instead of re-deriving the
/// pre-activation sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    /// `1 / (1 + e^-x)`
    Sigmoid,
    /// `max(x, 0)`
    Relu,
    /// `x` for positive input, `0.01 * x` otherwise.
    ///
    /// The derivative is evaluated on the sign of the output. For every
    /// nonzero input that sign equals the sign of the input; at exactly zero
    /// the negative-side slope `0.01` is returned.
    LeakyRelu,
    /// `ln(1 + e^x)`
    Softplus,
    /// Identity.
    Linear,
}

impl Activation {
    /// Applies the activation to a raw weighted sum.
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Sigmoid => sigmoid(x),
            Activation::Relu => x.max(0.0),
            Activation::LeakyRelu => {
                if x > 0.0 {
                    x
                } else {
                    0.01 * x
                }
            }
            // max(x, 0) + ln(1 + e^-|x|): the exponent is never positive, so
            // the intermediate exp cannot overflow
            Activation::Softplus => x.max(0.0) + (-x.abs()).exp().ln_1p(),
            Activation::Linear => x,
        }
    }

    /// Derivative at the point whose forward output was `y`.
    pub fn derivative(self, y: f64) -> f64 {
        match self {
            Activation::Sigmoid => y * (1.0 - y),
            Activation::Relu => {
                if y > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::LeakyRelu => {
                if y > 0.0 {
                    1.0
                } else {
                    0.01
                }
            }
            // softplus(x) = y implies sigmoid(x) = 1 - e^-y
            Activation::Softplus => 1.0 - (-y).exp(),
            Activation::Linear => 1.0,
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    // branch on the sign so the exponent is always non-positive
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! assert_approx_eq {
        ($a:expr, $b:expr) => {
            assert!(($a - $b).abs() < 1e-7, "{} != {}", $a, $b)
        };
    }

    #[test]
    fn sigmoid_values() {
        assert_eq!(Activation::Sigmoid.apply(0.0), 0.5);
        assert_approx_eq!(Activation::Sigmoid.apply(2.0), 0.8807970779778823);
        assert_eq!(Activation::Sigmoid.derivative(0.0), 0.0);
        // the formula y * (1 - y) applied literally, even outside [0, 1]
        assert_eq!(Activation::Sigmoid.derivative(2.0), -2.0);
    }

    #[test]
    fn sigmoid_extremes() {
        assert_eq!(Activation::Sigmoid.apply(-1000.0), 0.0);
        assert_eq!(Activation::Sigmoid.apply(1000.0), 1.0);
        assert!(Activation::Sigmoid.apply(-1e308).is_finite());
    }

    #[test]
    fn relu_values() {
        assert_eq!(Activation::Relu.apply(3.5), 3.5);
        assert_eq!(Activation::Relu.apply(-3.5), 0.0);
        assert_eq!(Activation::Relu.derivative(3.5), 1.0);
        assert_eq!(Activation::Relu.derivative(0.0), 0.0);
    }

    #[test]
    fn leaky_relu_values() {
        assert_eq!(Activation::LeakyRelu.apply(3.5), 3.5);
        assert_approx_eq!(Activation::LeakyRelu.apply(-3.5), -0.035);
        assert_eq!(Activation::LeakyRelu.derivative(3.5), 1.0);
        assert_eq!(Activation::LeakyRelu.derivative(-0.035), 0.01);
        assert_eq!(Activation::LeakyRelu.derivative(0.0), 0.01);
    }

    #[test]
    fn softplus_values() {
        assert_approx_eq!(Activation::Softplus.apply(0.0), 2.0_f64.ln());
        // large positive input approaches the identity without overflowing
        assert_approx_eq!(Activation::Softplus.apply(800.0), 800.0);
        assert!(Activation::Softplus.apply(-800.0) >= 0.0);
        // derivative recovered from the output equals sigmoid of the input
        let y = Activation::Softplus.apply(2.0);
        assert_approx_eq!(Activation::Softplus.derivative(y), 0.8807970779778823);
    }

    #[test]
    fn linear_values() {
        assert_eq!(Activation::Linear.apply(-7.25), -7.25);
        assert_eq!(Activation::Linear.derivative(-7.25), 1.0);
    }
}
