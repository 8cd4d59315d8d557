//! A minimal feedforward neural network built from dense layers: scalar,
//! loop-based arithmetic with forward inference and backpropagation via plain
//! stochastic gradient descent.
//!
//! - Dense layers with a flat, row-major weight layout (trailing bias column)
//! - A closed family of activation functions with output-only derivatives
//! - Single-sample training steps and an epoch-driven `fit` loop
//! - Weight snapshots in an interchange layout external tooling can produce
//!
//! # Example
//!
//! ```
//! use scalarnet::{Activation, DenseLayer, Network};
//!
//! # fn main() -> scalarnet::Result<()> {
//! let mut net = Network::new(vec![
//!     DenseLayer::with_weights(2, 2, Activation::Sigmoid, true,
//!         vec![0.15, 0.2, 0.35, 0.25, 0.3, 0.35])?,
//!     DenseLayer::with_weights(2, 2, Activation::Sigmoid, true,
//!         vec![0.4, 0.45, 0.6, 0.5, 0.55, 0.6])?,
//! ])?;
//!
//! let out = net.predict(&[0.05, 0.1])?;
//! assert!((out[0] - 0.75136507).abs() < 1e-6);
//!
//! let loss = net.train(&[0.05, 0.1], &[0.01, 0.99], 0.5)?;
//! assert!(loss > 0.0);
//! # Ok(())
//! # }
//! ```

pub mod activations;
pub mod datasets;
pub mod error;
pub mod layers;
pub mod loss;
pub mod metrics;
pub mod network;

pub use activations::Activation;
pub use datasets::{generate_synthetic, load_iris, one_hot, Dataset};
pub use error::{Error, Result};
pub use layers::{DenseLayer, Init};
pub use loss::mse;
pub use metrics::{accuracy, confusion_matrix};
pub use network::Network;
