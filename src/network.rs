//! Network of dense layers: prediction, SGD training, and persistence.
use crate::activations::Activation;
use crate::error::{Error, Result};
use crate::layers::DenseLayer;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// An ordered pipeline of dense layers.
///
/// Prediction folds an input through the layers left to right; training runs
/// one backpropagation step right to left. Both reuse per-layer scratch
/// buffers, so a network instance must not be shared between concurrent
/// callers without external locking. Use one instance per worker, or hold a
/// lock for the duration of each call.
#[derive(Debug)]
pub struct Network {
    layers: Vec<DenseLayer>,
    // per-layer input cache filled during the forward half of train
    inputs: Vec<Vec<f64>>,
}

impl Network {
    /// Builds a network from layers ordered input to output.
    ///
    /// Fails on an empty layer list and on any adjacent pair whose unit and
    /// input counts disagree.
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self> {
        if layers.is_empty() {
            return Err(Error::InvalidConfig(
                "network needs at least one layer".into(),
            ));
        }
        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].units() != pair[1].inputs() {
                return Err(Error::InvalidConfig(format!(
                    "layer {} produces {} outputs but layer {} expects {} inputs",
                    i,
                    pair[0].units(),
                    i + 1,
                    pair[1].inputs()
                )));
            }
        }
        let inputs = layers.iter().map(|l| vec![0.0; l.inputs()]).collect();
        Ok(Network { layers, inputs })
    }

    /// Number of inputs consumed by the first layer.
    pub fn input_len(&self) -> usize {
        self.layers[0].inputs()
    }

    /// Number of outputs produced by the last layer.
    pub fn output_len(&self) -> usize {
        self.layers[self.layers.len() - 1].units()
    }

    /// The layers in pipeline order.
    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    /// Runs the input through every layer and returns the final output.
    pub fn predict(&mut self, x: &[f64]) -> Result<Vec<f64>> {
        let mut current = x.to_vec();
        for layer in &mut self.layers {
            current = layer.forward(&current)?.to_vec();
        }
        Ok(current)
    }

    /// Runs one SGD step for a single input/target pair and returns the mean
    /// squared error of the prediction made along the way.
    ///
    /// The forward pass caches the input each layer received; the backward
    /// pass then walks every layer in reverse, feeding each one its cached
    /// input and the error signal propagated so far. A learning rate of zero
    /// leaves all weights untouched.
    pub fn train(&mut self, x: &[f64], y: &[f64], rate: f64) -> Result<f64> {
        let out_len = self.output_len();
        if y.len() != out_len {
            return Err(Error::ShapeMismatch {
                what: "target",
                expected: out_len,
                got: y.len(),
            });
        }
        let mut current = x.to_vec();
        for (cache, layer) in self.inputs.iter_mut().zip(self.layers.iter_mut()) {
            cache.clear();
            cache.extend_from_slice(&current);
            current = layer.forward(&current)?.to_vec();
        }
        let mut loss = 0.0;
        let mut errors = Vec::with_capacity(y.len());
        for (yi, out) in y.iter().zip(&current) {
            let e = yi - out;
            loss += e * e;
            errors.push(e);
        }
        for (layer, cache) in self.layers.iter_mut().zip(self.inputs.iter()).rev() {
            errors = layer.backward(cache, &errors, rate)?.to_vec();
        }
        Ok(loss / y.len() as f64)
    }

    /// Trains over a dataset of `(input, target)` pairs for a number of
    /// epochs, one SGD step per sample in shuffled order. Returns the mean
    /// loss of each epoch.
    pub fn fit(
        &mut self,
        dataset: &[(Vec<f64>, Vec<f64>)],
        epochs: usize,
        rate: f64,
    ) -> Result<Vec<f64>> {
        if dataset.is_empty() {
            return Err(Error::InvalidConfig("dataset is empty".into()));
        }
        let mut rng = rand::thread_rng();
        let mut indices: Vec<usize> = (0..dataset.len()).collect();
        let mut losses = Vec::with_capacity(epochs);
        for epoch in 0..epochs {
            indices.shuffle(&mut rng);
            let mut total = 0.0;
            for &idx in &indices {
                let (input, target) = &dataset[idx];
                total += self.train(input, target, rate)?;
            }
            let avg = total / dataset.len() as f64;
            debug!(epoch = epoch + 1, loss = avg, "epoch complete");
            losses.push(avg);
        }
        Ok(losses)
    }

    /// Per-layer flat weight snapshots in the row-major, trailing-bias
    /// interchange layout.
    pub fn weights(&self) -> Vec<Vec<f64>> {
        self.layers.iter().map(|l| l.weights().to_vec()).collect()
    }

    /// Restores per-layer weights from a snapshot. Every layer's vector is
    /// length-validated before any of them is applied.
    pub fn set_weights(&mut self, weights: &[Vec<f64>]) -> Result<()> {
        if weights.len() != self.layers.len() {
            return Err(Error::ShapeMismatch {
                what: "weight snapshot",
                expected: self.layers.len(),
                got: weights.len(),
            });
        }
        for (layer, w) in self.layers.iter().zip(weights) {
            if w.len() != layer.weights().len() {
                return Err(Error::ShapeMismatch {
                    what: "layer weights",
                    expected: layer.weights().len(),
                    got: w.len(),
                });
            }
        }
        for (layer, w) in self.layers.iter_mut().zip(weights) {
            layer.set_weights(w.clone())?;
        }
        Ok(())
    }

    /// Saves layer shapes and weights as gzipped JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let dto = NetworkDto {
            layers: self
                .layers
                .iter()
                .map(|l| LayerDto {
                    inputs: l.inputs(),
                    units: l.units(),
                    use_bias: l.use_bias(),
                    activation: l.activation(),
                    weights: l.weights().to_vec(),
                })
                .collect(),
        };
        let json = serde_json::to_vec(&dto)?;
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        let mut enc = GzEncoder::new(file, Compression::default());
        enc.write_all(&json)?;
        enc.finish()?;
        Ok(())
    }

    /// Loads a network previously written by [`Network::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let mut dec = GzDecoder::new(file);
        let mut buf = Vec::new();
        dec.read_to_end(&mut buf)?;
        let dto: NetworkDto = serde_json::from_slice(&buf)?;
        let layers = dto
            .layers
            .into_iter()
            .map(|l| DenseLayer::with_weights(l.inputs, l.units, l.activation, l.use_bias, l.weights))
            .collect::<Result<Vec<_>>>()?;
        Network::new(layers)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sizes = vec![self.input_len()];
        sizes.extend(self.layers.iter().map(|l| l.units()));
        write!(f, "Network {sizes:?}")
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LayerDto {
    inputs: usize,
    units: usize,
    use_bias: bool,
    activation: Activation,
    weights: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NetworkDto {
    layers: Vec<LayerDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! assert_approx_eq {
        ($a:expr, $b:expr) => {
            assert!(($a - $b).abs() < 1e-4, "{} != {}", $a, $b)
        };
    }

    fn two_layer_sigmoid() -> Network {
        Network::new(vec![
            DenseLayer::with_weights(
                2,
                2,
                Activation::Sigmoid,
                true,
                vec![0.15, 0.2, 0.35, 0.25, 0.3, 0.35],
            )
            .unwrap(),
            DenseLayer::with_weights(
                2,
                2,
                Activation::Sigmoid,
                true,
                vec![0.4, 0.45, 0.6, 0.5, 0.55, 0.6],
            )
            .unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn predict_reference_values() {
        let mut n = two_layer_sigmoid();
        let z = n.predict(&[0.05, 0.1]).unwrap();
        assert_approx_eq!(z[0], 0.75136507);
        assert_approx_eq!(z[1], 0.772928465);
    }

    #[test]
    fn zero_rate_reports_loss_without_updating() {
        let mut n = two_layer_sigmoid();
        let before = n.weights();
        let e = n.train(&[0.05, 0.1], &[0.01, 0.99], 0.0).unwrap();
        assert_approx_eq!(e, 0.298371109);
        assert_eq!(n.weights(), before);
    }

    #[test]
    fn one_step_moves_weights_to_reference() {
        let mut n = two_layer_sigmoid();
        n.train(&[0.05, 0.1], &[0.01, 0.99], 0.5).unwrap();

        let expected_l2 = [0.35891, 0.40866, 0.53075, 0.5113, 0.5613, 0.61904];
        let expected_l1 = [0.14978, 0.19956, 0.34561, 0.24975, 0.2995, 0.34502];
        for (got, want) in n.layers()[1].weights().iter().zip(expected_l2) {
            assert!((got - want).abs() < 0.01, "{got} != {want}");
        }
        for (got, want) in n.layers()[0].weights().iter().zip(expected_l1) {
            assert!((got - want).abs() < 0.01, "{got} != {want}");
        }
    }

    #[test]
    fn backward_reaches_the_first_layer() {
        let mut n = two_layer_sigmoid();
        let before = n.layers()[0].weights().to_vec();
        n.train(&[0.05, 0.1], &[0.01, 0.99], 0.5).unwrap();
        assert_ne!(n.layers()[0].weights(), &before[..]);
    }

    #[test]
    fn empty_network_rejected() {
        assert!(Network::new(Vec::new()).is_err());
    }

    #[test]
    fn adjacency_mismatch_rejected() {
        let layers = vec![
            DenseLayer::new(2, 3, Activation::Sigmoid).unwrap(),
            DenseLayer::new(2, 1, Activation::Sigmoid).unwrap(),
        ];
        assert!(matches!(Network::new(layers), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn target_length_checked() {
        let mut n = two_layer_sigmoid();
        assert!(matches!(
            n.train(&[0.05, 0.1], &[0.01], 0.5),
            Err(Error::ShapeMismatch { expected: 2, got: 1, .. })
        ));
    }

    #[test]
    fn snapshot_roundtrip() {
        let mut n = two_layer_sigmoid();
        let snapshot = n.weights();
        n.train(&[0.05, 0.1], &[0.01, 0.99], 0.5).unwrap();
        n.set_weights(&snapshot).unwrap();
        assert_eq!(n.weights(), snapshot);

        let bad = vec![vec![0.0; 6], vec![0.0; 5]];
        assert!(n.set_weights(&bad).is_err());
        // nothing applied on failure
        assert_eq!(n.weights(), snapshot);
    }

    #[test]
    fn fit_rejects_empty_dataset() {
        let mut n = two_layer_sigmoid();
        assert!(n.fit(&[], 10, 0.5).is_err());
    }
}
