//! Dataset helpers: Iris CSV loading and synthetic data generation.
use crate::error::{Error, Result};
use csv::ReaderBuilder;
use rand::Rng;
use std::fs::File;
use std::path::Path;

/// Labelled samples as `(input, target)` pairs.
pub type Dataset = Vec<(Vec<f64>, Vec<f64>)>;

/// One-hot encodes a class label.
pub fn one_hot(label: usize, num_classes: usize) -> Vec<f64> {
    let mut v = vec![0.0; num_classes];
    if label < num_classes {
        v[label] = 1.0;
    }
    v
}

/// Loads the Iris dataset from a headered CSV with four feature columns and a
/// species column. Accepts both `setosa` and `Iris-setosa` style labels.
pub fn load_iris<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
    let mut dataset = Dataset::new();
    for record in reader.records() {
        let record = record?;
        if record.len() != 5 {
            continue;
        }
        let mut features = Vec::with_capacity(4);
        for field in record.iter().take(4) {
            let value = field.trim().parse::<f64>().map_err(|_| {
                Error::InvalidData(format!("bad feature value {:?}", field))
            })?;
            features.push(value);
        }
        let species = record[4].trim().trim_matches('"').to_ascii_lowercase();
        let label = match species.trim_start_matches("iris-") {
            "setosa" => 0,
            "versicolor" => 1,
            "virginica" => 2,
            other => {
                return Err(Error::InvalidData(format!("unknown species {other:?}")));
            }
        };
        dataset.push((features, one_hot(label, 3)));
    }
    if dataset.is_empty() {
        return Err(Error::InvalidData("no samples in iris csv".into()));
    }
    Ok(dataset)
}

/// Generates uniformly random `(input, target)` pairs for smoke testing.
pub fn generate_synthetic(n_samples: usize, input_size: usize, output_size: usize) -> Dataset {
    let mut rng = rand::thread_rng();
    (0..n_samples)
        .map(|_| {
            let input = (0..input_size).map(|_| rng.gen_range(-1.0..1.0)).collect();
            let target = (0..output_size).map(|_| rng.gen_range(-1.0..1.0)).collect();
            (input, target)
        })
        .collect()
}
