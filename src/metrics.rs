//! Metrics for evaluating trained networks.
use crate::error::{Error, Result};
use crate::network::Network;

fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .fold(0, |best, (i, &x)| if x > v[best] { i } else { best })
}

/// Fraction of samples whose highest-scoring output matches the one-hot
/// target class.
pub fn accuracy(dataset: &[(Vec<f64>, Vec<f64>)], network: &mut Network) -> Result<f64> {
    if dataset.is_empty() {
        return Err(Error::InvalidConfig("dataset is empty".into()));
    }
    let mut correct = 0usize;
    for (input, target) in dataset {
        let pred = network.predict(input)?;
        if argmax(&pred) == argmax(target) {
            correct += 1;
        }
    }
    Ok(correct as f64 / dataset.len() as f64)
}

/// Confusion matrix indexed as `[true class][predicted class]`, assuming
/// one-hot targets.
pub fn confusion_matrix(
    dataset: &[(Vec<f64>, Vec<f64>)],
    network: &mut Network,
    num_classes: usize,
) -> Result<Vec<Vec<usize>>> {
    let mut matrix = vec![vec![0usize; num_classes]; num_classes];
    for (input, target) in dataset {
        let pred = network.predict(input)?;
        let predicted = argmax(&pred);
        let actual = argmax(target);
        if predicted < num_classes && actual < num_classes {
            matrix[actual][predicted] += 1;
        }
    }
    Ok(matrix)
}
