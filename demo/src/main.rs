use anyhow::Result;
use scalarnet::{accuracy, load_iris, mse, Activation, DenseLayer, Network};
use tracing::{info, Level};

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();

    xor_demo()?;

    // Pass a path to an Iris CSV to also train a small classifier on it.
    if let Some(path) = std::env::args().nth(1) {
        iris_demo(&path)?;
    }
    Ok(())
}

fn xor_demo() -> Result<()> {
    let data: Vec<(Vec<f64>, Vec<f64>)> = vec![
        (vec![0.0, 0.0], vec![0.0]),
        (vec![0.0, 1.0], vec![1.0]),
        (vec![1.0, 0.0], vec![1.0]),
        (vec![1.0, 1.0], vec![0.0]),
    ];
    let mut net = Network::new(vec![
        DenseLayer::new(2, 4, Activation::Sigmoid)?,
        DenseLayer::new(4, 1, Activation::Sigmoid)?,
    ])?;
    info!("training XOR on {}", net);
    let losses = net.fit(&data, 5_000, 1.0)?;
    info!("final epoch loss: {:.6}", losses[losses.len() - 1]);
    for (x, y) in &data {
        let z = net.predict(x)?;
        info!("{:?} -> {:.3} (expected {})", x, z[0], y[0]);
    }

    // weight round trip through the on-disk snapshot
    let path = std::env::temp_dir().join("scalarnet-demo.json.gz");
    net.save(&path)?;
    let mut reloaded = Network::load(&path)?;
    std::fs::remove_file(&path).ok();
    let mut total = 0.0;
    for (x, y) in &data {
        let z = reloaded.predict(x)?;
        total += mse(&z, y)?;
    }
    info!("reloaded model mean loss: {:.6}", total / data.len() as f64);
    Ok(())
}

fn iris_demo(path: &str) -> Result<()> {
    let dataset = load_iris(path)?;
    info!("loaded {} iris samples", dataset.len());
    let mut model = Network::new(vec![
        DenseLayer::new(4, 10, Activation::Sigmoid)?,
        DenseLayer::new(10, 3, Activation::Sigmoid)?,
    ])?;
    model.fit(&dataset, 200, 0.1)?;
    let acc = accuracy(&dataset, &mut model)?;
    info!("iris accuracy: {:.2}%", acc * 100.0);
    Ok(())
}
