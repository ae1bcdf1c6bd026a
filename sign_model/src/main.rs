//! sign_train: fit a centroid model from the captured landmark dataset.
//!
//! Usage: `sign_train [DATASET_CSV] [MODEL_JSON]`
//! (defaults: `data/landmarks.csv`, `model.json`)

use std::path::{Path, PathBuf};

use env_logger::Env;
use sign_dataset::read_dataset;
use sign_model::{fit_and_evaluate, DEFAULT_SEED, DEFAULT_TEST_FRACTION, MIN_RECOMMENDED_SAMPLES};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let dataset = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("data/landmarks.csv"));
    let output  = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("model.json"));

    println!();
    println!("  === TRAINING ===");

    if let Err(e) = train(&dataset, &output) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn train(dataset: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let samples = read_dataset(dataset)?;
    println!("  Loaded {} samples from {}", samples.len(), dataset.display());
    if samples.len() < MIN_RECOMMENDED_SAMPLES {
        log::warn!(
            "only {} samples (< {}), the model may not learn well",
            samples.len(), MIN_RECOMMENDED_SAMPLES
        );
    }

    let report = fit_and_evaluate(&samples, DEFAULT_TEST_FRACTION, DEFAULT_SEED)?;
    println!("  Split: {} training, {} test", report.train_size, report.test_size);

    let labels: Vec<&str> = report.model.labels().collect();
    println!("  Classes: {}", labels.join(" "));

    match report.accuracy {
        Some(acc) => println!("  Test accuracy: {:.2}%", acc * 100.0),
        None      => println!("  Test accuracy: n/a (no samples held out)"),
    }

    report.model.save(output)?;
    println!("  Model saved to {}", output.display());
    Ok(())
}
