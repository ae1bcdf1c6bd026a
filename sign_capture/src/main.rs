//! sign_capture: label hand poses and save them as dataset rows.

use env_logger::Env;
use sign_capture::capture::{self, SessionSummary};
use sign_capture::devices::open_devices;
use sign_capture::{AppConfig, AppError};
use sign_dataset::{CsvDatasetStore, StdinPrompt};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║            Sign Capture - Hand Landmark Recorder             ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "camera")]
    println!("  Mode: webcam + MediaPipe");
    #[cfg(not(feature = "camera"))]
    println!("  Mode: simulation  (use --features camera for a webcam)");
    println!();
    println!("  S    save the current hand");
    println!("  C    change label (type it here, in the terminal)");
    println!("  Esc  save pending samples and exit");
    println!();

    let cfg = AppConfig::load_or_default(&AppConfig::default_path());

    match run(&cfg) {
        Ok(summary) => {
            println!();
            println!("  Saved {} samples to {}", summary.samples, cfg.dataset_path.display());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(cfg: &AppConfig) -> Result<SessionSummary, AppError> {
    cfg.validate()?;
    let store = CsvDatasetStore::new(cfg.dataset_path.clone());
    let session = capture::start(cfg, store, Box::new(StdinPrompt), |c| open_devices(c, "Sign Capture"))?;
    session.run()
}
