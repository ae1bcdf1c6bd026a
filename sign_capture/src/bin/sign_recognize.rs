//! sign_recognize: classify the live hand with a trained model.

use env_logger::Env;
use sign_capture::devices::open_devices;
use sign_capture::recognize;
use sign_capture::{AppConfig, AppError};
use sign_model::CentroidModel;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              Sign Recognize - Live Classifier                ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("  Esc  exit");
    println!();

    let cfg = AppConfig::load_or_default(&AppConfig::default_path());

    if let Err(e) = run(&cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cfg: &AppConfig) -> Result<(), AppError> {
    cfg.validate()?;
    let recognizer = recognize::start(cfg, |p| CentroidModel::load(p), |c| open_devices(c, "Sign Recognize"))?;
    recognizer.run();
    Ok(())
}
