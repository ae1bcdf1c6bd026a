//! # sign_capture
//!
//! Webcam hand-sign tooling built on [`sign_dataset`] and [`sign_model`]:
//! a capture loop that labels hand poses and saves them to a CSV dataset,
//! and a recognition loop that classifies the live hand.
//!
//! ## Keys
//!
//! | Key | Capture mode | Recognition mode |
//! |---|---|---|
//! | `S` | Save the current hand under the active label | ignored |
//! | `C` | Ask for a new label in the terminal | ignored |
//! | `Esc` | Flush pending samples and exit | Exit |
//!
//! Samples are written every 10 captures (configurable) and once more on
//! exit.  A capture with no hand in view saves nothing.
//!
//! ## Feature flags
//!
//! * (default) **Simulation mode**: synthetic frames and a synthetic hand
//!   that comes and goes; the window and keys are real.
//! * `camera` **Hardware mode**: frames from a webcam via `nokhwa`,
//!   landmarks from a MediaPipe helper process (`scripts/hand_detect.py`).

pub mod config;
pub mod error;
pub mod frame;
pub mod detector;
pub mod visualizer;
pub mod devices;
pub mod capture;
pub mod recognize;

#[cfg(test)]
mod testing;

pub use config::AppConfig;
pub use error::AppError;
