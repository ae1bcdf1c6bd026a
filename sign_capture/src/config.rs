//! Application configuration.
//!
//! Built once at start-up and handed to the drivers; nothing reads
//! module-level settings after that.  Values come from `sign_capture.json`
//! in the working directory (or the file named by `SIGN_CAPTURE_CONFIG`)
//! when it exists, otherwise from [`AppConfig::default`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use sign_dataset::{FlushPolicy, Label, DEFAULT_FLUSH_THRESHOLD};

use crate::error::AppError;

pub const CONFIG_FILE: &str = "sign_capture.json";
pub const CONFIG_ENV:  &str = "SIGN_CAPTURE_CONFIG";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Camera device index (camera feature only).
    pub camera_index:             u32,
    pub dataset_path:             PathBuf,
    pub model_path:               PathBuf,
    /// Samples buffered before an automatic flush.
    pub flush_threshold:          usize,
    /// Label in effect when a capture session starts.
    pub default_label:            String,
    /// Window size; also the size of simulated frames.
    pub frame_width:              usize,
    pub frame_height:             usize,
    /// Program + args of the landmark helper process (camera feature only).
    pub detector_command:         Vec<String>,
    pub min_detection_confidence: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            camera_index:             0,
            dataset_path:             PathBuf::from("data/landmarks.csv"),
            model_path:               PathBuf::from("model.json"),
            flush_threshold:          DEFAULT_FLUSH_THRESHOLD,
            default_label:            "A".to_string(),
            frame_width:              640,
            frame_height:             480,
            detector_command:         vec!["python3".to_string(), "scripts/hand_detect.py".to_string()],
            min_detection_confidence: 0.5,
        }
    }
}

impl AppConfig {
    /// Config file path: `$SIGN_CAPTURE_CONFIG`, else `sign_capture.json`.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
    }

    /// Read `path` if it exists.  A missing file means defaults; an
    /// unreadable or unparsable one is reported and also means defaults.
    pub fn load_or_default(path: &Path) -> AppConfig {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(_) => {
                log::info!("no config at {}, using defaults", path.display());
                return AppConfig::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(cfg) => {
                log::info!("loaded config from {}", path.display());
                cfg
            }
            Err(e) => {
                log::warn!("failed to parse {}: {}, using defaults", path.display(), e);
                AppConfig::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.flush_policy()?;
        self.initial_label()?;
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(AppError::Config("frame size must be non-zero".to_string()));
        }
        if !(0.0..=1.0).contains(&self.min_detection_confidence) {
            return Err(AppError::Config(format!(
                "min_detection_confidence {} outside 0..=1", self.min_detection_confidence
            )));
        }
        Ok(())
    }

    pub fn flush_policy(&self) -> Result<FlushPolicy, AppError> {
        FlushPolicy::new(self.flush_threshold)
            .ok_or_else(|| AppError::Config("flush_threshold must be at least 1".to_string()))
    }

    pub fn initial_label(&self) -> Result<Label, AppError> {
        Label::parse(&self.default_label).ok_or_else(|| {
            AppError::Config(format!("default_label {:?} is not alphabetic", self.default_label))
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
