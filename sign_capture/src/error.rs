use thiserror::Error;

use sign_dataset::StorageError;
use sign_model::ModelError;

#[derive(Debug, Error)]
pub enum AppError {
    /// The camera could not be opened.  Fatal, start-up only.
    #[error("camera {index} unavailable: {reason}")]
    DeviceUnavailable { index: u32, reason: String },

    /// No usable model for recognition mode.  Fatal, start-up only.
    #[error("model unavailable: {0}")]
    ModelUnavailable(#[from] ModelError),

    /// A dataset flush failed; the session stops.
    #[error("dataset write failed: {0}")]
    Storage(#[from] StorageError),

    /// The landmark detector could not start or answer.
    #[error("hand detector: {0}")]
    Detector(String),

    #[error("display: {0}")]
    Display(String),

    #[error("config: {0}")]
    Config(String),
}
