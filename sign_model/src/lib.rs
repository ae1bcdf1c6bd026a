//! # sign_model
//!
//! The classifier seam used by recognition mode, plus the one concrete model
//! this workspace ships: a nearest-centroid classifier stored as JSON.
//!
//! Recognition code depends only on [`GestureClassifier`]; anything that can
//! map a 63-float landmark vector to a label and a confidence plugs in.
//!
//! ```rust,no_run
//! use sign_model::{CentroidModel, GestureClassifier};
//! use sign_dataset::FEATURE_LEN;
//!
//! let model = CentroidModel::load("model.json").unwrap();
//! let p = model.classify(&[0.0; FEATURE_LEN]);
//! println!("{}", p);   // e.g. "A (95%)"
//! ```

use std::fmt;

use sign_dataset::FEATURE_LEN;

pub mod error;
pub mod centroid;
pub mod train;

pub use error::ModelError;
pub use centroid::{CentroidModel, ClassCentroid, MODEL_FORMAT_VERSION};
pub use train::{
    accuracy, fit_and_evaluate, holdout_split, TrainReport,
    DEFAULT_SEED, DEFAULT_TEST_FRACTION, MIN_RECOMMENDED_SAMPLES,
};

// ════════════════════════════════════════════════════════════════════════════
// GestureClassifier
// ════════════════════════════════════════════════════════════════════════════

/// A trained model, immutable for the life of a recognition session.
pub trait GestureClassifier {
    /// Most likely label for `features`.
    fn predict(&self, features: &[f32; FEATURE_LEN]) -> String;

    /// Confidence of [`predict`](Self::predict)'s answer, in `[0, 1]`.
    fn predict_confidence(&self, features: &[f32; FEATURE_LEN]) -> f32;

    fn classify(&self, features: &[f32; FEATURE_LEN]) -> Prediction {
        Prediction {
            label:      self.predict(features),
            confidence: self.predict_confidence(features).clamp(0.0, 1.0),
        }
    }
}

/// Label plus confidence.  Displays as `"A (95%)"`.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    pub label:      String,
    pub confidence: f32,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.0}%)", self.label, self.confidence * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl GestureClassifier for Fixed {
        fn predict(&self, _f: &[f32; FEATURE_LEN]) -> String { "B".to_string() }
        fn predict_confidence(&self, _f: &[f32; FEATURE_LEN]) -> f32 { 1.7 }
    }

    #[test]
    fn prediction_display_rounds_percent() {
        let p = Prediction { label: "A".to_string(), confidence: 0.954 };
        assert_eq!(p.to_string(), "A (95%)");
        let p = Prediction { label: "Q".to_string(), confidence: 0.0 };
        assert_eq!(p.to_string(), "Q (0%)");
    }

    #[test]
    fn classify_clamps_confidence() {
        let p = Fixed.classify(&[0.0; FEATURE_LEN]);
        assert_eq!(p.label, "B");
        assert_eq!(p.confidence, 1.0);
        assert_eq!(p.to_string(), "B (100%)");
    }
}
