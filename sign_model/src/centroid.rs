//! Nearest-centroid classifier.
//!
//! Each label is summarised by the mean of its training vectors.  A query is
//! assigned to the closest mean (Euclidean), and the confidence is that
//! class's share of the inverse distances over all classes.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use sign_dataset::{Sample, FEATURE_LEN};

use crate::error::ModelError;
use crate::GestureClassifier;

pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassCentroid {
    pub label:    String,
    pub centroid: Vec<f32>,
    /// Training samples behind this mean.
    pub samples:  usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CentroidModel {
    pub format_version: u32,
    pub classes:        Vec<ClassCentroid>,
}

impl CentroidModel {
    /// Mean vector per label; classes come out sorted by label.
    pub fn fit(samples: &[Sample]) -> Result<Self, ModelError> {
        if samples.is_empty() {
            return Err(ModelError::EmptyDataset);
        }

        let mut sums: BTreeMap<&str, ([f64; FEATURE_LEN], usize)> = BTreeMap::new();
        for s in samples {
            let (sum, n) = sums.entry(s.label.as_str()).or_insert(([0.0; FEATURE_LEN], 0));
            for (acc, v) in sum.iter_mut().zip(s.features.iter()) {
                *acc += *v as f64;
            }
            *n += 1;
        }

        let classes = sums
            .into_iter()
            .map(|(label, (sum, n))| ClassCentroid {
                label:    label.to_string(),
                centroid: sum.iter().map(|v| (v / n as f64) as f32).collect(),
                samples:  n,
            })
            .collect();

        Ok(CentroidModel { format_version: MODEL_FORMAT_VERSION, classes })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|source| ModelError::Io { path: path.to_path_buf(), source })?;
        let model: CentroidModel = serde_json::from_str(&text)
            .map_err(|source| ModelError::Parse { path: path.to_path_buf(), source })?;
        model.validate()?;
        log::info!("loaded model {} ({} classes)", path.display(), model.classes.len());
        Ok(model)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        let io_err = |source| ModelError::Io { path: path.to_path_buf(), source };
        let json = serde_json::to_string_pretty(self)
            .map_err(|source| ModelError::Parse { path: path.to_path_buf(), source })?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        fs::write(path, json).map_err(io_err)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(ModelError::Invalid(format!(
                "unsupported format version {}", self.format_version
            )));
        }
        if self.classes.is_empty() {
            return Err(ModelError::Invalid("no classes".to_string()));
        }
        for c in &self.classes {
            if c.centroid.len() != FEATURE_LEN {
                return Err(ModelError::Invalid(format!(
                    "class {:?} has {} values, expected {}", c.label, c.centroid.len(), FEATURE_LEN
                )));
            }
            if c.centroid.iter().any(|v| !v.is_finite()) {
                return Err(ModelError::Invalid(format!("class {:?} has non-finite values", c.label)));
            }
        }
        Ok(())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|c| c.label.as_str())
    }

    fn distances(&self, features: &[f32; FEATURE_LEN]) -> Vec<f32> {
        self.classes
            .iter()
            .map(|c| {
                c.centroid
                    .iter()
                    .zip(features.iter())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f32>()
                    .sqrt()
            })
            .collect()
    }

    /// (index of nearest class, confidence)
    fn nearest(&self, features: &[f32; FEATURE_LEN]) -> (usize, f32) {
        let dists = self.distances(features);

        let best = dists
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(0);

        let exact = dists.iter().filter(|d| **d == 0.0).count();
        if exact > 0 {
            return (best, 1.0 / exact as f32);
        }

        let inv_total: f32 = dists.iter().map(|d| 1.0 / d).sum();
        let conf = (1.0 / dists[best]) / inv_total;
        (best, if conf.is_finite() { conf } else { 0.0 })
    }
}

impl GestureClassifier for CentroidModel {
    fn predict(&self, features: &[f32; FEATURE_LEN]) -> String {
        let (best, _) = self.nearest(features);
        self.classes.get(best).map(|c| c.label.clone()).unwrap_or_default()
    }

    fn predict_confidence(&self, features: &[f32; FEATURE_LEN]) -> f32 {
        self.nearest(features).1
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
