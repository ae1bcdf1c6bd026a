//! Training helpers used by the `sign_train` binary.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use sign_dataset::Sample;

use crate::centroid::CentroidModel;
use crate::error::ModelError;
use crate::GestureClassifier;

/// Fraction of samples held out for evaluation.
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Seed for the shuffle, so repeated runs split identically.
pub const DEFAULT_SEED: u64 = 42;

/// Below this many samples the trainer warns that the model may not learn.
pub const MIN_RECOMMENDED_SAMPLES: usize = 100;

pub struct TrainReport {
    pub model:      CentroidModel,
    pub train_size: usize,
    pub test_size:  usize,
    /// `None` when nothing was held out.
    pub accuracy:   Option<f64>,
}

/// Shuffle with `seed` and split off `ceil(len * test_fraction)` samples.
pub fn holdout_split(samples: &[Sample], test_fraction: f64, seed: u64) -> (Vec<Sample>, Vec<Sample>) {
    let mut shuffled = samples.to_vec();
    shuffled.shuffle(&mut StdRng::seed_from_u64(seed));

    let frac = test_fraction.clamp(0.0, 1.0);
    let n_test = ((shuffled.len() as f64) * frac).ceil() as usize;
    // Keep at least one training sample.
    let n_test = n_test.min(shuffled.len().saturating_sub(1));

    let test = shuffled.split_off(shuffled.len() - n_test);
    (shuffled, test)
}

pub fn accuracy<C: GestureClassifier>(model: &C, samples: &[Sample]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let hits = samples
        .iter()
        .filter(|s| model.predict(&s.features) == s.label.as_str())
        .count();
    Some(hits as f64 / samples.len() as f64)
}

pub fn fit_and_evaluate(samples: &[Sample], test_fraction: f64, seed: u64) -> Result<TrainReport, ModelError> {
    if samples.is_empty() {
        return Err(ModelError::EmptyDataset);
    }
    let (train, test) = holdout_split(samples, test_fraction, seed);
    let model = CentroidModel::fit(&train)?;
    let accuracy = accuracy(&model, &test);

    Ok(TrainReport {
        model,
        train_size: train.len(),
        test_size:  test.len(),
        accuracy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sign_dataset::{Label, FEATURE_LEN};

    fn samples(n: usize) -> Vec<Sample> {
        (0..n)
            .map(|i| {
                let (v, l) = if i % 2 == 0 { (0.1, "A") } else { (0.9, "B") };
                Sample::new([v + (i as f32) * 1e-4; FEATURE_LEN], Label::parse(l).unwrap())
            })
            .collect()
    }

    #[test]
    fn split_sizes() {
        let (train, test) = holdout_split(&samples(50), 0.2, 42);
        assert_eq!(test.len(), 10);
        assert_eq!(train.len(), 40);
    }

    #[test]
    fn split_is_deterministic() {
        let data = samples(30);
        let (a, _) = holdout_split(&data, 0.2, 7);
        let (b, _) = holdout_split(&data, 0.2, 7);
        assert_eq!(a, b);
    }

    #[test]
    fn single_sample_stays_in_training() {
        let (train, test) = holdout_split(&samples(1), 0.2, 42);
        assert_eq!(train.len(), 1);
        assert!(test.is_empty());
    }

    #[test]
    fn separable_data_scores_perfectly() {
        let report = fit_and_evaluate(&samples(40), DEFAULT_TEST_FRACTION, DEFAULT_SEED).unwrap();
        assert_eq!(report.train_size + report.test_size, 40);
        assert_eq!(report.accuracy, Some(1.0));
    }
}
