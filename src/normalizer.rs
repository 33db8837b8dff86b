//! Z-score standardization using training-time statistics

use crate::error::InferenceError;
use crate::features::FEATURE_COUNT;

/// Per-feature means of the training set, in `FEATURE_NAMES` order.
pub const FEATURE_MEANS: [f64; FEATURE_COUNT] = [
    69.6019002375, 0.4926365796, 0.6926365796, 1.3372921615, 27.2094927652, 0.2964370546,
    10.0404130324, 5.0166744480, 4.9129007701, 6.9966388434, 0.1458432304, 0.1064133017,
    0.1458432304, 0.1482185273, 0.2052256532, 0.0489311164, 133.7197149644, 90.2498812352,
    226.8608397688, 126.1478578621, 59.6703515413, 222.9404998224, 101.4153182771,
    15.0943135462, 4.9896941861, 0.4318289786, 0.2527315914, 0.2076009501, 0.1387173397,
    0.2950118765, 0.2451306413, 0.2969121140,
];

/// Per-feature standard deviations of the training set, in `FEATURE_NAMES` order.
pub const FEATURE_STDS: [f64; FEATURE_COUNT] = [
    11.5917570926, 0.4999457771, 1.0035887781, 0.8956274265, 7.2063865929, 0.4566860270,
    5.6856630658, 2.8902322474, 2.8714325356, 1.7526485611, 0.3529489801, 0.3083658718,
    0.3529489801, 0.3553164723, 0.4038664191, 0.2157240419, 26.4960592403, 17.0574349386,
    43.5790514713, 43.3967242979, 23.3653679312, 101.8716155319, 56.5780044593,
    8.6409606913, 2.9331797284, 0.4953309115, 0.4345783406, 0.4055894422, 0.3456513263,
    0.4560480997, 0.4301646313, 0.4568974837,
];

/// Immutable mean/std-dev pair for every feature position.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizationStatistics {
    means: [f64; FEATURE_COUNT],
    stds: [f64; FEATURE_COUNT],
}

impl NormalizationStatistics {
    /// Statistics the bundled model was trained with.
    pub const fn parkinsons() -> Self {
        Self {
            means: FEATURE_MEANS,
            stds: FEATURE_STDS,
        }
    }

    /// Build custom statistics, e.g. for a re-trained model.
    ///
    /// Every std dev must be finite and non-zero.
    pub fn new(means: &[f64], stds: &[f64]) -> Result<Self, InferenceError> {
        let means: [f64; FEATURE_COUNT] = means.try_into().map_err(|_| {
            InferenceError::InvalidStatistics(format!(
                "expected {} means, got {}",
                FEATURE_COUNT,
                means.len()
            ))
        })?;
        let stds: [f64; FEATURE_COUNT] = stds.try_into().map_err(|_| {
            InferenceError::InvalidStatistics(format!(
                "expected {} std devs, got {}",
                FEATURE_COUNT,
                stds.len()
            ))
        })?;

        if let Some(i) = stds.iter().position(|s| !s.is_finite() || *s == 0.0) {
            return Err(InferenceError::InvalidStatistics(format!(
                "std dev at position {} is {}",
                i, stds[i]
            )));
        }

        Ok(Self { means, stds })
    }

    pub fn means(&self) -> &[f64; FEATURE_COUNT] {
        &self.means
    }

    pub fn stds(&self) -> &[f64; FEATURE_COUNT] {
        &self.stds
    }

    /// Standardize a raw feature vector: `(raw[i] - mean[i]) / std[i]`.
    pub fn standardize(&self, raw: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if raw.len() != FEATURE_COUNT {
            return Err(InferenceError::InputShape {
                expected: FEATURE_COUNT,
                actual: raw.len(),
            });
        }

        Ok(raw
            .iter()
            .zip(self.means.iter().zip(self.stds.iter()))
            .map(|(value, (mean, std))| (value - mean) / std)
            .collect())
    }
}

impl Default for NormalizationStatistics {
    fn default() -> Self {
        Self::parkinsons()
    }
}
