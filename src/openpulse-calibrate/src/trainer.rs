use log::info;
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::dataset::{FEATURE_COUNT, LabeledSample, filter_valid};
use crate::error::CalibrateError;
use crate::regressor::{Regressor, RegressorKind};

/// Held-out scores for one fitted candidate. RMSE is the selection
/// metric; MAE and R² are reported alongside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionMetrics {
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

impl RegressionMetrics {
    fn from_predictions(truth: &[f64], predicted: &[f64]) -> Self {
        let n = truth.len() as f64;
        let sse: f64 = truth
            .iter()
            .zip(predicted)
            .map(|(t, p)| (t - p) * (t - p))
            .sum();
        let mae = truth
            .iter()
            .zip(predicted)
            .map(|(t, p)| (t - p).abs())
            .sum::<f64>()
            / n;

        let mean = truth.iter().sum::<f64>() / n;
        let ss_tot: f64 = truth.iter().map(|t| (t - mean) * (t - mean)).sum();
        let r2 = if ss_tot > 1e-12 {
            1.0 - sse / ss_tot
        } else if sse < 1e-12 {
            1.0
        } else {
            0.0
        };

        Self {
            rmse: (sse / n).sqrt(),
            mae,
            r2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: Regressor,
    pub kind: RegressorKind,
    pub metrics: RegressionMetrics,
}

/// Offline model selection: fit every candidate on a reproducible train
/// partition, score on the held-out partition, keep the lowest RMSE.
/// Invoked once per target parameter; winners may differ between targets.
#[derive(Debug, Clone)]
pub struct CalibrationTrainer {
    candidates: Vec<RegressorKind>,
    holdout_fraction: f64,
    seed: u64,
    min_samples: usize,
}

impl Default for CalibrationTrainer {
    fn default() -> Self {
        Self {
            candidates: RegressorKind::ALL.to_vec(),
            holdout_fraction: 0.2,
            seed: 42,
            min_samples: Self::MIN_SAMPLES,
        }
    }
}

impl CalibrationTrainer {
    /// Fewer usable rows than this cannot support a meaningful holdout.
    pub const MIN_SAMPLES: usize = 30;

    pub fn new(candidates: Vec<RegressorKind>) -> Self {
        Self {
            candidates,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn fit(&self, dataset: &[LabeledSample]) -> Result<TrainingOutcome, CalibrateError> {
        let usable = filter_valid(dataset);
        info!(
            "training on {} of {} rows after validity filtering",
            usable.len(),
            dataset.len()
        );

        if usable.len() < self.min_samples {
            return Err(CalibrateError::InsufficientData {
                available: usable.len(),
                required: self.min_samples,
            });
        }

        let (train, holdout) = self.partition(&usable);
        let train_x: Vec<[f64; FEATURE_COUNT]> = train.iter().map(|s| s.features).collect();
        let train_y: Vec<f64> = train.iter().map(|s| s.target).collect();
        let holdout_y: Vec<f64> = holdout.iter().map(|s| s.target).collect();

        let mut best: Option<TrainingOutcome> = None;
        for &kind in &self.candidates {
            // Each candidate fits as one atomic unit.
            let model = Regressor::fit(kind, &train_x, &train_y, self.seed);
            let predicted: Vec<f64> = holdout.iter().map(|s| model.predict(&s.features)).collect();
            let metrics = RegressionMetrics::from_predictions(&holdout_y, &predicted);
            info!(
                "{kind}: RMSE={:.2} MAE={:.2} R2={:.3}",
                metrics.rmse, metrics.mae, metrics.r2
            );

            // Strict `<` keeps the first-declared candidate on ties.
            if best
                .as_ref()
                .is_none_or(|incumbent| metrics.rmse < incumbent.metrics.rmse)
            {
                best = Some(TrainingOutcome {
                    model,
                    kind,
                    metrics,
                });
            }
        }

        best.ok_or(CalibrateError::NoCandidates)
    }

    /// Seeded shuffle then split; the same seed always yields the same
    /// partition.
    fn partition(&self, usable: &[LabeledSample]) -> (Vec<LabeledSample>, Vec<LabeledSample>) {
        let mut order: Vec<usize> = (0..usable.len()).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        order.shuffle(&mut rng);

        let holdout_len = ((usable.len() as f64 * self.holdout_fraction).round() as usize)
            .clamp(1, usable.len() - 1);
        let (holdout_idx, train_idx) = order.split_at(holdout_len);

        (
            train_idx.iter().map(|&i| usable[i]).collect(),
            holdout_idx.iter().map(|&i| usable[i]).collect(),
        )
    }
}
