use super::tree::{RegressionTree, TreeParams};
use crate::dataset::FEATURE_COUNT;

/// Stage-wise gradient boosting: shallow trees fitted to the running
/// residual, each contributing a fraction of its prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostedRegressor {
    baseline: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl BoostedRegressor {
    const STAGES: usize = 100;
    const LEARNING_RATE: f64 = 0.1;
    const PARAMS: TreeParams = TreeParams {
        max_depth: 3,
        min_samples_split: 2,
        min_samples_leaf: 1,
    };

    pub(crate) fn fit(x: &[[f64; FEATURE_COUNT]], y: &[f64]) -> Self {
        let n = x.len();
        if n == 0 {
            return Self {
                baseline: 0.0,
                learning_rate: Self::LEARNING_RATE,
                trees: Vec::new(),
            };
        }

        let baseline = y.iter().sum::<f64>() / n as f64;
        let mut residuals: Vec<f64> = y.iter().map(|&v| v - baseline).collect();
        let indices: Vec<usize> = (0..n).collect();

        let mut trees = Vec::with_capacity(Self::STAGES);
        for _ in 0..Self::STAGES {
            let tree = RegressionTree::fit(x, &residuals, &indices, Self::PARAMS);
            for (residual, features) in residuals.iter_mut().zip(x) {
                *residual -= Self::LEARNING_RATE * tree.predict(features);
            }
            trees.push(tree);
        }

        Self {
            baseline,
            learning_rate: Self::LEARNING_RATE,
            trees,
        }
    }

    pub fn predict(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
        self.baseline
            + self.learning_rate
                * self
                    .trees
                    .iter()
                    .map(|t| t.predict(features))
                    .sum::<f64>()
    }
}
