use rand::{Rng, SeedableRng, rngs::StdRng};

use super::tree::{RegressionTree, TreeParams};
use crate::dataset::FEATURE_COUNT;

/// Bootstrap-aggregated regression trees. Sampling comes from a seeded
/// generator, so a given (dataset, seed) pair always produces the same
/// forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestRegressor {
    trees: Vec<RegressionTree>,
}

impl ForestRegressor {
    const TREES: usize = 300;
    const PARAMS: TreeParams = TreeParams {
        max_depth: 16,
        min_samples_split: 2,
        min_samples_leaf: 1,
    };

    pub(crate) fn fit(x: &[[f64; FEATURE_COUNT]], y: &[f64], seed: u64) -> Self {
        let n = x.len();
        if n == 0 {
            return Self { trees: Vec::new() };
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let trees = (0..Self::TREES)
            .map(|_| {
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
                RegressionTree::fit(x, y, &bootstrap, Self::PARAMS)
            })
            .collect();

        Self { trees }
    }

    pub fn predict(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|t| t.predict(features)).sum::<f64>() / self.trees.len() as f64
    }
}
