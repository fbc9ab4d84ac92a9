use std::cmp::Ordering;

use crate::dataset::FEATURE_COUNT;

#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

/// Variance-reduction regression tree shared by the forest and boosted
/// ensembles. Nodes are stored flat; index 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

impl RegressionTree {
    pub(crate) fn fit(
        x: &[[f64; FEATURE_COUNT]],
        y: &[f64],
        indices: &[usize],
        params: TreeParams,
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(x, y, indices, 0, params);
        tree
    }

    pub fn predict(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { value }) => return *value,
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    idx = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                None => return 0.0,
            }
        }
    }

    fn grow(
        &mut self,
        x: &[[f64; FEATURE_COUNT]],
        y: &[f64],
        indices: &[usize],
        depth: usize,
        params: TreeParams,
    ) -> usize {
        let mean = mean_of(y, indices);

        if depth >= params.max_depth || indices.len() < params.min_samples_split {
            return self.push_leaf(mean);
        }

        let Some((feature, threshold)) = best_split(x, y, indices, params.min_samples_leaf) else {
            return self.push_leaf(mean);
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| x[i][feature] <= threshold);

        let node = self.nodes.len();
        self.nodes.push(TreeNode::Leaf { value: mean });
        let left = self.grow(x, y, &left_idx, depth + 1, params);
        let right = self.grow(x, y, &right_idx, depth + 1, params);
        self.nodes[node] = TreeNode::Split {
            feature,
            threshold,
            left,
            right,
        };
        node
    }

    fn push_leaf(&mut self, value: f64) -> usize {
        self.nodes.push(TreeNode::Leaf { value });
        self.nodes.len() - 1
    }
}

fn mean_of(y: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
}

/// Exhaustive scan over features and boundary midpoints for the split
/// with the lowest child sum-of-squared-errors. Features are visited in
/// order and only strictly better splits replace the incumbent, so the
/// result is deterministic.
fn best_split(
    x: &[[f64; FEATURE_COUNT]],
    y: &[f64],
    indices: &[usize],
    min_leaf: usize,
) -> Option<(usize, f64)> {
    let n = indices.len();
    let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
    let parent_sse = total_sq - total_sum * total_sum / n as f64;

    let mut best_sse = parent_sse - 1e-12;
    let mut best = None;

    for feature in 0..FEATURE_COUNT {
        let mut order = indices.to_vec();
        order.sort_by(|&a, &b| {
            x[a][feature]
                .partial_cmp(&x[b][feature])
                .unwrap_or(Ordering::Equal)
        });

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;

        for (i, &row) in order[..n - 1].iter().enumerate() {
            left_sum += y[row];
            left_sq += y[row] * y[row];

            let left_n = i + 1;
            let right_n = n - left_n;
            if left_n < min_leaf || right_n < min_leaf {
                continue;
            }

            let here = x[row][feature];
            let next = x[order[i + 1]][feature];
            if next <= here {
                continue;
            }

            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / left_n as f64)
                + (right_sq - right_sum * right_sum / right_n as f64);

            if sse < best_sse {
                best_sse = sse;
                best = Some((feature, (here + next) / 2.0));
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: TreeParams = TreeParams {
        max_depth: 8,
        min_samples_split: 2,
        min_samples_leaf: 1,
    };

    fn row(v: f64) -> [f64; FEATURE_COUNT] {
        [v, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
    }

    #[test]
    fn constant_target_yields_single_leaf() {
        let x: Vec<_> = (0..10).map(|i| row(i as f64)).collect();
        let y = vec![5.0; 10];
        let indices: Vec<usize> = (0..10).collect();
        let tree = RegressionTree::fit(&x, &y, &indices, PARAMS);
        assert_eq!(tree.predict(&row(-100.0)), 5.0);
        assert_eq!(tree.predict(&row(100.0)), 5.0);
    }

    #[test]
    fn step_function_is_learned_exactly() {
        let x: Vec<_> = (0..20).map(|i| row(i as f64)).collect();
        let y: Vec<f64> = (0..20).map(|i| if i < 10 { 1.0 } else { 9.0 }).collect();
        let indices: Vec<usize> = (0..20).collect();
        let tree = RegressionTree::fit(&x, &y, &indices, PARAMS);
        assert_eq!(tree.predict(&row(3.0)), 1.0);
        assert_eq!(tree.predict(&row(15.0)), 9.0);
    }

    #[test]
    fn max_depth_zero_gives_the_mean() {
        let x: Vec<_> = (0..4).map(|i| row(i as f64)).collect();
        let y = vec![1.0, 2.0, 3.0, 4.0];
        let indices: Vec<usize> = (0..4).collect();
        let params = TreeParams {
            max_depth: 0,
            ..PARAMS
        };
        let tree = RegressionTree::fit(&x, &y, &indices, params);
        assert!((tree.predict(&row(0.0)) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn min_leaf_respected() {
        let x: Vec<_> = (0..6).map(|i| row(i as f64)).collect();
        let y = vec![1.0, 1.0, 1.0, 1.0, 1.0, 100.0];
        let indices: Vec<usize> = (0..6).collect();
        let params = TreeParams {
            max_depth: 1,
            min_samples_split: 2,
            min_samples_leaf: 3,
        };
        let tree = RegressionTree::fit(&x, &y, &indices, params);
        // The only admissible split is 3/3; the outlier cannot be isolated.
        let left = tree.predict(&row(0.0));
        let right = tree.predict(&row(5.0));
        assert!((left - 1.0).abs() < 1e-12);
        assert!((right - 34.0).abs() < 1e-12);
    }
}
