use crate::dataset::FEATURE_COUNT;

/// Polynomial-expansion least squares: base features are standardised,
/// expanded into all monomials up to `degree`, and fitted by
/// ridge-stabilised normal equations. Closed-form and deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialRegressor {
    degree: usize,
    means: Vec<f64>,
    scales: Vec<f64>,
    /// `weights[0]` is the intercept; the rest follow the expansion order.
    weights: Vec<f64>,
}

impl PolynomialRegressor {
    /// Small diagonal load keeping the normal equations solvable when the
    /// expansion is wider than the training set.
    const RIDGE: f64 = 1e-6;

    pub(crate) fn fit(x: &[[f64; FEATURE_COUNT]], y: &[f64], degree: usize) -> Self {
        let n = x.len();

        let mut means = vec![0.0; FEATURE_COUNT];
        let mut scales = vec![1.0; FEATURE_COUNT];
        if n > 0 {
            for f in 0..FEATURE_COUNT {
                let mean = x.iter().map(|row| row[f]).sum::<f64>() / n as f64;
                let var = x.iter().map(|row| (row[f] - mean).powi(2)).sum::<f64>() / n as f64;
                means[f] = mean;
                let std = var.sqrt();
                if std > 1e-12 {
                    scales[f] = std;
                }
            }
        }

        let rows: Vec<Vec<f64>> = x
            .iter()
            .map(|row| expand(&standardize(row, &means, &scales), degree))
            .collect();
        let width = rows.first().map_or(0, Vec::len) + 1;

        // Normal equations over the design matrix [1 | expanded terms].
        let mut a = vec![vec![0.0; width]; width];
        let mut b = vec![0.0; width];
        for (row, &target) in rows.iter().zip(y) {
            let mut phi = Vec::with_capacity(width);
            phi.push(1.0);
            phi.extend_from_slice(row);
            for i in 0..width {
                b[i] += phi[i] * target;
                for j in 0..width {
                    a[i][j] += phi[i] * phi[j];
                }
            }
        }
        // The intercept is not penalised.
        for (i, row) in a.iter_mut().enumerate().skip(1) {
            row[i] += Self::RIDGE;
        }

        let weights = solve(a, b);

        Self {
            degree,
            means,
            scales,
            weights,
        }
    }

    pub fn predict(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
        let terms = expand(
            &standardize(features, &self.means, &self.scales),
            self.degree,
        );
        let mut value = self.weights.first().copied().unwrap_or(0.0);
        for (term, weight) in terms.iter().zip(self.weights.iter().skip(1)) {
            value += term * weight;
        }
        value
    }

    pub fn degree(&self) -> usize {
        self.degree
    }
}

fn standardize(
    features: &[f64; FEATURE_COUNT],
    means: &[f64],
    scales: &[f64],
) -> [f64; FEATURE_COUNT] {
    let mut z = [0.0; FEATURE_COUNT];
    for f in 0..FEATURE_COUNT {
        z[f] = (features[f] - means[f]) / scales[f];
    }
    z
}

/// All monomials of total degree 1..=degree over the base features, as
/// products over non-decreasing index sequences. The order is fixed by
/// construction, so fit and predict always agree.
fn expand(z: &[f64; FEATURE_COUNT], degree: usize) -> Vec<f64> {
    let mut terms = Vec::new();
    append_monomials(z, degree, 0, 1.0, &mut terms);
    terms
}

fn append_monomials(z: &[f64], depth_left: usize, start: usize, product: f64, out: &mut Vec<f64>) {
    if depth_left == 0 {
        return;
    }
    for i in start..z.len() {
        let p = product * z[i];
        out.push(p);
        append_monomials(z, depth_left - 1, i, p, out);
    }
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Vec<f64> {
    let n = b.len();

    for col in 0..n {
        let mut pivot = col;
        for row in col + 1..n {
            if a[row][col].abs() > a[pivot][col].abs() {
                pivot = row;
            }
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        let diag = a[col][col];
        if diag.abs() < 1e-12 {
            continue;
        }

        for row in col + 1..n {
            let factor = a[row][col] / diag;
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut solution = vec![0.0; n];
    for col in (0..n).rev() {
        let mut acc = b[col];
        for k in col + 1..n {
            acc -= a[col][k] * solution[k];
        }
        let diag = a[col][col];
        solution[col] = if diag.abs() < 1e-12 { 0.0 } else { acc / diag };
    }
    solution
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expansion_counts_match_degree() {
        let z = [1.0; FEATURE_COUNT];
        // 7 linear + 28 quadratic terms.
        assert_eq!(expand(&z, 2).len(), 35);
        // ... plus 84 cubic terms.
        assert_eq!(expand(&z, 3).len(), 119);
    }

    #[test]
    fn expansion_products_are_monomials() {
        let mut z = [0.0; FEATURE_COUNT];
        z[0] = 2.0;
        z[1] = 3.0;
        let terms = expand(&z, 2);
        // First terms are the linear ones in feature order.
        assert_eq!(terms[0], 2.0);
        // Term after z0's subtree start: z0*z0.
        assert_eq!(terms[1], 4.0);
        // z0*z1 follows immediately.
        assert_eq!(terms[2], 6.0);
    }

    #[test]
    fn recovers_a_linear_relationship() {
        let x: Vec<[f64; FEATURE_COUNT]> = (0..50)
            .map(|i| {
                let t = i as f64;
                [
                    50000.0 + 30.0 * (t * 0.9).sin(),
                    45000.0,
                    100.0 + t,
                    49800.0,
                    80.0,
                    44900.0,
                    0.5 + 0.01 * (t * 1.3).cos(),
                ]
            })
            .collect();
        let y: Vec<f64> = x.iter().map(|f| 0.5 * f[2] - 20.0 * f[6] + 7.0).collect();

        let model = PolynomialRegressor::fit(&x, &y, 2);
        for (features, &target) in x.iter().zip(&y) {
            assert!(
                (model.predict(features) - target).abs() < 0.05,
                "prediction drifted from {target}"
            );
        }
    }

    #[test]
    fn recovers_a_quadratic_relationship() {
        let x: Vec<[f64; FEATURE_COUNT]> = (0..60)
            .map(|i| {
                let t = i as f64 / 10.0;
                [
                    1.0 + t,
                    2.0,
                    3.0 + (t * 2.0).sin(),
                    4.0,
                    5.0,
                    6.0,
                    0.5 + 0.1 * t,
                ]
            })
            .collect();
        let y: Vec<f64> = x.iter().map(|f| f[0] * f[0] - 3.0 * f[0] + 2.0).collect();

        let model = PolynomialRegressor::fit(&x, &y, 2);
        for (features, &target) in x.iter().zip(&y) {
            assert!(
                (model.predict(features) - target).abs() < 0.05,
                "prediction drifted from {target}"
            );
        }
    }

    #[test]
    fn empty_training_set_predicts_zero() {
        let model = PolynomialRegressor::fit(&[], &[], 2);
        assert_eq!(model.predict(&[1.0; FEATURE_COUNT]), 0.0);
    }
}
