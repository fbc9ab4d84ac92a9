use std::fmt;

use crate::dataset::FEATURE_COUNT;

mod tree;
pub use tree::RegressionTree;
pub(crate) use tree::TreeParams;

mod poly;
pub use poly::PolynomialRegressor;

mod forest;
pub use forest::ForestRegressor;

mod boost;
pub use boost::BoostedRegressor;

/// Candidate regression families, in declaration order. The trainer
/// breaks RMSE ties in favour of the earlier entry, so the order is part
/// of the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegressorKind {
    Poly2,
    Poly3,
    Forest,
    Boosted,
}

impl RegressorKind {
    pub const ALL: [RegressorKind; 4] = [
        RegressorKind::Poly2,
        RegressorKind::Poly3,
        RegressorKind::Forest,
        RegressorKind::Boosted,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Poly2 => "poly2",
            Self::Poly3 => "poly3",
            Self::Forest => "forest",
            Self::Boosted => "boosted",
        }
    }
}

impl fmt::Display for RegressorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A fitted regressor. The candidate set is closed and known at design
/// time, so the families live in one tagged union rather than behind a
/// trait object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Regressor {
    Polynomial(PolynomialRegressor),
    Forest(ForestRegressor),
    Boosted(BoostedRegressor),
}

impl Regressor {
    /// Fits one candidate family. `seed` drives the bootstrap sampling of
    /// the tree ensembles; the polynomial fit is closed-form and ignores
    /// it. Fitting runs to completion as one atomic unit.
    pub fn fit(kind: RegressorKind, x: &[[f64; FEATURE_COUNT]], y: &[f64], seed: u64) -> Self {
        match kind {
            RegressorKind::Poly2 => Self::Polynomial(PolynomialRegressor::fit(x, y, 2)),
            RegressorKind::Poly3 => Self::Polynomial(PolynomialRegressor::fit(x, y, 3)),
            RegressorKind::Forest => Self::Forest(ForestRegressor::fit(x, y, seed)),
            RegressorKind::Boosted => Self::Boosted(BoostedRegressor::fit(x, y)),
        }
    }

    pub fn predict(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
        match self {
            Self::Polynomial(model) => model.predict(features),
            Self::Forest(model) => model.predict(features),
            Self::Boosted(model) => model.predict(features),
        }
    }

    pub fn kind(&self) -> RegressorKind {
        match self {
            Self::Polynomial(model) if model.degree() <= 2 => RegressorKind::Poly2,
            Self::Polynomial(_) => RegressorKind::Poly3,
            Self::Forest(_) => RegressorKind::Forest,
            Self::Boosted(_) => RegressorKind::Boosted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_rows(n: usize) -> (Vec<[f64; FEATURE_COUNT]>, Vec<f64>) {
        let x: Vec<[f64; FEATURE_COUNT]> = (0..n)
            .map(|i| {
                let t = i as f64;
                [
                    50000.0 + 100.0 * (t * 0.7).sin(),
                    45000.0 + 90.0 * (t * 0.4).cos(),
                    120.0 + t,
                    49800.0,
                    80.0 + 0.5 * t,
                    44900.0,
                    0.5 + 0.01 * t,
                ]
            })
            .collect();
        let y: Vec<f64> = x.iter().map(|f| 0.002 * f[2] + 40.0 * f[6]).collect();
        (x, y)
    }

    #[test]
    fn fit_maps_kind_to_family() {
        let (x, y) = make_rows(40);
        for kind in RegressorKind::ALL {
            let model = Regressor::fit(kind, &x, &y, 42);
            assert_eq!(model.kind(), kind);
        }
    }

    #[test]
    fn labels_match_original_names() {
        assert_eq!(RegressorKind::Poly2.to_string(), "poly2");
        assert_eq!(RegressorKind::Poly3.to_string(), "poly3");
        assert_eq!(RegressorKind::Forest.to_string(), "forest");
        assert_eq!(RegressorKind::Boosted.to_string(), "boosted");
    }

    #[test]
    fn fitted_models_survive_serialization() {
        let (x, y) = make_rows(40);
        let model = Regressor::fit(RegressorKind::Boosted, &x, &y, 42);
        let json = serde_json::to_string(&model).unwrap();
        let restored: Regressor = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, model);
        assert_eq!(restored.predict(&x[3]), model.predict(&x[3]));
    }
}
