#[macro_use]
extern crate serde;

mod coefficients;
pub use coefficients::{CalibrationCoefficients, HrAffine, SpO2Affine};

mod dataset;
pub use dataset::{FEATURE_COUNT, LabeledSample};

mod error;
pub use error::CalibrateError;

mod model;
pub use model::{CalibrationModel, ValidRange};

mod regressor;
pub use regressor::{
    BoostedRegressor, ForestRegressor, PolynomialRegressor, RegressionTree, Regressor,
    RegressorKind,
};

mod trainer;
pub use trainer::{CalibrationTrainer, RegressionMetrics, TrainingOutcome};
