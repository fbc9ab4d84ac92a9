use crate::dataset::FEATURE_COUNT;
use crate::regressor::Regressor;

/// Inclusive physiological bounds applied after every prediction. Raw
/// model output can wander far outside sensor reality under noise; the
/// clamp is the terminal step of every predict path and is never
/// bypassed. The 70 % saturation floor in particular is a deliberate
/// safety clamp, not a modelling artefact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidRange {
    pub min: f64,
    pub max: f64,
}

impl ValidRange {
    pub const HEART_RATE: ValidRange = ValidRange {
        min: 0.0,
        max: 200.0,
    };
    pub const SPO2: ValidRange = ValidRange {
        min: 70.0,
        max: 100.0,
    };

    pub fn clamp(self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum ModelForm {
    /// Per-device linear correction on a single designated scalar
    /// (the peak rate for heart rate, the ratio-of-ratios for SpO2).
    Affine { slope: f64, intercept: f64 },
    /// A trained regressor consuming the full feature vector.
    Fitted(Regressor),
}

/// Calibrated mapping from extracted features to a physiological value.
/// Deterministic, side-effect-free, and safe to share across workers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationModel {
    form: ModelForm,
    range: ValidRange,
}

impl CalibrationModel {
    pub fn affine(slope: f64, intercept: f64, range: ValidRange) -> Self {
        Self {
            form: ModelForm::Affine { slope, intercept },
            range,
        }
    }

    pub fn fitted(regressor: Regressor, range: ValidRange) -> Self {
        Self {
            form: ModelForm::Fitted(regressor),
            range,
        }
    }

    pub fn range(&self) -> ValidRange {
        self.range
    }

    /// Maps one window's features to a calibrated value. `raw_value` is
    /// the designated scalar consumed by the affine form; fitted models
    /// use the full feature vector.
    pub fn predict(&self, raw_value: f64, features: &[f64; FEATURE_COUNT]) -> f64 {
        let value = match &self.form {
            ModelForm::Affine { slope, intercept } => slope * raw_value + intercept,
            ModelForm::Fitted(regressor) => regressor.predict(features),
        };
        self.range.clamp(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regressor::RegressorKind;

    const FEATURES: [f64; FEATURE_COUNT] =
        [50000.0, 45000.0, 120.0, 49800.0, 80.0, 44900.0, 0.74];

    #[test]
    fn affine_maps_the_raw_value() {
        let model = CalibrationModel::affine(1.1, -2.0, ValidRange::HEART_RATE);
        let value = model.predict(70.0, &FEATURES);
        assert!((value - 75.0).abs() < 1e-12);
    }

    #[test]
    fn clamp_bounds_hold_unconditionally() {
        let hr = CalibrationModel::affine(1000.0, 0.0, ValidRange::HEART_RATE);
        assert_eq!(hr.predict(1e12, &FEATURES), 200.0);
        assert_eq!(hr.predict(-1e12, &FEATURES), 0.0);

        let spo2 = CalibrationModel::affine(-25.0, 110.0, ValidRange::SPO2);
        assert_eq!(spo2.predict(1e9, &FEATURES), 70.0);
        assert_eq!(spo2.predict(-1e9, &FEATURES), 100.0);
    }

    #[test]
    fn clamp_handles_non_finite_input() {
        let model = CalibrationModel::affine(1.0, 0.0, ValidRange::SPO2);
        assert_eq!(model.predict(f64::INFINITY, &FEATURES), 100.0);
        assert_eq!(model.predict(f64::NEG_INFINITY, &FEATURES), 70.0);
        assert_eq!(model.predict(f64::NAN, &FEATURES), 70.0);
    }

    #[test]
    fn fitted_model_output_is_clamped() {
        // Train on targets far above the SpO2 ceiling; predictions must
        // still come back inside the range.
        let x: Vec<[f64; FEATURE_COUNT]> = (0..40)
            .map(|i| {
                let mut row = FEATURES;
                row[6] = 0.5 + 0.01 * i as f64;
                row
            })
            .collect();
        let y = vec![5000.0; 40];
        let regressor = Regressor::fit(RegressorKind::Poly2, &x, &y, 42);
        let model = CalibrationModel::fitted(regressor, ValidRange::SPO2);
        assert_eq!(model.predict(0.0, &x[10]), 100.0);
    }

    #[test]
    fn spo2_floor_is_preserved() {
        // A ratio implying an implausibly low saturation still reports 70 %.
        let model = CalibrationModel::affine(-25.0, 110.0, ValidRange::SPO2);
        assert_eq!(model.predict(8.0, &FEATURES), 70.0);
    }
}
