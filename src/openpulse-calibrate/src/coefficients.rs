use crate::model::{CalibrationModel, ValidRange};
use crate::regressor::Regressor;

/// Heart-rate correction `hr = a * peak_rate + b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HrAffine {
    pub a: f64,
    pub b: f64,
}

/// Saturation curve `spo2 = A - B * R`. The uppercase keys are the
/// on-disk names and are preserved as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpO2Affine {
    #[serde(rename = "A")]
    pub a: f64,
    #[serde(rename = "B")]
    pub b: f64,
}

/// Persisted calibration, loaded once at inference-session start and
/// immutable thereafter. Either a pair of affine corrections or a pair
/// of opaque fitted regressors; the two JSON shapes are disjoint, so the
/// variant is inferred from the document itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CalibrationCoefficients {
    Affine { hr: HrAffine, spo2: SpO2Affine },
    Fitted { hr: Regressor, spo2: Regressor },
}

impl CalibrationCoefficients {
    /// Uncalibrated defaults: identity heart-rate correction and the
    /// textbook `110 - 25R` oximetry curve.
    pub fn default_affine() -> Self {
        Self::Affine {
            hr: HrAffine { a: 1.0, b: 0.0 },
            spo2: SpO2Affine { a: 110.0, b: 25.0 },
        }
    }

    /// Builds the (heart-rate, SpO2) model pair with the mandatory output
    /// ranges attached.
    pub fn into_models(self) -> (CalibrationModel, CalibrationModel) {
        match self {
            Self::Affine { hr, spo2 } => (
                CalibrationModel::affine(hr.a, hr.b, ValidRange::HEART_RATE),
                // spo2 = A - B*R is an affine map with slope -B.
                CalibrationModel::affine(-spo2.b, spo2.a, ValidRange::SPO2),
            ),
            Self::Fitted { hr, spo2 } => (
                CalibrationModel::fitted(hr, ValidRange::HEART_RATE),
                CalibrationModel::fitted(spo2, ValidRange::SPO2),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FEATURE_COUNT;
    use crate::regressor::RegressorKind;

    #[test]
    fn affine_schema_round_trips_with_original_key_case() {
        let coefficients = CalibrationCoefficients::Affine {
            hr: HrAffine { a: 1.05, b: -3.0 },
            spo2: SpO2Affine { a: 108.0, b: 22.5 },
        };
        let json = serde_json::to_string(&coefficients).unwrap();
        assert!(json.contains("\"a\":1.05"));
        assert!(json.contains("\"A\":108.0"));
        assert!(json.contains("\"B\":22.5"));

        let restored: CalibrationCoefficients = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, coefficients);
    }

    #[test]
    fn loads_the_documented_file_shape() {
        let json = r#"{"hr": {"a": 1.0, "b": 0.0}, "spo2": {"A": 110.0, "B": 25.0}}"#;
        let coefficients: CalibrationCoefficients = serde_json::from_str(json).unwrap();
        assert_eq!(coefficients, CalibrationCoefficients::default_affine());
    }

    #[test]
    fn affine_models_apply_the_documented_curves() {
        let (hr_model, spo2_model) = CalibrationCoefficients::default_affine().into_models();
        let features = [50000.0, 45000.0, 120.0, 49800.0, 80.0, 44900.0, 0.74];
        assert!((hr_model.predict(72.0, &features) - 72.0).abs() < 1e-12);
        // 110 - 25 * 0.74 = 91.5
        assert!((spo2_model.predict(0.74, &features) - 91.5).abs() < 1e-12);
    }

    #[test]
    fn fitted_pair_round_trips() {
        let x: Vec<[f64; FEATURE_COUNT]> = (0..40)
            .map(|i| {
                let t = i as f64;
                [
                    50000.0 + t,
                    45000.0,
                    120.0,
                    49800.0,
                    80.0,
                    44900.0,
                    0.5 + 0.01 * t,
                ]
            })
            .collect();
        let y_hr: Vec<f64> = (0..40).map(|i| 60.0 + i as f64).collect();
        let y_spo2: Vec<f64> = (0..40).map(|i| 99.0 - 0.1 * i as f64).collect();

        let coefficients = CalibrationCoefficients::Fitted {
            hr: Regressor::fit(RegressorKind::Poly2, &x, &y_hr, 42),
            spo2: Regressor::fit(RegressorKind::Poly2, &x, &y_spo2, 42),
        };
        let json = serde_json::to_string(&coefficients).unwrap();
        let restored: CalibrationCoefficients = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, coefficients);
    }
}
