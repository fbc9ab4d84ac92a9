use serde::{Deserialize, Serialize};

use openpulse_calibrate::{FEATURE_COUNT, LabeledSample};

/// One row of the labeled calibration dataset: the feature columns of
/// the collection log plus the reference oximeter readings taken at the
/// same moment. The same row feeds both targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledRow {
    pub ir: f64,
    pub red: f64,
    pub ir_ac: f64,
    pub ir_dc: f64,
    pub red_ac: f64,
    pub red_dc: f64,
    pub r_value: f64,
    pub true_hr: f64,
    pub true_spo2: f64,
}

impl LabeledRow {
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.ir,
            self.red,
            self.ir_ac,
            self.ir_dc,
            self.red_ac,
            self.red_dc,
            self.r_value,
        ]
    }

    pub fn hr_sample(&self) -> LabeledSample {
        LabeledSample {
            features: self.features(),
            target: self.true_hr,
        }
    }

    pub fn spo2_sample(&self) -> LabeledSample {
        LabeledSample {
            features: self.features(),
            target: self.true_spo2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_the_collection_log_schema() {
        let json = r#"{
            "ir": 50000.0, "red": 45000.0,
            "ir_ac": 120.0, "ir_dc": 49800.0,
            "red_ac": 80.0, "red_dc": 44900.0,
            "r_value": 0.74,
            "true_hr": 72.0, "true_spo2": 98.0
        }"#;
        let row: LabeledRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.features()[6], 0.74);
        assert_eq!(row.hr_sample().target, 72.0);
        assert_eq!(row.spo2_sample().target, 98.0);
        assert_eq!(row.hr_sample().features, row.spo2_sample().features);
    }
}
