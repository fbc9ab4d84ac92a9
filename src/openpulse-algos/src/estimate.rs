use std::fmt;

use openpulse_calibrate::ValidRange;

use crate::features::WindowFeatures;

/// Physiological parameter a calibrated estimate refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VitalKind {
    HeartRate,
    SpO2,
}

impl VitalKind {
    pub const fn unit(self) -> &'static str {
        match self {
            Self::HeartRate => "bpm",
            Self::SpO2 => "%",
        }
    }

    pub const fn valid_range(self) -> ValidRange {
        match self {
            Self::HeartRate => ValidRange::HEART_RATE,
            Self::SpO2 => ValidRange::SPO2,
        }
    }
}

/// A single calibrated, range-clamped value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub value: f64,
    pub kind: VitalKind,
}

impl Estimate {
    pub fn is_in_range(&self) -> bool {
        let range = self.kind.valid_range();
        self.value >= range.min && self.value <= range.max
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} {}", self.value, self.kind.unit())
    }
}

/// Everything the pipeline derives from one full window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VitalsEstimate {
    pub heart_rate: Estimate,
    pub spo2: Estimate,
    /// Uncalibrated rate straight from the peak detector.
    pub peak_rate_bpm: f64,
    pub features: WindowFeatures,
}
