use openpulse_calibrate::FEATURE_COUNT;

use crate::error::SignalError;

/// Derived scalars for one full window, in the fixed order consumed by
/// the calibration models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowFeatures {
    /// Most recent raw sample per channel.
    pub ir: f64,
    pub red: f64,
    /// Peak-to-peak of the filtered (pulsatile) signal.
    pub ir_ac: f64,
    /// Mean of the raw signal (baseline absorption).
    pub ir_dc: f64,
    pub red_ac: f64,
    pub red_dc: f64,
    /// Ratio-of-ratios `(red_ac/red_dc) / (ir_ac/ir_dc)`.
    pub ratio: f64,
}

impl WindowFeatures {
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.ir,
            self.red,
            self.ir_ac,
            self.ir_dc,
            self.red_ac,
            self.red_dc,
            self.ratio,
        ]
    }
}

pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Baseline below one ADC count means the photodiode is dark or the
    /// finger is off the sensor.
    const MIN_DC: f64 = 1.0;
    /// Pulsatile amplitude below this is a flat-lined channel; the ratio
    /// would divide by (nearly) nothing.
    const MIN_AC: f64 = 1e-3;

    /// Computes per-channel AC/DC and the cross-channel ratio from the
    /// raw windows and their filtered counterparts. A degenerate window
    /// is an error, never NaN/Inf; callers skip it and keep collecting.
    pub fn extract(
        ir_raw: &[f64],
        ir_filtered: &[f64],
        red_raw: &[f64],
        red_filtered: &[f64],
    ) -> Result<WindowFeatures, SignalError> {
        let ir_dc = mean(ir_raw);
        let red_dc = mean(red_raw);
        if ir_dc < Self::MIN_DC {
            return Err(SignalError::DegenerateSignal { channel: "ir_dc" });
        }
        if red_dc < Self::MIN_DC {
            return Err(SignalError::DegenerateSignal { channel: "red_dc" });
        }

        let ir_ac = peak_to_peak(ir_filtered);
        let red_ac = peak_to_peak(red_filtered);
        if ir_ac < Self::MIN_AC {
            return Err(SignalError::DegenerateSignal { channel: "ir_ac" });
        }
        if red_ac < Self::MIN_AC {
            return Err(SignalError::DegenerateSignal { channel: "red_ac" });
        }

        let ratio = (red_ac / red_dc) / (ir_ac / ir_dc);
        if !ratio.is_finite() {
            return Err(SignalError::DegenerateSignal { channel: "ratio" });
        }

        Ok(WindowFeatures {
            ir: ir_raw.last().copied().unwrap_or_default(),
            red: red_raw.last().copied().unwrap_or_default(),
            ir_ac,
            ir_dc,
            red_ac,
            red_dc,
            ratio,
        })
    }
}

fn mean(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().sum::<f64>() / signal.len() as f64
}

fn peak_to_peak(signal: &[f64]) -> f64 {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in signal {
        min = min.min(v);
        max = max.max(v);
    }
    if min > max { 0.0 } else { max - min }
}
