/// Width of the model feature vector: `[ir, red, ir_ac, ir_dc, red_ac, red_dc, r]`.
pub const FEATURE_COUNT: usize = 7;

/// Feature slots holding raw photodiode-derived channels. The trailing
/// ratio slot may legitimately be small and is not validity-checked.
const RAW_CHANNELS: std::ops::Range<usize> = 0..6;

/// One feature vector paired with a reference reading from an external
/// ground-truth device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    pub features: [f64; FEATURE_COUNT],
    pub target: f64,
}

impl LabeledSample {
    /// Rows with any raw channel at or below zero are physically
    /// impossible (off-finger, saturated, or garbled) and are excluded
    /// before training.
    pub fn is_valid(&self) -> bool {
        self.features[RAW_CHANNELS].iter().all(|&v| v > 0.0)
    }
}

pub(crate) fn filter_valid(samples: &[LabeledSample]) -> Vec<LabeledSample> {
    samples.iter().copied().filter(LabeledSample::is_valid).collect()
}
