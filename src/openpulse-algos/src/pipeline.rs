use log::debug;
use openpulse_calibrate::CalibrationModel;
use openpulse_codec::PpgRecord;

use crate::error::SignalError;
use crate::estimate::{Estimate, VitalKind, VitalsEstimate};
use crate::features::FeatureExtractor;
use crate::filter::{BandpassFilter, FilterConfig};
use crate::rate::RateEstimator;
use crate::window::SlidingWindow;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Samples per analysis window (2 s at the default 100 Hz).
    pub window_len: usize,
    pub filter: FilterConfig,
    pub min_peak_distance_s: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_len: 200,
            filter: FilterConfig::default(),
            min_peak_distance_s: RateEstimator::DEFAULT_MIN_PEAK_DISTANCE_S,
        }
    }
}

/// Online stage of the estimator: sliding windows per channel, the
/// zero-phase band-pass, feature extraction, peak-rate detection and the
/// calibrated mapping, in record-arrival order. One pipeline instance
/// serves one stream and is mutated only by that stream's consumer.
#[derive(Debug)]
pub struct PulsePipeline {
    config: PipelineConfig,
    filter: BandpassFilter,
    ir: SlidingWindow,
    red: SlidingWindow,
    hr_model: CalibrationModel,
    spo2_model: CalibrationModel,
    windows_processed: u64,
    degenerate_windows: u64,
}

impl PulsePipeline {
    /// Fails on an invalid filter configuration before any data flows.
    pub fn new(
        config: PipelineConfig,
        hr_model: CalibrationModel,
        spo2_model: CalibrationModel,
    ) -> Result<Self, SignalError> {
        let filter = BandpassFilter::new(config.filter)?;
        Ok(Self {
            filter,
            ir: SlidingWindow::new(config.window_len),
            red: SlidingWindow::new(config.window_len),
            hr_model,
            spo2_model,
            config,
            windows_processed: 0,
            degenerate_windows: 0,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Windows that produced an estimate.
    pub fn windows_processed(&self) -> u64 {
        self.windows_processed
    }

    /// Windows skipped because the signal was degenerate.
    pub fn degenerate_windows(&self) -> u64 {
        self.degenerate_windows
    }

    /// Pushes one record into both channel windows (lock-step, one sample
    /// per channel) and, once the windows are full, derives an estimate.
    /// Returns `None` while the windows are still filling or when the
    /// current window is degenerate - the stream keeps accumulating
    /// either way.
    pub fn push(&mut self, record: &PpgRecord) -> Option<VitalsEstimate> {
        self.ir.push(record.ir);
        self.red.push(record.red);

        // Extraction waits for the shortest channel window; both fill in
        // lock-step, so one check per channel suffices.
        if !self.ir.is_full() || !self.red.is_full() {
            return None;
        }

        let ir_raw = self.ir.snapshot();
        let red_raw = self.red.snapshot();
        let ir_filtered = self.filter.apply(&ir_raw);
        let red_filtered = self.filter.apply(&red_raw);

        let features =
            match FeatureExtractor::extract(&ir_raw, &ir_filtered, &red_raw, &red_filtered) {
                Ok(features) => features,
                Err(error) => {
                    self.degenerate_windows += 1;
                    debug!("window skipped: {error}");
                    return None;
                }
            };

        let peak_rate_bpm = RateEstimator::estimate(
            &ir_filtered,
            self.config.filter.sample_rate_hz,
            self.config.min_peak_distance_s,
        );

        let x = features.as_array();
        let heart_rate = Estimate {
            value: self.hr_model.predict(peak_rate_bpm, &x),
            kind: VitalKind::HeartRate,
        };
        let spo2 = Estimate {
            value: self.spo2_model.predict(features.ratio, &x),
            kind: VitalKind::SpO2,
        };

        self.windows_processed += 1;
        Some(VitalsEstimate {
            heart_rate,
            spo2,
            peak_rate_bpm,
            features,
        })
    }
}
