use crate::error::SignalError;

/// Band-pass configuration. Defaults match the cardiac band of a PPG
/// stream sampled at 100 Hz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterConfig {
    pub low_hz: f64,
    pub high_hz: f64,
    pub sample_rate_hz: f64,
    /// Number of cascaded second-order sections per direction.
    pub order: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            low_hz: 0.5,
            high_hz: 5.0,
            sample_rate_hz: 100.0,
            order: 3,
        }
    }
}

impl FilterConfig {
    /// Band edges must satisfy `0 < low < high < rate/2`.
    pub fn validate(&self) -> Result<(), SignalError> {
        let nyquist = self.sample_rate_hz / 2.0;
        let ok = self.sample_rate_hz > 0.0
            && self.low_hz > 0.0
            && self.low_hz < self.high_hz
            && self.high_hz < nyquist
            && self.order > 0;

        if ok {
            Ok(())
        } else {
            Err(SignalError::InvalidFilterConfig {
                low_hz: self.low_hz,
                high_hz: self.high_hz,
                sample_rate_hz: self.sample_rate_hz,
            })
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

/// Zero-phase band-pass filter. A single causal pass shifts peak timing
/// and biases peak-to-peak amplitude, so the section cascade is run
/// forward and then backward over the window; the two passes cancel each
/// other's phase.
#[derive(Debug, Clone)]
pub struct BandpassFilter {
    config: FilterConfig,
    biquad: Biquad,
}

impl BandpassFilter {
    pub fn new(config: FilterConfig) -> Result<Self, SignalError> {
        config.validate()?;

        // Bilinear-transform band-pass section centred on the geometric
        // mean of the band edges.
        let center_hz = (config.low_hz * config.high_hz).sqrt();
        let q = center_hz / (config.high_hz - config.low_hz);
        let w0 = std::f64::consts::TAU * center_hz / config.sample_rate_hz;
        let alpha = w0.sin() / (2.0 * q);
        let a0 = 1.0 + alpha;

        Ok(Self {
            config,
            biquad: Biquad {
                b0: alpha / a0,
                b1: 0.0,
                b2: -alpha / a0,
                a1: -2.0 * w0.cos() / a0,
                a2: (1.0 - alpha) / a0,
            },
        })
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Filters a window snapshot. Output length equals input length. The
    /// window is extended by odd reflection at both ends before filtering
    /// so the edge transients land in the padding, not the signal.
    pub fn apply(&self, signal: &[f64]) -> Vec<f64> {
        let n = signal.len();
        if n < 3 {
            return signal.to_vec();
        }

        // The pass band excludes DC anyway; removing the offset up front
        // keeps the baseline step out of the startup transient.
        let mean = signal.iter().sum::<f64>() / n as f64;
        let centered: Vec<f64> = signal.iter().map(|v| v - mean).collect();

        let pad = (9 * self.config.order).min(n - 1);
        let first = centered[0];
        let last = centered[n - 1];

        let mut extended = Vec::with_capacity(n + 2 * pad);
        for i in (1..=pad).rev() {
            extended.push(2.0 * first - centered[i]);
        }
        extended.extend_from_slice(&centered);
        for i in (n - 1 - pad..n - 1).rev() {
            extended.push(2.0 * last - centered[i]);
        }

        self.run(&mut extended);
        extended.reverse();
        self.run(&mut extended);
        extended.reverse();

        extended[pad..pad + n].to_vec()
    }

    /// One causal pass of the section cascade (transposed direct form II).
    fn run(&self, signal: &mut [f64]) {
        let Biquad { b0, b1, b2, a1, a2 } = self.biquad;
        for _ in 0..self.config.order {
            let mut z1 = 0.0;
            let mut z2 = 0.0;
            for value in signal.iter_mut() {
                let input = *value;
                let output = b0 * input + z1;
                z1 = b1 * input - a1 * output + z2;
                z2 = b2 * input - a2 * output;
                *value = output;
            }
        }
    }
}
