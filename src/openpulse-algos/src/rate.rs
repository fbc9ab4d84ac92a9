use std::cmp::Ordering;

pub struct RateEstimator;

impl RateEstimator {
    /// Refractory spacing between accepted peaks. 0.4 s caps the peak
    /// density at 150/min, rejecting high-frequency noise maxima.
    pub const DEFAULT_MIN_PEAK_DISTANCE_S: f64 = 0.4;

    /// Converts the peaks of a filtered window into a per-minute rate.
    ///
    /// With two or more accepted peaks the rate comes from the mean
    /// inter-peak interval, which for P evenly spaced peaks over T
    /// seconds equals `P * 60 / T` without the quantisation a raw count
    /// suffers on short windows. A single peak falls back to the count
    /// formula; no peaks is a rate of zero, not an error - whether zero
    /// is plausible output is the calibration layer's decision.
    pub fn estimate(filtered: &[f64], sample_rate_hz: f64, min_peak_distance_s: f64) -> f64 {
        if filtered.is_empty() || sample_rate_hz <= 0.0 {
            return 0.0;
        }

        let min_distance = (min_peak_distance_s * sample_rate_hz).round() as usize;
        let peaks = Self::find_peaks(filtered, min_distance.max(1));
        let duration_s = filtered.len() as f64 / sample_rate_hz;

        match peaks.len() {
            0 => 0.0,
            1 => 60.0 / duration_s,
            n => {
                let span_s = (peaks[n - 1] - peaks[0]) as f64 / sample_rate_hz;
                (n - 1) as f64 * 60.0 / span_s
            }
        }
    }

    /// Local maxima with a minimum index spacing. Candidates are ranked
    /// by height and accepted greedily, so a noise bump beside a taller
    /// peak is suppressed rather than the other way round.
    pub fn find_peaks(signal: &[f64], min_distance: usize) -> Vec<usize> {
        if signal.len() < 3 {
            return Vec::new();
        }

        let mut candidates: Vec<usize> = (1..signal.len() - 1)
            .filter(|&i| signal[i] > signal[i - 1] && signal[i] >= signal[i + 1])
            .collect();

        candidates.sort_by(|&a, &b| {
            signal[b]
                .partial_cmp(&signal[a])
                .unwrap_or(Ordering::Equal)
                .then(a.cmp(&b))
        });

        let mut accepted: Vec<usize> = Vec::new();
        for candidate in candidates {
            if accepted
                .iter()
                .all(|&kept| kept.abs_diff(candidate) >= min_distance)
            {
                accepted.push(candidate);
            }
        }

        accepted.sort_unstable();
        accepted
    }
}
