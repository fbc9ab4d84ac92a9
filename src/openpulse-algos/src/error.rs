use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{self:?}")]
pub enum SignalError {
    /// Band edges incompatible with the sample rate. Fatal at
    /// configuration time; the pipeline refuses to start.
    InvalidFilterConfig {
        low_hz: f64,
        high_hz: f64,
        sample_rate_hz: f64,
    },
    /// A zero or near-zero denominator in the AC/DC ratio. The affected
    /// window is skipped; the stream continues.
    DegenerateSignal { channel: &'static str },
}
