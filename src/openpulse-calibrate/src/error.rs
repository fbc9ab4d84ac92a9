use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{self:?}")]
pub enum CalibrateError {
    InsufficientData { available: usize, required: usize },
    NoCandidates,
}
