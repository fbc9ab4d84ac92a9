use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{self:?}")]
pub enum CodecError {
    InvalidNumber(String),
    MissingKey(&'static str),
    InvalidArity { expected: usize, found: usize },
}
