//! Error types for srs-core.

use thiserror::Error;

/// Errors produced when converting raw grade values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GradeError {
    #[error("grade {value} is outside the 0-5 scale")]
    OutOfRange { value: u8 },
}
