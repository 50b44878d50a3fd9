//! Error types for grading-scale lookups and edits.

use thiserror::Error;

/// Errors returned by [`GradingScale`](super::GradingScale) operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradingError {
    #[error("score {score} is outside the scale domain {min}..={max}")]
    OutOfRange { score: f64, min: f64, max: f64 },

    #[error("band {letter} overlaps existing band {existing}")]
    Overlap { letter: String, existing: String },

    #[error("no band matches {0}")]
    NotFound(String),

    #[error("malformed scale data: {0}")]
    MalformedData(String),

    /// A covered score matched zero or several bands. Points at a broken
    /// table rather than bad user input.
    #[error("scale is in an invalid state: score {score} matched {matches} bands")]
    InvalidScaleState { score: f64, matches: usize },

    #[error("invalid band {letter}: {reason}")]
    InvalidBand { letter: String, reason: String },

    #[error("a band with letter {0} already exists")]
    DuplicateLetter(String),

    #[error("failed to encode scale: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, GradingError>;
