// src/error.rs

use thiserror::Error;

/// Everything that can go wrong while configuring, running or exporting a simulation.
///
/// The first three variants come from the engine itself. The rest only appear at the
/// I/O edges (scenario files, CSV export).
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("arithmetic inconsistency on day {day}: {detail}")]
    ArithmeticInconsistency { day: u32, detail: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("scenario file error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        SimError::InvalidConfiguration(message.into())
    }

    pub(crate) fn distribution(message: impl Into<String>) -> Self {
        SimError::InvalidDistribution(message.into())
    }

    pub(crate) fn inconsistency(day: u32, detail: impl Into<String>) -> Self {
        SimError::ArithmeticInconsistency {
            day,
            detail: detail.into(),
        }
    }
}
