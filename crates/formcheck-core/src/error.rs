//! Error types for the FormCheck engine.
//!
//! Frame analysis itself never fails: a missing landmark or degenerate
//! geometry simply suppresses the affected check. These errors cover the
//! edges of the system (parsing input, loading configuration).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown landmark name: {0}")]
    UnknownLandmark(String),

    #[error("Landmark index out of range: {index} (expected < {count})")]
    LandmarkIndex { index: usize, count: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}
