use thiserror::Error;

/// Errors returned by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Input slice is empty.
    #[error("empty input")]
    EmptyInput,

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// A coordinate at the input boundary is outside its domain.
    #[error("invalid {name} {value}")]
    InvalidCoordinate {
        /// Coordinate name ("longitude", "latitude", "radius").
        name: &'static str,
        /// The offending value, in degrees.
        value: f64,
    },

    /// A CSV record could not be parsed into coordinates.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// The OPTICS driver has already been run.
    #[error("OPTICS has already been run")]
    AlreadyRun,
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
