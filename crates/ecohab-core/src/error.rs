//! Error types for EcoHAB analyses.
//!
//! Only batch-level problems surface as errors. Per-event problems inside a
//! detection pass (windows running off the signal, undetermined outcomes)
//! are tallied in the pass result instead.

use thiserror::Error;

/// Result type for EcoHAB operations.
pub type Result<T> = std::result::Result<T, EcohabError>;

/// Errors that can occur during EcoHAB operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EcohabError {
    /// Malformed interval data.
    #[error("Interval error: {0}")]
    Interval(#[from] IntervalError),

    /// Malformed position signal.
    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),

    /// Inconsistent dataset.
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Configuration errors.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A caller-side precondition does not hold (e.g. a phase with no length).
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// I/O errors (wrapped).
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization errors.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for EcohabError {
    fn from(e: std::io::Error) -> Self {
        EcohabError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for EcohabError {
    fn from(e: serde_json::Error) -> Self {
        EcohabError::Serialization(e.to_string())
    }
}

/// Interval-related errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntervalError {
    /// Start and end sequences differ in length.
    #[error("{starts} starts but {ends} ends")]
    LengthMismatch { starts: usize, ends: usize },
    /// An interval with `start >= end`.
    #[error("empty or inverted interval at {index}: [{start}, {end})")]
    Inverted { index: usize, start: f64, end: f64 },
    /// An interval beginning before the epoch.
    #[error("negative start at {index}: {start}")]
    NegativeStart { index: usize, start: f64 },
    /// Intervals out of order or overlapping.
    #[error("interval {index} starts at {start} before previous end {previous_end}")]
    Unordered {
        index: usize,
        start: f64,
        previous_end: f64,
    },
    /// A non-finite bound.
    #[error("non-finite bound at {0}")]
    NonFinite(usize),
}

/// Position-signal errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    /// Sampling rate must be positive.
    #[error("invalid sampling rate: {0}")]
    InvalidSamplingRate(u32),
    /// Two signals that must share a time base do not.
    #[error("signals are not aligned: {0}")]
    Misaligned(String),
}

/// Dataset consistency errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    /// Mouse not present in the dataset.
    #[error("unknown mouse: {0}")]
    UnknownMouse(String),
    /// Compartment not part of the cage topology.
    #[error("unknown compartment {compartment} for mouse {mouse}")]
    UnknownCompartment { mouse: String, compartment: u8 },
    /// Phase not present in the timeline.
    #[error("unknown phase: {0}")]
    UnknownPhase(String),
    /// Phase whose end is not after its start.
    #[error("phase {name} has invalid bounds [{start}, {end})")]
    InvalidPhase { name: String, start: f64, end: f64 },
    /// Nothing to analyse.
    #[error("dataset contains no mice")]
    NoMice,
    /// A selection with no phases.
    #[error("phase selection {0} is empty")]
    EmptySelection(String),
}

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid value.
    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
    /// Out of range.
    #[error("{field} out of range: {value} (must be {min}-{max})")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },
}

// Convenience constructors
impl EcohabError {
    pub fn precondition(msg: impl Into<String>) -> Self {
        EcohabError::Precondition(msg.into())
    }

    pub fn unknown_mouse(id: impl Into<String>) -> Self {
        EcohabError::Data(DataError::UnknownMouse(id.into()))
    }

    pub fn unknown_phase(name: impl Into<String>) -> Self {
        EcohabError::Data(DataError::UnknownPhase(name.into()))
    }

    pub fn invalid_config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        EcohabError::Config(ConfigError::InvalidValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        })
    }

    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, value: f64) -> Self {
        EcohabError::Config(ConfigError::OutOfRange {
            field: field.into(),
            min,
            max,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_errors_convert_and_display() {
        let err: EcohabError = IntervalError::LengthMismatch { starts: 2, ends: 1 }.into();
        assert_eq!(err.to_string(), "Interval error: 2 starts but 1 ends");

        let err = EcohabError::out_of_range("alpha", 0.0, 1.0, 1.5);
        assert_eq!(err.to_string(), "Config error: alpha out of range: 1.5 (must be 0-1)");
    }

    #[test]
    fn io_errors_are_wrapped() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        let err: EcohabError = io.into();
        assert!(matches!(err, EcohabError::Io(ref m) if m.contains("missing.json")));
    }
}
