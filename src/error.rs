//! Error module for the spike timescales library.
use std::error::Error;
use std::fmt;

/// Error types for the library.
#[derive(Debug, PartialEq)]
pub enum TimescaleError {
    /// Error for invalid arguments, e.g., a non-positive down-sampling factor or an empty matrix.
    InvalidArgument(String),
    /// Error for non-rectangular data, e.g., rows of different lengths.
    ShapeMismatch(String),
    /// Error for out of bounds access, e.g., cell not found.
    OutOfBounds(String),
    /// Error for I/O operations.
    IOError(String),
}

impl fmt::Display for TimescaleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TimescaleError::InvalidArgument(e) => write!(f, "Invalid argument: {}", e),
            TimescaleError::ShapeMismatch(e) => write!(f, "Shape mismatch: {}", e),
            TimescaleError::OutOfBounds(e) => {
                write!(f, "Index out of bounds: {}", e)
            }
            TimescaleError::IOError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Error for TimescaleError {}
