//! Error module for the Rusty SORN library.
use std::error::Error;
use std::fmt;

/// Error types for the library.
#[derive(Debug, PartialEq)]
pub enum SORNError {
    /// Error for invalid parameters, e.g., a negative radius or an empty network.
    InvalidParameter(String),
    /// Not implemented operation.
    NotImplemented(String),
    /// Error for invalid operation, e.g., stepping a completed simulation.
    InvalidOperation(String),
    /// Error for incompatible trials, e.g., series of different lengths.
    IncompatibleTrials(String),
    /// Error for I/O operations.
    IOError(String),
}

impl fmt::Display for SORNError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SORNError::InvalidParameter(e) => write!(f, "Invalid parameter: {}", e),
            SORNError::NotImplemented(e) => write!(f, "Not implemented: {}", e),
            SORNError::InvalidOperation(e) => write!(f, "Invalid operation: {}", e),
            SORNError::IncompatibleTrials(e) => write!(f, "Incompatible trials: {}", e),
            SORNError::IOError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Error for SORNError {}
