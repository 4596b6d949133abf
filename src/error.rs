// src/error.rs
//! Construction-time errors for in-memory resources.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// A vector row had the wrong number of components.
    Dimension {
        line: usize,
        expected: usize,
        found: usize,
    },
    /// A component could not be parsed as a float.
    BadFloat { line: usize, value: String },
    /// No vectors were read.
    EmptyTable,
    /// Configured dimension is zero.
    ZeroDimension,
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Dimension {
                line,
                expected,
                found,
            } => write!(
                f,
                "line {line}: expected {expected} vector components, found {found}"
            ),
            ResourceError::BadFloat { line, value } => {
                write!(f, "line {line}: `{value}` is not a float")
            }
            ResourceError::EmptyTable => write!(f, "embedding table has no vectors"),
            ResourceError::ZeroDimension => write!(f, "embedding dimension must be > 0"),
        }
    }
}

impl std::error::Error for ResourceError {}
