//! Error types for the Galaxy3D scene index
//!
//! Only construction and typed side-array access can fail. The hot path
//! (add / move / remove / cursor) never returns an error: absent instances
//! produce a "no mutation" result instead.

use std::fmt;

/// Result type for Galaxy3D scene index operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D scene index errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A `QuadtreeConfig` field is out of range
    InvalidConfig(String),

    /// Metadata was requested before `set_metadata_type` was called
    MetadataNotRegistered,

    /// Metadata was requested with a type other than the registered one
    MetadataTypeMismatch {
        requested: &'static str,
        registered: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            Error::MetadataNotRegistered => write!(f, "No metadata type registered"),
            Error::MetadataTypeMismatch { requested, registered } => write!(
                f,
                "Metadata type mismatch: requested {}, registered {}",
                requested, registered
            ),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
