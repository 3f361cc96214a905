//! Error types for matrix functions and Lie group operations.
//!
//! Every fallible operation in the workspace returns [`Result`], whose error
//! type is [`ManifoldError`]. Shape problems are detected before any numerical
//! work starts; numerical failures of the general matrix-function algorithms are
//! surfaced as-is.

use thiserror::Error;

/// Errors that can occur during manifold and Lie group operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ManifoldError {
    /// Malformed or unbroadcastable batch or point shapes.
    ///
    /// Raised before any numerical work begins, e.g. when two batches have
    /// sample counts 3 and 2, or when a non-square matrix is given to a
    /// square-matrix function.
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Expected shape
        expected: String,
        /// Actual shape
        actual: String,
    },

    /// Numerical failure.
    ///
    /// Raised when a general matrix-function algorithm fails to converge, a
    /// matrix that must be inverted is singular, or non-finite values show up.
    #[error("Numerical error: {reason}")]
    NumericalError {
        /// Description of the numerical issue
        reason: String,
    },

    /// An abstract group operation was invoked without an override.
    ///
    /// This signals a usage bug in a concrete group, not a recoverable
    /// runtime condition.
    #[error("Operation not implemented: {feature}")]
    NotImplemented {
        /// Name of the missing operation
        feature: String,
    },

    /// Point is not a valid element of the space.
    #[error("Invalid point: {reason}")]
    InvalidPoint {
        /// Description of why the point is invalid
        reason: String,
    },

    /// Invalid construction or call parameter (dimension, weights, metric matrix).
    #[error("Invalid parameter: {reason}")]
    InvalidParameter {
        /// Description of the invalid parameter
        reason: String,
    },
}

impl ManifoldError {
    /// Create a ShapeMismatch error.
    pub fn shape_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::ShapeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a NumericalError with a custom reason.
    pub fn numerical_error<S: Into<String>>(reason: S) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }

    /// Create a NotImplemented error for a specific operation.
    pub fn not_implemented<S: Into<String>>(feature: S) -> Self {
        Self::NotImplemented {
            feature: feature.into(),
        }
    }

    /// Create an InvalidPoint error with a custom reason.
    pub fn invalid_point<S: Into<String>>(reason: S) -> Self {
        Self::InvalidPoint {
            reason: reason.into(),
        }
    }

    /// Create an InvalidParameter error with a custom reason.
    pub fn invalid_parameter<S: Into<String>>(reason: S) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }

    /// Whether this error comes from malformed shapes.
    pub fn is_shape_error(&self) -> bool {
        matches!(self, Self::ShapeMismatch { .. })
    }
}

/// Result type alias for operations that can produce ManifoldError.
pub type Result<T> = std::result::Result<T, ManifoldError>;
