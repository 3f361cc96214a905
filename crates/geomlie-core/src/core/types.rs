//! Type definitions and aliases.
//!
//! This module provides the scalar trait shared by every numerical routine,
//! the point layout enum and the tolerance constants used by comparisons.

use nalgebra::{Dyn, OMatrix, OVector, RealField, Scalar as NalgebraScalar};
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Trait for scalar types used in matrix functions and Lie groups (f32 or f64).
pub trait Scalar:
    NalgebraScalar
    + RealField
    + Float
    + FromPrimitive
    + Display
    + Debug
    + Default
    + Copy
    + Send
    + Sync
    + 'static
{
    /// Machine epsilon for this scalar type.
    const EPSILON: Self;

    /// Relative tolerance of [`allclose`](crate::core::points::allclose_matrices).
    const ALLCLOSE_RTOL: Self;

    /// Absolute tolerance of [`allclose`](crate::core::points::allclose_matrices).
    const ALLCLOSE_ATOL: Self;

    /// Threshold under which a rotation angle is handled with Taylor expansions.
    const SMALL_ANGLE: Self;

    /// Default tolerance for iterative algorithms (barycenters).
    const DEFAULT_TOLERANCE: Self;

    /// Convert from f64 (for constants).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails. Use `try_from_f64` for a non-panicking version.
    fn from_f64(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).expect("Failed to convert from f64")
    }

    /// Try to convert from f64.
    fn try_from_f64(v: f64) -> Option<Self> {
        <Self as FromPrimitive>::from_f64(v)
    }

    /// Convert to f64 (for logging/display).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn to_f64(self) -> f64 {
        num_traits::cast(self).expect("Failed to convert to f64")
    }

    /// Convert from usize (for counts and batch sizes).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn from_usize(v: usize) -> Self {
        <Self as FromPrimitive>::from_usize(v).expect("Failed to convert from usize")
    }
}

impl Scalar for f32 {
    const EPSILON: Self = f32::EPSILON;
    const ALLCLOSE_RTOL: Self = 1e-5;
    const ALLCLOSE_ATOL: Self = 1e-6;
    const SMALL_ANGLE: Self = 1e-3;
    const DEFAULT_TOLERANCE: Self = 1e-5;
}

impl Scalar for f64 {
    const EPSILON: Self = f64::EPSILON;
    const ALLCLOSE_RTOL: Self = 1e-5;
    const ALLCLOSE_ATOL: Self = 1e-8;
    const SMALL_ANGLE: Self = 1e-6;
    const DEFAULT_TOLERANCE: Self = 1e-10;
}

/// Type alias for a dynamically-sized matrix.
pub type DMatrix<T> = OMatrix<T, Dyn, Dyn>;

/// Type alias for a dynamically-sized vector.
pub type DVector<T> = OVector<T, Dyn>;

/// Layout of group elements and tangent vectors.
///
/// - `Vector`: a batch has shape (n_samples, dimension)
/// - `Matrix`: a batch has shape (n_samples, n, n)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PointType {
    /// One row per sample.
    Vector,
    /// One square matrix per sample.
    Matrix,
}

impl std::fmt::Display for PointType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointType::Vector => write!(f, "vector"),
            PointType::Matrix => write!(f, "matrix"),
        }
    }
}

/// Side of a group translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TranslationSide {
    /// x ↦ g·x
    Left,
    /// x ↦ x·g
    Right,
}

/// Numerical constants for different precision levels.
pub mod constants {
    use super::Scalar;

    /// Get machine epsilon for the given scalar type.
    pub fn epsilon<T: Scalar>() -> T {
        T::EPSILON
    }

    /// Pi constant.
    pub fn pi<T: Scalar>() -> T {
        <T as Scalar>::from_f64(std::f64::consts::PI)
    }

    /// Euler's number (e).
    pub fn e<T: Scalar>() -> T {
        <T as Scalar>::from_f64(std::f64::consts::E)
    }
}
