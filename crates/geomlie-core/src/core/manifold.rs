//! Core manifold trait.
//!
//! A manifold here is reduced to what the Lie group framework needs from it:
//! a fixed positive dimension, a name for diagnostics and a membership test.

use crate::{
    core::points::Points,
    error::{ManifoldError, Result},
    types::Scalar,
};
use std::fmt::Debug;

/// Trait for smooth manifolds.
///
/// The dimension is fixed at construction and never changes afterwards.
pub trait Manifold<T: Scalar>: Debug + Send + Sync {
    /// Returns the name of the manifold for debugging and display.
    fn name(&self) -> &str;

    /// Returns the intrinsic dimension of the manifold.
    fn dimension(&self) -> usize;

    /// Evaluates, for each sample, whether it belongs to the manifold.
    ///
    /// # Arguments
    ///
    /// * `points` - Batch of candidate points
    /// * `tol` - Numerical tolerance of the membership constraints
    fn belongs(&self, points: &Points<T>, tol: T) -> Result<Vec<bool>> {
        let _ = (points, tol);
        Err(ManifoldError::not_implemented(format!(
            "belongs for {}",
            self.name()
        )))
    }
}

/// Validate a manifold dimension at construction.
pub fn check_dimension(dimension: usize) -> Result<usize> {
    if dimension == 0 {
        return Err(ManifoldError::invalid_parameter(
            "manifold dimension must be positive",
        ));
    }
    Ok(dimension)
}
