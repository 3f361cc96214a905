//! Core traits and numerics for batched Lie group computations.
//!
//! This crate provides the batched matrix-function engine and the generic
//! Lie group framework built on top of it. Concrete groups live in
//! `geomlie-groups`.
//!
//! # Key Concepts
//!
//! - **Batches**: every point or tangent vector is a batch of samples, either
//!   in vector layout (one sample per row) or in matrix layout
//! - **Matrix functions**: exponential, logarithm, power and square root with
//!   an eigendecomposition fast path for symmetric input
//! - **Lie groups**: the group exponential and logarithm at any base point,
//!   derived once from the operations at the identity
//! - **Invariant metrics**: inner products defined at the identity and
//!   transported by left or right translation
//!
//! # Modules
//!
//! - [`batch`]: single-or-stacked matrices for the matrix functions
//! - [`error`]: Error types shared by the workspace
//! - [`linalg`]: Batched matrix functions and their configuration
//! - [`lie`]: The `LieGroup` trait, its generic algorithms and invariant metrics
//! - [`manifold`]: The manifold trait groups build upon
//! - [`points`]: Batched points and tangent vectors with broadcasting
//! - [`types`]: Scalar trait, layouts and numerical constants

pub mod core;
pub mod lie;
pub mod linalg;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::core::{batch, error, manifold, points, types};

// Re-export commonly used items at the crate root
pub use error::{ManifoldError, Result};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use geomlie_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::batch::MatrixBatch;
    pub use crate::error::{ManifoldError, Result};
    pub use crate::lie::{InvariantMetric, LieGroup, LieGroupState};
    pub use crate::linalg::{
        FallbackPolicy, MatrixFunctionConfig, MatrixFunctions, QrMode,
    };
    pub use crate::manifold::Manifold;
    pub use crate::points::{Points, TangentVectors};
    pub use crate::types::{DMatrix, DVector, PointType, Scalar, TranslationSide};
}
