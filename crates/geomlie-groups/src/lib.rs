//! geomlie groups - Concrete Lie groups.
//!
//! This crate implements the [`LieGroup`](geomlie_core::lie::LieGroup)
//! contract for the translation group ℝⁿ, the rotation group SO(3) and the
//! general linear group GL(n), together with the iterative exponential
//! barycenter they share.

pub mod barycenter;
pub mod euclidean;
pub mod general_linear;
pub mod special_orthogonal;

// Re-export main groups for convenience
pub use barycenter::{iterative_barycenter, BarycenterOptions};
pub use euclidean::Euclidean;
pub use general_linear::GeneralLinear;
pub use special_orthogonal::SpecialOrthogonal3;
