//! geomlie - Batched matrix functions and Lie group exponentials.
//!
//! This crate re-exports [`geomlie_core`] (matrix functions, point batches
//! and the generic Lie group framework) and [`geomlie_groups`] (concrete
//! groups) behind a single dependency.
//!
//! # Example
//!
//! ```rust
//! use geomlie::prelude::*;
//! use nalgebra::dvector;
//!
//! let so3 = SpecialOrthogonal3::<f64>::new()?;
//! let base = Points::vector(dvector![0.0, 0.0, 0.5]);
//! let tangent = Points::vector(dvector![0.0, 0.0, 0.25]);
//!
//! let point = so3.group_exp(&tangent, Some(&base), None)?;
//! let back = so3.group_log(&point, Some(&base), None)?;
//! assert!(back.allclose(&tangent));
//! # Ok::<(), ManifoldError>(())
//! ```

pub use geomlie_core;
pub use geomlie_groups;
pub use nalgebra;

pub use geomlie_core::{linalg, ManifoldError, Result};

/// Everything needed to work with the groups and matrix functions.
pub mod prelude {
    pub use geomlie_core::prelude::*;
    pub use geomlie_groups::{
        BarycenterOptions, Euclidean, GeneralLinear, SpecialOrthogonal3,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use approx::assert_relative_eq;
    use nalgebra::dmatrix;

    #[test]
    fn test_prelude_reaches_groups_and_matrix_functions() {
        let gl = GeneralLinear::<f64>::new(2).unwrap();
        assert_eq!(gl.dimension(), 4);

        let engine = MatrixFunctions::default();
        let x = MatrixBatch::single(dmatrix![1.0, 0.0; 0.0, 2.0]);
        let exp = engine.expm(&x).unwrap().into_single().unwrap();
        assert_relative_eq!(exp[(1, 1)], 2.0f64.exp(), epsilon = 1e-12);
    }
}
