//! Eigendecomposition-based functions of symmetric matrices.
//!
//! For a symmetric matrix `S = V Λ Vᵀ` with orthonormal `V`, any scalar
//! function extends to `f(S) = V f(Λ) Vᵀ`. This is the fast path of the
//! engine; it is exact up to the accuracy of the eigensolver.

use crate::types::{DMatrix, DVector, Scalar};
use num_traits::Float;

/// Exact symmetry test: `X == Xᵀ` entrywise, no tolerance.
pub fn is_symmetric_matrix<T: Scalar>(x: &DMatrix<T>) -> bool {
    let n = x.nrows();
    if n != x.ncols() {
        return false;
    }
    (0..n).all(|i| (i + 1..n).all(|j| x[(i, j)] == x[(j, i)]))
}

/// Eigenvalues (ascending order not guaranteed) and orthonormal eigenvectors.
pub(crate) fn symmetric_eigen<T: Scalar>(x: &DMatrix<T>) -> (DVector<T>, DMatrix<T>) {
    let eigen = x.clone().symmetric_eigen();
    (eigen.eigenvalues, eigen.eigenvectors)
}

/// Rebuild `V · diag(values) · Vᵀ`.
pub(crate) fn reconstruct<T: Scalar>(vectors: &DMatrix<T>, values: &DVector<T>) -> DMatrix<T> {
    let mut scaled = vectors.clone();
    for (j, &value) in values.iter().enumerate() {
        scaled.column_mut(j).scale_mut(value);
    }
    scaled * vectors.transpose()
}

/// Exponential of a symmetric matrix through its eigendecomposition.
pub fn expsym_matrix<T: Scalar>(x: &DMatrix<T>) -> DMatrix<T> {
    let (values, vectors) = symmetric_eigen(x);
    reconstruct(&vectors, &values.map(<T as Float>::exp))
}

/// Logarithm of a symmetric matrix, `None` unless every eigenvalue is positive.
pub fn logsym_matrix<T: Scalar>(x: &DMatrix<T>) -> Option<DMatrix<T>> {
    let (values, vectors) = symmetric_eigen(x);
    if !values.iter().all(|&v| v > T::zero()) {
        return None;
    }
    Some(reconstruct(&vectors, &values.map(<T as Float>::ln)))
}

/// Real power of a symmetric matrix, `None` when it is not real and finite.
///
/// Any eigenvalue is fine for a non-negative integer exponent; otherwise every
/// eigenvalue must be positive.
pub fn powsym_matrix<T: Scalar>(x: &DMatrix<T>, power: T) -> Option<DMatrix<T>> {
    let (values, vectors) = symmetric_eigen(x);
    let integral = power >= T::zero() && <T as Float>::fract(power) == T::zero();
    if !integral && !values.iter().all(|&v| v > T::zero()) {
        return None;
    }
    let powered = values.map(|v| <T as Float>::powf(v, power));
    if !powered.iter().all(|v| <T as Float>::is_finite(*v)) {
        return None;
    }
    Some(reconstruct(&vectors, &powered))
}
