//! Left- and right-invariant metrics on Lie groups.
//!
//! An invariant metric is fully determined by its inner product on the Lie
//! algebra, i.e. a symmetric positive-definite matrix `G` at the identity.
//! At a base point `b` the tangent vector `u` is first pulled back to the
//! identity through the Jacobian `J` of the translation by `b`, which gives
//! the inner-product matrix `J⁻ᵀ · G · J⁻¹` at `b`.

use crate::{
    error::{ManifoldError, Result},
    lie::group::LieGroup,
    linalg::symmetric::symmetric_eigen,
    points::{broadcast_len, Points, TangentVectors},
    types::{DMatrix, DVector, PointType, Scalar, TranslationSide},
};
use num_traits::Float;

/// Invariant metric of a Lie group.
#[derive(Debug, Clone, PartialEq)]
pub struct InvariantMetric<T: Scalar> {
    inner_product_at_identity: DMatrix<T>,
    side: TranslationSide,
}

impl<T: Scalar> InvariantMetric<T> {
    /// Creates a metric from its inner-product matrix at the identity.
    ///
    /// # Errors
    ///
    /// Returns a shape error if the matrix is not square, and an invalid
    /// parameter error if it is empty, not symmetric or not positive-definite.
    pub fn new(inner_product_at_identity: DMatrix<T>, side: TranslationSide) -> Result<Self> {
        let (rows, cols) = inner_product_at_identity.shape();
        if rows != cols {
            return Err(ManifoldError::shape_mismatch(
                "a square inner-product matrix",
                format!("a {}x{} matrix", rows, cols),
            ));
        }
        if rows == 0 {
            return Err(ManifoldError::invalid_parameter(
                "inner-product matrix must not be empty",
            ));
        }

        let scale = inner_product_at_identity
            .iter()
            .fold(T::one(), |acc, v| <T as Float>::max(acc, <T as Float>::abs(*v)));
        let tol = T::DEFAULT_TOLERANCE * scale;
        for i in 0..rows {
            for j in i + 1..rows {
                let gap = inner_product_at_identity[(i, j)] - inner_product_at_identity[(j, i)];
                if <T as Float>::abs(gap) > tol {
                    return Err(ManifoldError::invalid_parameter(
                        "inner-product matrix must be symmetric",
                    ));
                }
            }
        }

        let (eigenvalues, _) = symmetric_eigen(&inner_product_at_identity);
        let min_eigenvalue = eigenvalues
            .iter()
            .fold(<T as Float>::infinity(), |min, &val| <T as Float>::min(min, val));
        if min_eigenvalue <= T::EPSILON * scale {
            return Err(ManifoldError::invalid_parameter(format!(
                "inner-product matrix must be positive-definite (smallest eigenvalue {})",
                min_eigenvalue
            )));
        }

        Ok(Self {
            inner_product_at_identity,
            side,
        })
    }

    /// The canonical metric: identity inner product at the identity.
    pub fn canonical(dimension: usize, side: TranslationSide) -> Self {
        Self {
            inner_product_at_identity: DMatrix::identity(dimension, dimension),
            side,
        }
    }

    /// Dimension of the Lie algebra the metric acts on.
    pub fn dimension(&self) -> usize {
        self.inner_product_at_identity.nrows()
    }

    /// Whether the metric is left- or right-invariant.
    pub fn side(&self) -> TranslationSide {
        self.side
    }

    /// Inner-product matrix at the identity.
    pub fn matrix(&self) -> &DMatrix<T> {
        &self.inner_product_at_identity
    }

    /// Inner products of tangent vectors at the identity, one per sample.
    pub fn inner_product_at_identity(
        &self,
        tangent_vec_a: &TangentVectors<T>,
        tangent_vec_b: &TangentVectors<T>,
    ) -> Result<DVector<T>> {
        let n = self.check_tangents(tangent_vec_a, tangent_vec_b)?;
        Self::pairwise(
            tangent_vec_a,
            tangent_vec_b,
            n,
            std::slice::from_ref(&self.inner_product_at_identity),
        )
    }

    /// Inner-product matrices at each base point (at the identity if `None`).
    pub fn inner_product_matrix<G>(
        &self,
        group: &G,
        base_point: Option<&Points<T>>,
    ) -> Result<Vec<DMatrix<T>>>
    where
        G: LieGroup<T> + ?Sized,
    {
        let base_point = match base_point {
            None => return Ok(vec![self.inner_product_at_identity.clone()]),
            Some(b) => b,
        };
        base_point.expect_layout(PointType::Vector)?;
        if group.dimension() != self.dimension() {
            return Err(ManifoldError::shape_mismatch(
                format!("a group of dimension {}", self.dimension()),
                format!("{} of dimension {}", group.name(), group.dimension()),
            ));
        }

        let jacobians = group.jacobian_translation(base_point, self.side, Some(PointType::Vector))?;
        jacobians
            .iter()
            .map(|jacobian| {
                if jacobian.shape() != self.inner_product_at_identity.shape() {
                    return Err(ManifoldError::shape_mismatch(
                        format!("{0}x{0} jacobians", self.dimension()),
                        format!("a {}x{} jacobian", jacobian.nrows(), jacobian.ncols()),
                    ));
                }
                let inv = jacobian.clone().try_inverse().ok_or_else(|| {
                    ManifoldError::numerical_error("jacobian of the translation is singular")
                })?;
                Ok(inv.transpose() * &self.inner_product_at_identity * inv)
            })
            .collect()
    }

    /// Inner products of tangent vectors at `base_point`, one per sample.
    ///
    /// The three batches broadcast together.
    pub fn inner_product<G>(
        &self,
        group: &G,
        tangent_vec_a: &TangentVectors<T>,
        tangent_vec_b: &TangentVectors<T>,
        base_point: Option<&Points<T>>,
    ) -> Result<DVector<T>>
    where
        G: LieGroup<T> + ?Sized,
    {
        let mut n = self.check_tangents(tangent_vec_a, tangent_vec_b)?;
        if let Some(b) = base_point {
            n = broadcast_len(&tangent_vec_a.broadcast_to(n)?, b)?;
        }
        let matrices = self.inner_product_matrix(group, base_point)?;
        Self::pairwise(tangent_vec_a, tangent_vec_b, n, &matrices)
    }

    /// Squared norms of tangent vectors at `base_point`.
    pub fn squared_norm<G>(
        &self,
        group: &G,
        tangent_vec: &TangentVectors<T>,
        base_point: Option<&Points<T>>,
    ) -> Result<DVector<T>>
    where
        G: LieGroup<T> + ?Sized,
    {
        self.inner_product(group, tangent_vec, tangent_vec, base_point)
    }

    /// Norms of tangent vectors at `base_point`.
    pub fn norm<G>(
        &self,
        group: &G,
        tangent_vec: &TangentVectors<T>,
        base_point: Option<&Points<T>>,
    ) -> Result<DVector<T>>
    where
        G: LieGroup<T> + ?Sized,
    {
        Ok(self
            .squared_norm(group, tangent_vec, base_point)?
            .map(<T as Float>::sqrt))
    }

    fn check_tangents(&self, a: &TangentVectors<T>, b: &TangentVectors<T>) -> Result<usize> {
        a.expect_layout(PointType::Vector)?;
        let n = broadcast_len(a, b)?;
        if a.sample_shape() != Some((1, self.dimension())) {
            return Err(ManifoldError::shape_mismatch(
                format!("tangent vectors of dimension {}", self.dimension()),
                format!("samples of shape {:?}", a.sample_shape()),
            ));
        }
        Ok(n)
    }

    /// `aᵢᵀ Mᵢ bᵢ` for `n` broadcast samples; a single matrix is shared.
    fn pairwise(
        a: &TangentVectors<T>,
        b: &TangentVectors<T>,
        n: usize,
        matrices: &[DMatrix<T>],
    ) -> Result<DVector<T>> {
        if matrices.len() != n && matrices.len() != 1 {
            return Err(ManifoldError::shape_mismatch(
                format!("{} or 1 inner-product matrices", n),
                matrices.len(),
            ));
        }
        let a = a.broadcast_to(n)?;
        let b = b.broadcast_to(n)?;
        let (rows_a, rows_b) = (a.as_vectors()?, b.as_vectors()?);

        Ok(DVector::from_fn(n, |i, _| {
            let m = &matrices[if matrices.len() == 1 { 0 } else { i }];
            let u = rows_a.row(i).transpose();
            let v = rows_b.row(i).transpose();
            u.dot(&(m * v))
        }))
    }
}
