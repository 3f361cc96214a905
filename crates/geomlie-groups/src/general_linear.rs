//! The general linear group GL(n).
//!
//! Invertible n×n matrices under matrix multiplication, in matrix layout.
//! The group exponential and logarithm at the identity are the matrix
//! exponential and the principal matrix logarithm of the batched
//! matrix-function engine.

use crate::barycenter::{iterative_barycenter, BarycenterOptions};
use geomlie_core::{
    batch::MatrixBatch,
    error::{ManifoldError, Result},
    lie::{LieGroup, LieGroupState},
    linalg::MatrixFunctions,
    manifold::Manifold,
    points::{broadcast_len, Points, TangentVectors},
    types::{DMatrix, PointType, Scalar, TranslationSide},
};
use num_traits::Float;

/// The general linear group GL(n).
///
/// # Mathematical Properties
///
/// - **Dimension**: n²
/// - **Identity**: the identity matrix
/// - **Composition**: matrix product, inverse the matrix inverse
/// - **Lie algebra**: all n×n matrices, bracket `AB − BA`
/// - **Jacobians**: `I ⊗ P` (left) and `Pᵀ ⊗ I` (right) acting on
///   column-major vectorized matrices
#[derive(Debug, Clone)]
pub struct GeneralLinear<T: Scalar = f64> {
    n: usize,
    state: LieGroupState<T>,
    functions: MatrixFunctions,
    barycenter: BarycenterOptions<T>,
}

impl<T: Scalar> GeneralLinear<T> {
    /// Creates GL(n) using the global matrix-function configuration.
    ///
    /// # Errors
    /// Returns an error if `n` is zero.
    pub fn new(n: usize) -> Result<Self> {
        Ok(Self {
            n,
            state: LieGroupState::new(n * n, PointType::Matrix)?,
            functions: MatrixFunctions::from_global(),
            barycenter: BarycenterOptions::default(),
        })
    }

    /// Replaces the matrix-function engine.
    pub fn with_matrix_functions(mut self, functions: MatrixFunctions) -> Self {
        self.functions = functions;
        self
    }

    /// Replaces the stopping rule of the exponential barycenter.
    pub fn with_barycenter_options(mut self, options: BarycenterOptions<T>) -> Self {
        self.barycenter = options;
        self
    }

    /// Size of the matrices.
    pub fn n(&self) -> usize {
        self.n
    }

    fn check_point_type(&self, point_type: Option<PointType>) -> Result<()> {
        match point_type {
            Some(PointType::Vector) => Err(ManifoldError::shape_mismatch(
                "matrix layout",
                "vector layout requested for GL(n)",
            )),
            _ => Ok(()),
        }
    }

    fn matrices<'a>(&self, points: &'a Points<T>) -> Result<&'a [DMatrix<T>]> {
        let ms = points.as_matrices()?;
        if let Some(bad) = ms.iter().find(|m| m.shape() != (self.n, self.n)) {
            return Err(ManifoldError::shape_mismatch(
                format!("{0}x{0} matrices", self.n),
                format!("a {}x{} matrix", bad.nrows(), bad.ncols()),
            ));
        }
        Ok(ms)
    }

    fn apply(
        &self,
        points: &Points<T>,
        point_type: Option<PointType>,
        f: impl Fn(&MatrixBatch<T>) -> Result<MatrixBatch<T>>,
    ) -> Result<Points<T>> {
        self.check_point_type(point_type)?;
        let batch = MatrixBatch::stack(self.matrices(points)?.to_vec());
        Ok(Points::Matrix(f(&batch)?.into_vec()))
    }
}

impl<T: Scalar> Manifold<T> for GeneralLinear<T> {
    fn name(&self) -> &str {
        "GeneralLinear"
    }

    fn dimension(&self) -> usize {
        self.state.dimension()
    }

    /// A sample belongs to GL(n) when it is n×n with `|det| > tol`.
    fn belongs(&self, points: &Points<T>, tol: T) -> Result<Vec<bool>> {
        let ms = points.as_matrices()?;
        Ok(ms
            .iter()
            .map(|m| {
                m.shape() == (self.n, self.n) && <T as Float>::abs(m.determinant()) > tol
            })
            .collect())
    }
}

impl<T: Scalar> LieGroup<T> for GeneralLinear<T> {
    fn state(&self) -> &LieGroupState<T> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut LieGroupState<T> {
        &mut self.state
    }

    fn get_identity(&self, point_type: Option<PointType>) -> Result<Points<T>> {
        self.check_point_type(point_type)?;
        Ok(Points::matrix(DMatrix::identity(self.n, self.n)))
    }

    fn compose(&self, a: &Points<T>, b: &Points<T>, point_type: Option<PointType>) -> Result<Points<T>> {
        self.check_point_type(point_type)?;
        self.matrices(a)?;
        self.matrices(b)?;
        let n = broadcast_len(a, b)?;
        let (a, b) = (a.broadcast_to(n)?, b.broadcast_to(n)?);
        Ok(Points::Matrix(
            a.as_matrices()?
                .iter()
                .zip(b.as_matrices()?.iter())
                .map(|(x, y)| x * y)
                .collect(),
        ))
    }

    fn inverse(&self, point: &Points<T>, point_type: Option<PointType>) -> Result<Points<T>> {
        self.check_point_type(point_type)?;
        self.matrices(point)?
            .iter()
            .map(|m| {
                m.clone()
                    .try_inverse()
                    .ok_or_else(|| ManifoldError::numerical_error("matrix is not invertible"))
            })
            .collect::<Result<Vec<_>>>()
            .map(Points::Matrix)
    }

    fn regularize(&self, point: &Points<T>, point_type: Option<PointType>) -> Result<Points<T>> {
        self.check_point_type(point_type)?;
        self.matrices(point)?;
        Ok(point.clone())
    }

    fn jacobian_translation(
        &self,
        point: &Points<T>,
        side: TranslationSide,
        point_type: Option<PointType>,
    ) -> Result<Vec<DMatrix<T>>> {
        self.check_point_type(point_type)?;
        let eye = DMatrix::<T>::identity(self.n, self.n);
        Ok(self
            .matrices(point)?
            .iter()
            .map(|p| match side {
                // vec(P·X) = (I ⊗ P)·vec(X)
                TranslationSide::Left => eye.kronecker(p),
                // vec(X·P) = (Pᵀ ⊗ I)·vec(X)
                TranslationSide::Right => p.transpose().kronecker(&eye),
            })
            .collect())
    }

    fn group_exp_from_identity(
        &self,
        tangent_vec: &TangentVectors<T>,
        point_type: Option<PointType>,
    ) -> Result<Points<T>> {
        self.apply(tangent_vec, point_type, |batch| self.functions.expm(batch))
    }

    fn group_log_from_identity(
        &self,
        point: &Points<T>,
        point_type: Option<PointType>,
    ) -> Result<TangentVectors<T>> {
        self.apply(point, point_type, |batch| self.functions.logm(batch))
    }

    fn group_exponential_barycenter(
        &self,
        points: &Points<T>,
        weights: Option<&[T]>,
        point_type: Option<PointType>,
    ) -> Result<Points<T>> {
        self.check_point_type(point_type)?;
        self.matrices(points)?;
        iterative_barycenter(self, points, weights, point_type, &self.barycenter)
    }
}
