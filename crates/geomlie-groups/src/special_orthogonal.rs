//! The rotation group SO(3).
//!
//! Rotations are represented either as rotation vectors `v = θ·n` (vector
//! layout, the default) or as 3×3 rotation matrices (matrix layout).
//!
//! # Conversions
//!
//! The rotation matrix of a rotation vector is given by Rodrigues' formula
//!
//! ```text
//! R = I + (sin θ / θ)·[v]ₓ + ((1 − cos θ) / θ²)·[v]ₓ²
//! ```
//!
//! and the rotation vector of a matrix by the rotation logarithm, which
//! switches to the symmetric part of `R` when θ approaches π. Both use
//! Taylor expansions for small angles.
//!
//! # Regularization
//!
//! Rotation vectors are only defined up to multiples of 2π along their axis.
//! [`SpecialOrthogonal3::regularize`] maps every rotation vector to the
//! representative whose angle lies in [0, π].

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
use nalgebra::{Matrix3, RealField, Vector3};
use num_traits::Float;

/// Skew-symmetric matrix `[v]ₓ` with `[v]ₓ·w = v × w`.
pub fn skew_matrix<T: Scalar>(v: &Vector3<T>) -> Matrix3<T> {
    Matrix3::new(
        T::zero(), -v[2], v[1],
        v[2], T::zero(), -v[0],
        -v[1], v[0], T::zero(),
    )
}

/// Rotation vector of a skew-symmetric matrix, the inverse of [`skew_matrix`].
///
/// Only the antisymmetric part of `m` is used.
pub fn vee<T: Scalar>(m: &Matrix3<T>) -> Vector3<T> {
    let half = <T as Scalar>::from_f64(0.5);
    Vector3::new(
        (m[(2, 1)] - m[(1, 2)]) * half,
        (m[(0, 2)] - m[(2, 0)]) * half,
        (m[(1, 0)] - m[(0, 1)]) * half,
    )
}

fn small_angle<T: Scalar>() -> T {
    <T as Float>::sqrt(T::SMALL_ANGLE)
}

/// Rotation matrix of a rotation vector (Rodrigues' formula).
pub fn rotation_matrix<T: Scalar>(v: &Vector3<T>) -> Matrix3<T> {
    let theta = v.norm();
    let theta_sq = theta * theta;
    let (a, b) = if theta < small_angle() {
        (
            T::one() - theta_sq / <T as Scalar>::from_f64(6.0),
            <T as Scalar>::from_f64(0.5) - theta_sq / <T as Scalar>::from_f64(24.0),
        )
    } else {
        (
            <T as Float>::sin(theta) / theta,
            (T::one() - <T as Float>::cos(theta)) / theta_sq,
        )
    };
    let k = skew_matrix(v);
    Matrix3::identity() + k * a + k * k * b
}

/// Rotation vector of a rotation matrix, with angle in [0, π].
pub fn rotation_vector<T: Scalar>(r: &Matrix3<T>) -> Vector3<T> {
    let half = <T as Scalar>::from_f64(0.5);
    let axis_sin = vee(r); // sin θ · n
    let cos_theta = <T as Float>::max(
        -T::one(),
        <T as Float>::min(T::one(), (r.trace() - T::one()) * half),
    );
    let theta = <T as Float>::atan2(axis_sin.norm(), cos_theta);

    if theta < small_angle() {
        return axis_sin * (T::one() + theta * theta / <T as Scalar>::from_f64(6.0));
    }
    if cos_theta > -half {
        return axis_sin * (theta / <T as Float>::sin(theta));
    }

    // Close to π: n·nᵀ from the symmetric part, sign from the antisymmetric part.
    let symmetric = (r + r.transpose()) * half;
    let outer = (symmetric - Matrix3::identity() * cos_theta) / (T::one() - cos_theta);
    let k = (0..3)
        .max_by(|&i, &j| {
            outer[(i, i)]
                .partial_cmp(&outer[(j, j)])
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(0);
    let mut axis: Vector3<T> = outer.column(k) / <T as Float>::sqrt(outer[(k, k)]);
    if axis.dot(&axis_sin) < T::zero() {
        axis = -axis;
    }
    axis * theta
}

/// Maps a rotation vector to the equivalent one with angle in [0, π].
fn regularize_vector<T: Scalar>(v: &Vector3<T>) -> Vector3<T> {
    let theta = v.norm();
    if theta <= T::EPSILON {
        return *v;
    }
    let two_pi = <T as RealField>::two_pi();
    let mut wrapped = theta - two_pi * <T as Float>::floor(theta / two_pi);
    if wrapped > <T as RealField>::pi() {
        wrapped -= two_pi;
    }
    v * (wrapped / theta)
}

/// Jacobian of the translation by a rotation vector, in rotation-vector
/// coordinates: `c₁·I + c₂·v·vᵀ ± ½·[v]ₓ`.
fn translation_jacobian<T: Scalar>(v: &Vector3<T>, side: TranslationSide) -> Matrix3<T> {
    let v = regularize_vector(v);
    let theta = v.norm();
    let theta_sq = theta * theta;
    let (c1, c2) = if theta < small_angle() {
        (
            T::one() - theta_sq / <T as Scalar>::from_f64(12.0)
                - theta_sq * theta_sq / <T as Scalar>::from_f64(720.0),
            <T as Scalar>::from_f64(1.0 / 12.0) + theta_sq / <T as Scalar>::from_f64(720.0),
        )
    } else {
        let half = theta * <T as Scalar>::from_f64(0.5);
        let c1 = half * <T as Float>::cos(half) / <T as Float>::sin(half);
        (c1, (T::one() - c1) / theta_sq)
    };
    let half_skew = skew_matrix(&v) * <T as Scalar>::from_f64(0.5);
    let symmetric = Matrix3::identity() * c1 + v * v.transpose() * c2;
    match side {
        TranslationSide::Left => symmetric + half_skew,
        TranslationSide::Right => symmetric - half_skew,
    }
}

fn row3<T: Scalar>(rows: &DMatrix<T>, i: usize) -> Vector3<T> {
    Vector3::new(rows[(i, 0)], rows[(i, 1)], rows[(i, 2)])
}

fn to_dmatrix<T: Scalar>(m: &Matrix3<T>) -> DMatrix<T> {
    DMatrix::from_fn(3, 3, |i, j| m[(i, j)])
}

fn to_matrix3<T: Scalar>(m: &DMatrix<T>) -> Matrix3<T> {
    Matrix3::from_fn(|i, j| m[(i, j)])
}

/// The rotation group SO(3).
///
/// # Mathematical Properties
///
/// - **Dimension**: 3
/// - **Identity**: the zero rotation vector, or the identity matrix
/// - **Composition**: product of rotation matrices
/// - **Lie algebra**: skew-symmetric 3×3 matrices, identified with ℝ³
///
/// # Example
///
/// ```rust
/// use geomlie_groups::SpecialOrthogonal3;
/// use geomlie_core::prelude::*;
/// use nalgebra::dvector;
///
/// let so3 = SpecialOrthogonal3::<f64>::new()?;
/// let v = Points::vector(dvector![0.0, 0.0, 1.0]);
/// let r = so3.group_exp(&v, None, None)?;
/// assert!(r.allclose(&v));
/// # Ok::<(), ManifoldError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SpecialOrthogonal3<T: Scalar = f64> {
    state: LieGroupState<T>,
    functions: MatrixFunctions,
    barycenter: BarycenterOptions<T>,
}

impl<T: Scalar> SpecialOrthogonal3<T> {
    /// Creates SO(3) with rotation vectors as default layout.
    pub fn new() -> Result<Self> {
        Self::with_point_type(PointType::Vector)
    }

    /// Creates SO(3) with the given default layout.
    pub fn with_point_type(default_point_type: PointType) -> Result<Self> {
        Ok(Self {
            state: LieGroupState::new(3, default_point_type)?,
            functions: MatrixFunctions::from_global(),
            barycenter: BarycenterOptions::default(),
        })
    }

    /// Replaces the matrix-function engine used in matrix layout.
    pub fn with_matrix_functions(mut self, functions: MatrixFunctions) -> Self {
        self.functions = functions;
        self
    }

    /// Replaces the stopping rule of the exponential barycenter.
    pub fn with_barycenter_options(mut self, options: BarycenterOptions<T>) -> Self {
        self.barycenter = options;
        self
    }

    fn layout(&self, points: &Points<T>, point_type: Option<PointType>) -> Result<PointType> {
        let point_type = point_type.unwrap_or_else(|| self.state.default_point_type());
        points.expect_layout(point_type)?;
        match points.sample_shape() {
            Some((1, 3)) if point_type == PointType::Vector => Ok(point_type),
            Some((3, 3)) if point_type == PointType::Matrix => Ok(point_type),
            None => Err(ManifoldError::shape_mismatch("at least one rotation", "an empty batch")),
            Some((r, c)) => Err(ManifoldError::shape_mismatch(
                match point_type {
                    PointType::Vector => "rotation vectors of dimension 3",
                    PointType::Matrix => "3x3 rotation matrices",
                },
                format!("samples of shape {}x{}", r, c),
            )),
        }
    }

    fn map_vectors(&self, points: &Points<T>, f: impl Fn(Vector3<T>) -> Vector3<T>) -> Result<Points<T>> {
        let rows = points.as_vectors()?;
        let mut out = DMatrix::zeros(rows.nrows(), 3);
        for i in 0..rows.nrows() {
            let v = f(row3(rows, i));
            out.set_row(i, &v.transpose());
        }
        Ok(Points::Vector(out))
    }

    /// Rotation matrices of a batch of rotation vectors.
    pub fn matrix_from_rotation_vector(&self, points: &Points<T>) -> Result<Points<T>> {
        self.layout(points, Some(PointType::Vector))?;
        let rows = points.as_vectors()?;
        Ok(Points::Matrix(
            (0..rows.nrows())
                .map(|i| to_dmatrix(&rotation_matrix(&row3(rows, i))))
                .collect(),
        ))
    }

    /// Rotation vectors, with angle in [0, π], of a batch of rotation matrices.
    pub fn rotation_vector_from_matrix(&self, points: &Points<T>) -> Result<Points<T>> {
        self.layout(points, Some(PointType::Matrix))?;
        let ms = points.as_matrices()?;
        let mut out = DMatrix::zeros(ms.len(), 3);
        for (i, m) in ms.iter().enumerate() {
            out.set_row(i, &rotation_vector(&to_matrix3(m)).transpose());
        }
        Ok(Points::Vector(out))
    }
}

impl<T: Scalar> Manifold<T> for SpecialOrthogonal3<T> {
    fn name(&self) -> &str {
        "SpecialOrthogonal3"
    }

    fn dimension(&self) -> usize {
        3
    }

    /// Rotation vectors belong when they have three coordinates. Matrices
    /// belong when `RᵀR = I` within `tol` and `det R > 0`.
    fn belongs(&self, points: &Points<T>, tol: T) -> Result<Vec<bool>> {
        match points {
            Points::Vector(rows) => Ok(vec![rows.ncols() == 3; rows.nrows()]),
            Points::Matrix(ms) => Ok(ms
                .iter()
                .map(|m| {
                    if m.shape() != (3, 3) {
                        return false;
                    }
                    let defect = m.transpose() * m - DMatrix::identity(3, 3);
                    defect.iter().all(|x| <T as Float>::abs(*x) <= tol)
                        && m.determinant() > T::zero()
                })
                .collect()),
        }
    }
}

impl<T: Scalar> LieGroup<T> for SpecialOrthogonal3<T> {
    fn state(&self) -> &LieGroupState<T> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut LieGroupState<T> {
        &mut self.state
    }

    fn get_identity(&self, point_type: Option<PointType>) -> Result<Points<T>> {
        Ok(match point_type.unwrap_or_else(|| self.state.default_point_type()) {
            PointType::Vector => Points::Vector(DMatrix::zeros(1, 3)),
            PointType::Matrix => Points::matrix(DMatrix::identity(3, 3)),
        })
    }

    fn compose(&self, a: &Points<T>, b: &Points<T>, point_type: Option<PointType>) -> Result<Points<T>> {
        let point_type = self.layout(a, point_type)?;
        self.layout(b, Some(point_type))?;
        let n = broadcast_len(a, b)?;
        let (a, b) = (a.broadcast_to(n)?, b.broadcast_to(n)?);
        match point_type {
            PointType::Vector => {
                let (ra, rb) = (a.as_vectors()?, b.as_vectors()?);
                let mut out = DMatrix::zeros(n, 3);
                for i in 0..n {
                    let product = rotation_matrix(&row3(ra, i)) * rotation_matrix(&row3(rb, i));
                    out.set_row(i, &regularize_vector(&rotation_vector(&product)).transpose());
                }
                Ok(Points::Vector(out))
            }
            PointType::Matrix => Ok(Points::Matrix(
                a.as_matrices()?
                    .iter()
                    .zip(b.as_matrices()?.iter())
                    .map(|(x, y)| x * y)
                    .collect(),
            )),
        }
    }

    fn inverse(&self, point: &Points<T>, point_type: Option<PointType>) -> Result<Points<T>> {
        match self.layout(point, point_type)? {
            PointType::Vector => self.map_vectors(point, |v| -regularize_vector(&v)),
            PointType::Matrix => Ok(Points::Matrix(
                point.as_matrices()?.iter().map(|m| m.transpose()).collect(),
            )),
        }
    }

    /// Maps rotation vectors to angles in [0, π]. Rotation matrices are
    /// returned unchanged.
    fn regularize(&self, point: &Points<T>, point_type: Option<PointType>) -> Result<Points<T>> {
        match self.layout(point, point_type)? {
            PointType::Vector => self.map_vectors(point, |v| regularize_vector(&v)),
            PointType::Matrix => Ok(point.clone()),
        }
    }

    /// Only defined for rotation vectors.
    fn jacobian_translation(
        &self,
        point: &Points<T>,
        side: TranslationSide,
        point_type: Option<PointType>,
    ) -> Result<Vec<DMatrix<T>>> {
        if self.layout(point, point_type)? == PointType::Matrix {
            return Err(ManifoldError::shape_mismatch(
                "rotation vectors",
                "rotation matrices given to jacobian_translation",
            ));
        }
        let rows = point.as_vectors()?;
        Ok((0..rows.nrows())
            .map(|i| to_dmatrix(&translation_jacobian(&row3(rows, i), side)))
            .collect())
    }

    fn group_exp_from_identity(
        &self,
        tangent_vec: &TangentVectors<T>,
        point_type: Option<PointType>,
    ) -> Result<Points<T>> {
        match self.layout(tangent_vec, point_type)? {
            PointType::Vector => self.regularize(tangent_vec, Some(PointType::Vector)),
            PointType::Matrix => {
                let batch = MatrixBatch::stack(tangent_vec.as_matrices()?.to_vec());
                Ok(Points::Matrix(self.functions.expm(&batch)?.into_vec()))
            }
        }
    }

    fn group_log_from_identity(
        &self,
        point: &Points<T>,
        point_type: Option<PointType>,
    ) -> Result<TangentVectors<T>> {
        match self.layout(point, point_type)? {
            PointType::Vector => self.regularize(point, Some(PointType::Vector)),
            PointType::Matrix => {
                let batch = MatrixBatch::stack(point.as_matrices()?.to_vec());
                Ok(Points::Matrix(self.functions.logm(&batch)?.into_vec()))
            }
        }
    }

    fn group_exponential_barycenter(
        &self,
        points: &Points<T>,
        weights: Option<&[T]>,
        point_type: Option<PointType>,
    ) -> Result<Points<T>> {
        let point_type = self.layout(points, point_type)?;
        iterative_barycenter(self, points, weights, Some(point_type), &self.barycenter)
    }
}
