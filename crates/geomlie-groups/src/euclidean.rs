//! The translation group ℝⁿ.
//!
//! Euclidean space seen as a commutative Lie group under addition. Points
//! and tangent vectors are both plain vectors in vector layout; the group
//! exponential and logarithm at the identity are the identity map and every
//! translation has the identity Jacobian. The flat metric is exposed through
//! [`Euclidean::metric_exp`], [`Euclidean::metric_log`] and
//! [`Euclidean::mean`].

use crate::barycenter::{validate_weights, weighted_mean};
use geomlie_core::{
    error::{ManifoldError, Result},
    lie::{LieGroup, LieGroupState},
    manifold::Manifold,
    points::{Points, TangentVectors},
    types::{DMatrix, PointType, Scalar, TranslationSide},
};

/// The additive group ℝⁿ.
///
/// # Mathematical Properties
///
/// - **Dimension**: n
/// - **Identity**: the zero vector
/// - **Composition**: `a · b = a + b`, inverse `-a`
/// - **Exponential map**: `exp_b(v) = b + v`
/// - **Logarithmic map**: `log_b(p) = p - b`
#[derive(Debug, Clone)]
pub struct Euclidean<T: Scalar = f64> {
    state: LieGroupState<T>,
}

impl<T: Scalar> Euclidean<T> {
    /// Creates ℝⁿ.
    ///
    /// # Errors
    /// Returns an error if `dimension` is zero.
    pub fn new(dimension: usize) -> Result<Self> {
        Ok(Self {
            state: LieGroupState::new(dimension, PointType::Vector)?,
        })
    }

    fn check_point_type(&self, point_type: Option<PointType>) -> Result<()> {
        match point_type {
            Some(PointType::Matrix) => Err(ManifoldError::shape_mismatch(
                "vector layout",
                "matrix layout requested for Euclidean space",
            )),
            _ => Ok(()),
        }
    }

    fn rows<'a>(&self, points: &'a Points<T>) -> Result<&'a DMatrix<T>> {
        let rows = points.as_vectors()?;
        if rows.ncols() != self.state.dimension() {
            return Err(ManifoldError::shape_mismatch(
                format!("vectors of dimension {}", self.state.dimension()),
                format!("vectors of dimension {}", rows.ncols()),
            ));
        }
        Ok(rows)
    }

    /// Riemannian exponential of the flat metric: `base_point + tangent_vec`.
    pub fn metric_exp(&self, tangent_vec: &TangentVectors<T>, base_point: &Points<T>) -> Result<Points<T>> {
        self.rows(tangent_vec)?;
        self.rows(base_point)?;
        base_point.add(tangent_vec)
    }

    /// Riemannian logarithm of the flat metric: `point - base_point`.
    pub fn metric_log(&self, point: &Points<T>, base_point: &Points<T>) -> Result<TangentVectors<T>> {
        self.rows(point)?;
        self.rows(base_point)?;
        point.sub(base_point)
    }

    /// Weighted Fréchet mean of the flat metric, i.e. the weighted average.
    ///
    /// `weights` defaults to 1 for every point.
    pub fn mean(&self, points: &Points<T>, weights: Option<&[T]>) -> Result<Points<T>> {
        self.rows(points)?;
        let weights = validate_weights(weights, points.n_samples())?;
        weighted_mean(points, &weights)
    }
}

impl<T: Scalar> Manifold<T> for Euclidean<T> {
    fn name(&self) -> &str {
        "Euclidean"
    }

    fn dimension(&self) -> usize {
        self.state.dimension()
    }

    /// A sample belongs to ℝⁿ exactly when it has n coordinates.
    fn belongs(&self, points: &Points<T>, _tol: T) -> Result<Vec<bool>> {
        let fits = points.sample_shape() == Some((1, self.state.dimension()))
            && points.point_type() == PointType::Vector;
        Ok(vec![fits; points.n_samples()])
    }
}

impl<T: Scalar> LieGroup<T> for Euclidean<T> {
    fn state(&self) -> &LieGroupState<T> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut LieGroupState<T> {
        &mut self.state
    }

    fn get_identity(&self, point_type: Option<PointType>) -> Result<Points<T>> {
        self.check_point_type(point_type)?;
        Ok(Points::Vector(DMatrix::zeros(1, self.state.dimension())))
    }

    fn compose(&self, a: &Points<T>, b: &Points<T>, point_type: Option<PointType>) -> Result<Points<T>> {
        self.check_point_type(point_type)?;
        self.rows(a)?;
        self.rows(b)?;
        a.add(b)
    }

    fn inverse(&self, point: &Points<T>, point_type: Option<PointType>) -> Result<Points<T>> {
        self.check_point_type(point_type)?;
        Ok(Points::Vector(-self.rows(point)?.clone()))
    }

    fn regularize(&self, point: &Points<T>, point_type: Option<PointType>) -> Result<Points<T>> {
        self.check_point_type(point_type)?;
        self.rows(point)?;
        Ok(point.clone())
    }

    fn jacobian_translation(
        &self,
        point: &Points<T>,
        _side: TranslationSide,
        point_type: Option<PointType>,
    ) -> Result<Vec<DMatrix<T>>> {
        self.check_point_type(point_type)?;
        let n = self.rows(point)?.nrows();
        let dim = self.state.dimension();
        Ok(vec![DMatrix::identity(dim, dim); n])
    }

    fn group_exp_from_identity(
        &self,
        tangent_vec: &TangentVectors<T>,
        point_type: Option<PointType>,
    ) -> Result<Points<T>> {
        self.regularize(tangent_vec, point_type)
    }

    fn group_log_from_identity(
        &self,
        point: &Points<T>,
        point_type: Option<PointType>,
    ) -> Result<TangentVectors<T>> {
        self.regularize(point, point_type)
    }

    /// The weighted average of the points.
    fn group_exponential_barycenter(
        &self,
        points: &Points<T>,
        weights: Option<&[T]>,
        point_type: Option<PointType>,
    ) -> Result<Points<T>> {
        self.check_point_type(point_type)?;
        self.mean(points, weights)
    }
}
