//! Test utilities shared by the workspace.
//!
//! Deterministic random generators for matrices and rotation vectors, and a
//! small non-commutative reference group with closed-form operations.

use crate::{
    error::{ManifoldError, Result},
    lie::{LieGroup, LieGroupState},
    manifold::Manifold,
    points::{broadcast_len, Points, TangentVectors},
    types::{DMatrix, PointType, Scalar, TranslationSide},
};
use num_traits::Float;
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Deterministic generator for reproducible tests.
pub fn seeded_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

/// Square matrix with entries uniform in [-1, 1).
pub fn random_matrix<T: Scalar>(rng: &mut impl Rng, n: usize) -> DMatrix<T> {
    DMatrix::from_fn(n, n, |_, _| <T as Scalar>::from_f64(rng.gen_range(-1.0..1.0)))
}

/// Symmetric positive-definite matrix `A·Aᵀ + n·I`.
pub fn random_spd<T: Scalar>(rng: &mut impl Rng, n: usize) -> DMatrix<T> {
    let a = random_matrix::<T>(rng, n);
    let shift = DMatrix::identity(n, n) * <T as Scalar>::from_usize(n);
    let spd = &a * a.transpose() + shift;
    // Exact symmetry so the engine takes the fast path.
    DMatrix::from_fn(n, n, |i, j| if i <= j { spd[(i, j)] } else { spd[(j, i)] })
}

/// Symmetric matrix with entries uniform in [-scale, scale).
pub fn random_symmetric<T: Scalar>(rng: &mut impl Rng, n: usize, scale: f64) -> DMatrix<T> {
    let mut m = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in i..n {
            let v = <T as Scalar>::from_f64(rng.gen_range(-scale..scale));
            m[(i, j)] = v;
            m[(j, i)] = v;
        }
    }
    m
}

/// Batch of rotation vectors with angles below `max_angle`.
pub fn random_rotation_vectors<T: Scalar>(
    rng: &mut impl Rng,
    n_samples: usize,
    max_angle: f64,
) -> Points<T> {
    let rows: DMatrix<f64> = DMatrix::from_fn(n_samples, 3, |_, _| rng.gen_range(-1.0..1.0));
    let mut out = DMatrix::zeros(n_samples, 3);
    for i in 0..n_samples {
        let axis = rows.row(i);
        let norm = axis.norm().max(1e-3);
        let angle = rng.gen_range(0.0..max_angle);
        for j in 0..3 {
            out[(i, j)] = <T as Scalar>::from_f64(axis[j] / norm * angle);
        }
    }
    Points::Vector(out)
}

/// The group of affine maps `x ↦ eˢ·x + t` of the real line.
///
/// Points are `(s, t)` in vector layout. The group is not commutative and
/// its left and right Jacobians differ, which makes it a convenient
/// reference for the generic exponential and logarithm.
#[derive(Debug, Clone)]
pub struct AffineLine<T: Scalar> {
    state: LieGroupState<T>,
}

impl<T: Scalar> AffineLine<T> {
    /// The two-dimensional affine group in vector layout.
    pub fn new() -> Self {
        Self {
            state: LieGroupState::new(2, PointType::Vector).expect("dimension 2 is positive"),
        }
    }

    fn rows<'a>(&self, points: &'a Points<T>) -> Result<&'a DMatrix<T>> {
        let rows = points.as_vectors()?;
        if rows.ncols() != 2 {
            return Err(ManifoldError::shape_mismatch(
                "points of dimension 2",
                format!("points of dimension {}", rows.ncols()),
            ));
        }
        Ok(rows)
    }

    fn map_rows<F>(&self, points: &Points<T>, f: F) -> Result<Points<T>>
    where
        F: Fn(T, T) -> (T, T),
    {
        let rows = self.rows(points)?;
        let mut out = DMatrix::zeros(rows.nrows(), 2);
        for i in 0..rows.nrows() {
            let (s, t) = f(rows[(i, 0)], rows[(i, 1)]);
            out[(i, 0)] = s;
            out[(i, 1)] = t;
        }
        Ok(Points::Vector(out))
    }
}

impl<T: Scalar> Default for AffineLine<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// `(eˢ − 1)/s`, continuous at 0.
fn phi<T: Scalar>(s: T) -> T {
    if <T as Float>::abs(s) < T::SMALL_ANGLE {
        T::one() + s / <T as Scalar>::from_f64(2.0)
    } else {
        <T as Float>::exp_m1(s) / s
    }
}

impl<T: Scalar> Manifold<T> for AffineLine<T> {
    fn name(&self) -> &str {
        "AffineLine"
    }

    fn dimension(&self) -> usize {
        2
    }

    fn belongs(&self, points: &Points<T>, _tol: T) -> Result<Vec<bool>> {
        let rows = self.rows(points)?;
        Ok(rows
            .row_iter()
            .map(|r| r.iter().all(|x| <T as Float>::is_finite(*x)))
            .collect())
    }
}

impl<T: Scalar> LieGroup<T> for AffineLine<T> {
    fn state(&self) -> &LieGroupState<T> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut LieGroupState<T> {
        &mut self.state
    }

    fn get_identity(&self, point_type: Option<PointType>) -> Result<Points<T>> {
        if point_type.unwrap_or(PointType::Vector) != PointType::Vector {
            return Err(ManifoldError::shape_mismatch("vector layout", "matrix layout"));
        }
        Ok(Points::Vector(DMatrix::zeros(1, 2)))
    }

    fn compose(&self, a: &Points<T>, b: &Points<T>, _point_type: Option<PointType>) -> Result<Points<T>> {
        let n = broadcast_len(a, b)?;
        let (a, b) = (a.broadcast_to(n)?, b.broadcast_to(n)?);
        let (ra, rb) = (self.rows(&a)?, self.rows(&b)?);
        let mut out = DMatrix::zeros(n, 2);
        for i in 0..n {
            out[(i, 0)] = ra[(i, 0)] + rb[(i, 0)];
            out[(i, 1)] = <T as Float>::exp(ra[(i, 0)]) * rb[(i, 1)] + ra[(i, 1)];
        }
        Ok(Points::Vector(out))
    }

    fn inverse(&self, point: &Points<T>, _point_type: Option<PointType>) -> Result<Points<T>> {
        self.map_rows(point, |s, t| (-s, -<T as Float>::exp(-s) * t))
    }

    fn regularize(&self, point: &Points<T>, _point_type: Option<PointType>) -> Result<Points<T>> {
        self.rows(point)?;
        Ok(point.clone())
    }

    fn jacobian_translation(
        &self,
        point: &Points<T>,
        side: TranslationSide,
        _point_type: Option<PointType>,
    ) -> Result<Vec<DMatrix<T>>> {
        let rows = self.rows(point)?;
        Ok(rows
            .row_iter()
            .map(|r| {
                let mut j = DMatrix::identity(2, 2);
                match side {
                    TranslationSide::Left => j[(1, 1)] = <T as Float>::exp(r[0]),
                    TranslationSide::Right => j[(1, 0)] = r[1],
                }
                j
            })
            .collect())
    }

    fn group_exp_from_identity(
        &self,
        tangent_vec: &TangentVectors<T>,
        _point_type: Option<PointType>,
    ) -> Result<Points<T>> {
        self.map_rows(tangent_vec, |sigma, tau| (sigma, tau * phi(sigma)))
    }

    fn group_log_from_identity(
        &self,
        point: &Points<T>,
        _point_type: Option<PointType>,
    ) -> Result<TangentVectors<T>> {
        self.map_rows(point, |s, t| (s, t / phi(s)))
    }
}
