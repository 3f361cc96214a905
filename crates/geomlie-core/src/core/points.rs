//! Batched group elements and tangent vectors.
//!
//! A [`Points`] value is always a batch. The layout is carried by the variant:
//! in vector layout the samples are the rows of a `(n_samples, dimension)`
//! matrix, in matrix layout each sample is an `(n, n)` matrix. Single samples
//! are promoted explicitly through [`Points::vector`] and [`Points::matrix`].
//!
//! Binary operations follow one broadcasting rule: the sample counts must be
//! equal or one of them must be 1, in which case that operand is replicated.

use crate::{
    error::{ManifoldError, Result},
    types::{DMatrix, DVector, PointType, Scalar},
};
use num_traits::Float;

/// A batch of group elements in one of the two layouts.
#[derive(Debug, Clone, PartialEq)]
pub enum Points<T: Scalar> {
    /// Vector layout, one sample per row: shape (n_samples, dimension).
    Vector(DMatrix<T>),
    /// Matrix layout: shape (n_samples, n, n).
    Matrix(Vec<DMatrix<T>>),
}

/// Tangent vectors share the shape contract of points.
pub type TangentVectors<T> = Points<T>;

impl<T: Scalar> Points<T> {
    /// Promote a single vector to a batch of one.
    pub fn vector(v: DVector<T>) -> Self {
        Self::Vector(DMatrix::from_row_slice(1, v.len(), v.as_slice()))
    }

    /// Wrap a batch of vectors stored as rows.
    pub fn vectors(rows: DMatrix<T>) -> Self {
        Self::Vector(rows)
    }

    /// Build a vector batch from individual samples.
    pub fn from_vectors(samples: &[DVector<T>]) -> Result<Self> {
        let dim = samples.first().map(|v| v.len()).ok_or_else(|| {
            ManifoldError::shape_mismatch("at least one sample", "an empty batch")
        })?;
        if let Some(bad) = samples.iter().find(|v| v.len() != dim) {
            return Err(ManifoldError::shape_mismatch(
                format!("vectors of dimension {}", dim),
                format!("a vector of dimension {}", bad.len()),
            ));
        }
        Ok(Self::Vector(DMatrix::from_fn(samples.len(), dim, |i, j| {
            samples[i][j]
        })))
    }

    /// Promote a single matrix to a batch of one.
    pub fn matrix(m: DMatrix<T>) -> Self {
        Self::Matrix(vec![m])
    }

    /// Wrap a batch of matrices.
    pub fn matrices(ms: Vec<DMatrix<T>>) -> Self {
        Self::Matrix(ms)
    }

    /// Layout of this batch.
    pub fn point_type(&self) -> PointType {
        match self {
            Self::Vector(_) => PointType::Vector,
            Self::Matrix(_) => PointType::Matrix,
        }
    }

    /// Number of samples in the batch.
    pub fn n_samples(&self) -> usize {
        match self {
            Self::Vector(rows) => rows.nrows(),
            Self::Matrix(ms) => ms.len(),
        }
    }

    /// Shape of one sample: `(1, dimension)` or `(n, n)`.
    pub fn sample_shape(&self) -> Option<(usize, usize)> {
        match self {
            Self::Vector(rows) => Some((1, rows.ncols())),
            Self::Matrix(ms) => ms.first().map(|m| m.shape()),
        }
    }

    /// Fail with a shape error unless the batch has the given layout.
    pub fn expect_layout(&self, point_type: PointType) -> Result<()> {
        if self.point_type() != point_type {
            return Err(ManifoldError::shape_mismatch(
                format!("{} layout", point_type),
                format!("{} layout", self.point_type()),
            ));
        }
        Ok(())
    }

    /// Borrow the rows of a vector batch.
    pub fn as_vectors(&self) -> Result<&DMatrix<T>> {
        match self {
            Self::Vector(rows) => Ok(rows),
            Self::Matrix(_) => Err(ManifoldError::shape_mismatch(
                "vector layout",
                "matrix layout",
            )),
        }
    }

    /// Borrow the matrices of a matrix batch.
    pub fn as_matrices(&self) -> Result<&[DMatrix<T>]> {
        match self {
            Self::Matrix(ms) => Ok(ms.as_slice()),
            Self::Vector(_) => Err(ManifoldError::shape_mismatch(
                "matrix layout",
                "vector layout",
            )),
        }
    }

    /// Sample `i` of a vector batch as a column vector.
    pub fn vector_at(&self, i: usize) -> Result<DVector<T>> {
        let rows = self.as_vectors()?;
        if i >= rows.nrows() {
            return Err(ManifoldError::shape_mismatch(
                format!("sample index below {}", rows.nrows()),
                i,
            ));
        }
        Ok(rows.row(i).transpose())
    }

    /// Sample `i` as a batch of one, in the same layout.
    pub fn sample(&self, i: usize) -> Result<Self> {
        if i >= self.n_samples() {
            return Err(ManifoldError::shape_mismatch(
                format!("sample index below {}", self.n_samples()),
                i,
            ));
        }
        Ok(match self {
            Self::Vector(rows) => Self::Vector(rows.rows(i, 1).into_owned()),
            Self::Matrix(ms) => Self::Matrix(vec![ms[i].clone()]),
        })
    }

    /// All samples of a vector batch as column vectors.
    pub fn to_vec_of_vectors(&self) -> Result<Vec<DVector<T>>> {
        let rows = self.as_vectors()?;
        Ok((0..rows.nrows()).map(|i| rows.row(i).transpose()).collect())
    }

    /// Replicate a batch of one to `n` samples, or check it already has `n`.
    pub fn broadcast_to(&self, n: usize) -> Result<Self> {
        let count = self.n_samples();
        if count == n {
            return Ok(self.clone());
        }
        if count != 1 {
            return Err(ManifoldError::shape_mismatch(
                format!("a batch of {} or 1 samples", n),
                format!("a batch of {} samples", count),
            ));
        }
        Ok(match self {
            Self::Vector(rows) => {
                Self::Vector(DMatrix::from_fn(n, rows.ncols(), |_, j| rows[(0, j)]))
            }
            Self::Matrix(ms) => Self::Matrix(vec![ms[0].clone(); n]),
        })
    }

    /// Apply a function to every sample matrix (matrix layout) or to the
    /// whole row matrix (vector layout).
    pub fn map_entries<F: Fn(T) -> T>(&self, f: F) -> Self {
        match self {
            Self::Vector(rows) => Self::Vector(rows.map(|x| f(x))),
            Self::Matrix(ms) => Self::Matrix(ms.iter().map(|m| m.map(|x| f(x))).collect()),
        }
    }

    /// Multiply every entry by `s`.
    pub fn scale(&self, s: T) -> Self {
        self.map_entries(|x| x * s)
    }

    /// A batch of zeros with the same shape.
    pub fn zeros_like(&self) -> Self {
        self.map_entries(|_| T::zero())
    }

    /// Elementwise sum with broadcasting.
    pub fn add(&self, other: &Self) -> Result<Self> {
        let (a, b) = broadcast_pair(self, other)?;
        Ok(match (a, b) {
            (Self::Vector(x), Self::Vector(y)) => Self::Vector(x + y),
            (Self::Matrix(x), Self::Matrix(y)) => {
                Self::Matrix(x.iter().zip(y.iter()).map(|(p, q)| p + q).collect())
            }
            _ => unreachable!("broadcast_pair checks the layouts"),
        })
    }

    /// Elementwise difference with broadcasting.
    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.add(&other.scale(-T::one()))
    }

    /// Largest absolute entry, 0 for an empty batch.
    pub fn max_abs(&self) -> T {
        let fold = |acc: T, x: &T| <T as Float>::max(acc, <T as Float>::abs(*x));
        match self {
            Self::Vector(rows) => rows.iter().fold(T::zero(), fold),
            Self::Matrix(ms) => ms
                .iter()
                .map(|m| m.iter().fold(T::zero(), fold))
                .fold(T::zero(), <T as Float>::max),
        }
    }

    /// Whether every entry is finite.
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Vector(rows) => rows.iter().all(|x| <T as Float>::is_finite(*x)),
            Self::Matrix(ms) => ms
                .iter()
                .all(|m| m.iter().all(|x| <T as Float>::is_finite(*x))),
        }
    }

    /// Batched approximate equality with the scalar's default tolerances.
    ///
    /// See [`Points::allclose_with`].
    pub fn allclose(&self, other: &Self) -> bool {
        self.allclose_with(other, T::ALLCLOSE_RTOL, T::ALLCLOSE_ATOL)
    }

    /// Batched approximate equality: `|a - b| <= atol + rtol * |b|` entrywise.
    ///
    /// A batch of one on either side is compared against every sample of the
    /// other. Layout, sample-shape or unbroadcastable count mismatches compare
    /// unequal.
    pub fn allclose_with(&self, other: &Self, rtol: T, atol: T) -> bool {
        let (a, b) = match broadcast_pair(self, other) {
            Ok(pair) => pair,
            Err(_) => return false,
        };
        match (&a, &b) {
            (Self::Vector(x), Self::Vector(y)) => allclose_matrices(x, y, rtol, atol),
            (Self::Matrix(x), Self::Matrix(y)) => x
                .iter()
                .zip(y.iter())
                .all(|(p, q)| allclose_matrices(p, q, rtol, atol)),
            _ => false,
        }
    }
}

/// Entrywise `|a - b| <= atol + rtol * |b|` over two equally shaped matrices.
pub fn allclose_matrices<T: Scalar>(a: &DMatrix<T>, b: &DMatrix<T>, rtol: T, atol: T) -> bool {
    a.shape() == b.shape()
        && a.iter().zip(b.iter()).all(|(x, y)| {
            <T as Float>::abs(*x - *y) <= atol + rtol * <T as Float>::abs(*y)
        })
}

/// Common sample count of two batches under the broadcasting rule.
///
/// Fails with a shape error when the layouts differ, the per-sample shapes
/// differ, either batch is empty, or the counts differ and neither is 1.
pub fn broadcast_len<T: Scalar>(a: &Points<T>, b: &Points<T>) -> Result<usize> {
    b.expect_layout(a.point_type())?;

    let (na, nb) = (a.n_samples(), b.n_samples());
    if na == 0 || nb == 0 {
        return Err(ManifoldError::shape_mismatch(
            "non-empty batches",
            format!("batches of {} and {} samples", na, nb),
        ));
    }
    if a.sample_shape() != b.sample_shape() {
        return Err(ManifoldError::shape_mismatch(
            format!("samples of shape {:?}", a.sample_shape()),
            format!("samples of shape {:?}", b.sample_shape()),
        ));
    }
    if let Points::Matrix(ms) = a {
        check_uniform(ms)?;
    }
    if let Points::Matrix(ms) = b {
        check_uniform(ms)?;
    }
    if na != nb && na != 1 && nb != 1 {
        return Err(ManifoldError::shape_mismatch(
            format!("batch sizes equal or 1 (got {} first)", na),
            format!("batch size {}", nb),
        ));
    }
    Ok(na.max(nb))
}

/// Broadcast two batches to a common sample count.
///
/// See [`broadcast_len`] for the failure conditions.
pub fn broadcast_pair<T: Scalar>(a: &Points<T>, b: &Points<T>) -> Result<(Points<T>, Points<T>)> {
    let n = broadcast_len(a, b)?;
    Ok((a.broadcast_to(n)?, b.broadcast_to(n)?))
}

fn check_uniform<T: Scalar>(ms: &[DMatrix<T>]) -> Result<()> {
    if let Some(first) = ms.first() {
        if let Some(bad) = ms.iter().find(|m| m.shape() != first.shape()) {
            return Err(ManifoldError::shape_mismatch(
                format!("all samples of shape {:?}", first.shape()),
                format!("a sample of shape {:?}", bad.shape()),
            ));
        }
    }
    Ok(())
}
