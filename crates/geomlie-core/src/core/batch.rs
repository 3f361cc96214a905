//! Single-or-stack container for matrix functions.
//!
//! Matrix functions accept either one matrix or a stack of matrices. Instead
//! of promoting a 2-D array to 3-D and silently demoting it afterwards, the
//! rank is carried by the variant of [`MatrixBatch`] and every result is
//! returned in the variant its input came in.

use crate::{
    error::{ManifoldError, Result},
    types::{DMatrix, Scalar},
};
use rayon::prelude::*;

/// A single matrix or a stack of matrices.
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixBatch<T: Scalar> {
    /// One matrix, shape (n, m).
    Single(DMatrix<T>),
    /// A stack of matrices, shape (n_samples, n, m).
    Stack(Vec<DMatrix<T>>),
}

impl<T: Scalar> MatrixBatch<T> {
    /// Wrap a single matrix.
    pub fn single(matrix: DMatrix<T>) -> Self {
        Self::Single(matrix)
    }

    /// Wrap a stack of matrices.
    pub fn stack(matrices: Vec<DMatrix<T>>) -> Self {
        Self::Stack(matrices)
    }

    /// Whether the batch was given as a single matrix.
    pub fn is_single(&self) -> bool {
        matches!(self, Self::Single(_))
    }

    /// Number of matrices in the batch.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Stack(m) => m.len(),
        }
    }

    /// Whether the batch holds no matrix at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// View the batch as a slice of matrices.
    pub fn as_slice(&self) -> &[DMatrix<T>] {
        match self {
            Self::Single(m) => std::slice::from_ref(m),
            Self::Stack(m) => m.as_slice(),
        }
    }

    /// Iterate over the matrices.
    pub fn iter(&self) -> std::slice::Iter<'_, DMatrix<T>> {
        self.as_slice().iter()
    }

    /// Consume the batch, returning the matrices as a stack.
    pub fn into_vec(self) -> Vec<DMatrix<T>> {
        match self {
            Self::Single(m) => vec![m],
            Self::Stack(m) => m,
        }
    }

    /// Return the only matrix of a single-matrix batch.
    pub fn into_single(self) -> Result<DMatrix<T>> {
        match self {
            Self::Single(m) => Ok(m),
            Self::Stack(mut m) if m.len() == 1 => Ok(m.remove(0)),
            Self::Stack(m) => Err(ManifoldError::shape_mismatch(
                "a single matrix",
                format!("a stack of {} matrices", m.len()),
            )),
        }
    }

    /// Rebuild a batch with the same rank as `self` from computed matrices.
    pub(crate) fn with_rank_of(&self, mut matrices: Vec<DMatrix<T>>) -> Self {
        match self {
            Self::Single(_) if matrices.len() == 1 => Self::Single(matrices.remove(0)),
            _ => Self::Stack(matrices),
        }
    }

    /// Check that every matrix is square and they all share one size.
    ///
    /// Returns the common size `n`.
    pub fn check_square(&self) -> Result<usize> {
        let matrices = self.as_slice();
        let first = matrices.first().ok_or_else(|| {
            ManifoldError::shape_mismatch("at least one matrix", "an empty stack")
        })?;
        let n = first.nrows();
        for (i, m) in matrices.iter().enumerate() {
            if m.nrows() != m.ncols() {
                return Err(ManifoldError::shape_mismatch(
                    "square matrices",
                    format!("matrix {} of shape ({}, {})", i, m.nrows(), m.ncols()),
                ));
            }
            if m.nrows() != n {
                return Err(ManifoldError::shape_mismatch(
                    format!("({}, {}) matrices", n, n),
                    format!("matrix {} of shape ({}, {})", i, m.nrows(), m.ncols()),
                ));
            }
        }
        Ok(n)
    }

    /// Apply a fallible function to every matrix, keeping the rank.
    ///
    /// Stacks at least `parallel_threshold` long are mapped with rayon. The
    /// first error aborts the whole map; no partial batch is returned.
    pub fn try_map<F>(&self, parallel_threshold: usize, f: F) -> Result<Self>
    where
        F: Fn(&DMatrix<T>) -> Result<DMatrix<T>> + Sync + Send,
    {
        let matrices = self.as_slice();
        let mapped: Result<Vec<DMatrix<T>>> =
            if cfg!(feature = "parallel") && matrices.len() >= parallel_threshold.max(2) {
                matrices.par_iter().map(&f).collect()
            } else {
                matrices.iter().map(&f).collect()
            };
        Ok(self.with_rank_of(mapped?))
    }
}

impl<T: Scalar> From<DMatrix<T>> for MatrixBatch<T> {
    fn from(matrix: DMatrix<T>) -> Self {
        Self::Single(matrix)
    }
}

impl<T: Scalar> From<Vec<DMatrix<T>>> for MatrixBatch<T> {
    fn from(matrices: Vec<DMatrix<T>>) -> Self {
        Self::Stack(matrices)
    }
}
