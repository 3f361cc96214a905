//! Weighted means and the iterative group exponential barycenter.
//!
//! The barycenter `m` of points `xᵢ` with weights `wᵢ` is the fixed point of
//!
//! ```text
//! m ← m · exp( Σ wᵢ · log(m⁻¹ · xᵢ) / Σ wᵢ )
//! ```
//!
//! where `exp` and `log` are taken at the identity. The iteration starts
//! from the first point and stops once the update is below the tolerance or
//! the iteration cap is reached.

use geomlie_core::{
    error::{ManifoldError, Result},
    lie::LieGroup,
    points::Points,
    types::{DMatrix, PointType, Scalar},
};
use num_traits::Float;

/// Stopping rule of [`iterative_barycenter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarycenterOptions<T> {
    /// Maximum number of fixed-point updates.
    pub max_iterations: usize,
    /// Largest absolute entry of the update below which the iteration stops.
    pub tolerance: T,
}

impl<T: Scalar> Default for BarycenterOptions<T> {
    fn default() -> Self {
        Self {
            max_iterations: 64,
            tolerance: T::DEFAULT_TOLERANCE,
        }
    }
}

/// Checks barycenter weights and fills in the default of 1 per point.
///
/// # Errors
///
/// Returns a shape error if the batch is empty or the number of weights
/// differs from the number of points, and an invalid parameter error if a
/// weight is negative or not finite or the weights sum to zero.
pub fn validate_weights<T: Scalar>(weights: Option<&[T]>, n_points: usize) -> Result<Vec<T>> {
    if n_points == 0 {
        return Err(ManifoldError::shape_mismatch("at least one point", "an empty batch"));
    }
    let weights = match weights {
        None => return Ok(vec![T::one(); n_points]),
        Some(w) => w,
    };
    if weights.len() != n_points {
        return Err(ManifoldError::shape_mismatch(
            format!("{} weights", n_points),
            format!("{} weights", weights.len()),
        ));
    }
    if let Some(bad) = weights
        .iter()
        .find(|w| !<T as Float>::is_finite(**w) || **w < T::zero())
    {
        return Err(ManifoldError::invalid_parameter(format!(
            "weights must be finite and non-negative, got {}",
            bad
        )));
    }
    let total = weights.iter().fold(T::zero(), |acc, w| acc + *w);
    if total <= T::zero() {
        return Err(ManifoldError::invalid_parameter("weights must have a positive sum"));
    }
    Ok(weights.to_vec())
}

/// Weighted average of the samples of a batch, as a batch of one.
///
/// `weights` must already be validated against the batch.
pub fn weighted_mean<T: Scalar>(points: &Points<T>, weights: &[T]) -> Result<Points<T>> {
    if weights.len() != points.n_samples() {
        return Err(ManifoldError::shape_mismatch(
            format!("{} weights", points.n_samples()),
            format!("{} weights", weights.len()),
        ));
    }
    let total = weights.iter().fold(T::zero(), |acc, w| acc + *w);
    match points {
        Points::Vector(rows) => {
            let mean = DMatrix::from_fn(1, rows.ncols(), |_, j| {
                weights
                    .iter()
                    .enumerate()
                    .fold(T::zero(), |acc, (i, w)| acc + rows[(i, j)] * *w)
            });
            Ok(Points::Vector(mean / total))
        }
        Points::Matrix(ms) => {
            let (n, m) = ms
                .first()
                .map(|x| x.shape())
                .ok_or_else(|| ManifoldError::shape_mismatch("at least one point", "an empty batch"))?;
            let mean = ms
                .iter()
                .zip(weights.iter())
                .fold(DMatrix::zeros(n, m), |acc, (x, w)| acc + x * *w);
            Ok(Points::Matrix(vec![mean / total]))
        }
    }
}

/// Group exponential barycenter by fixed-point iteration.
pub fn iterative_barycenter<T, G>(
    group: &G,
    points: &Points<T>,
    weights: Option<&[T]>,
    point_type: Option<PointType>,
    options: &BarycenterOptions<T>,
) -> Result<Points<T>>
where
    T: Scalar,
    G: LieGroup<T> + ?Sized,
{
    let point_type = point_type.unwrap_or_else(|| group.default_point_type());
    points.expect_layout(point_type)?;
    let weights = validate_weights(weights, points.n_samples())?;
    let pt = Some(point_type);

    let mut mean = group.regularize(&points.sample(0)?, pt)?;
    for iteration in 0..options.max_iterations {
        let relative = group.compose(&group.inverse(&mean, pt)?, points, pt)?;
        let logs = group.group_log_from_identity(&relative, pt)?;
        let update = weighted_mean(&logs, &weights)?;
        let step = group.group_exp_from_identity(&update, pt)?;
        mean = group.regularize(&group.compose(&mean, &step, pt)?, pt)?;

        if update.max_abs() <= options.tolerance {
            tracing::trace!(group = group.name(), iterations = iteration + 1, "barycenter converged");
            return Ok(mean);
        }
    }

    tracing::debug!(
        group = group.name(),
        max_iterations = options.max_iterations,
        "barycenter stopped at the iteration cap"
    );
    Ok(mean)
}
