//! Group exponential and logarithm at an arbitrary base point.
//!
//! Both are reduced to the operations at the identity. When every base point
//! of the batch is the identity the group's own `*_from_identity` operation is
//! called directly. Otherwise the tangent data is moved to the identity and
//! back:
//!
//! - vector layout: through the Jacobian `J` of the left translation by the
//!   base point, `v ↦ J⁻¹·v` on the way in and `u ↦ J·u` on the way out
//! - matrix layout: the differential of the left translation by `P` is
//!   `X ↦ P·X`, so the pull-back is `P⁻¹·V` and the push-forward `P·U`
//!
//! Only the selected branch is evaluated.

use crate::{
    error::{ManifoldError, Result},
    lie::group::LieGroup,
    points::{broadcast_len, Points, TangentVectors},
    types::{DMatrix, PointType, Scalar, TranslationSide},
};

/// Layout of an operation: the override if given, the group default otherwise.
fn resolve_point_type<T, G>(group: &G, point_type: Option<PointType>) -> PointType
where
    T: Scalar,
    G: LieGroup<T> + ?Sized,
{
    point_type.unwrap_or_else(|| group.default_point_type())
}

/// Checks layouts and broadcasting of an operand against the base point and
/// the identity. Returns the broadcast sample count.
fn check_operands<T: Scalar>(
    operand: &Points<T>,
    base_point: Option<&Points<T>>,
    identity: &Points<T>,
    point_type: PointType,
) -> Result<usize> {
    operand.expect_layout(point_type)?;
    identity.expect_layout(point_type)?;
    let n = broadcast_len(operand, identity)?;
    match base_point {
        Some(base) => broadcast_len(&operand.broadcast_to(n)?, base),
        None => Ok(n),
    }
}

/// Jacobians of the left translation, checked against the batch size.
fn left_jacobians<T, G>(group: &G, base_point: &Points<T>, n: usize) -> Result<Vec<DMatrix<T>>>
where
    T: Scalar,
    G: LieGroup<T> + ?Sized,
{
    let jacobians =
        group.jacobian_translation(base_point, TranslationSide::Left, Some(PointType::Vector))?;
    let dim = group.dimension();
    if jacobians.len() != n {
        return Err(ManifoldError::shape_mismatch(
            format!("{} jacobians", n),
            jacobians.len(),
        ));
    }
    if let Some(bad) = jacobians.iter().find(|j| j.shape() != (dim, dim)) {
        return Err(ManifoldError::shape_mismatch(
            format!("{0}x{0} jacobians", dim),
            format!("a {}x{} jacobian", bad.nrows(), bad.ncols()),
        ));
    }
    Ok(jacobians)
}

/// Applies one matrix per sample to the rows of a vector batch.
fn apply_rowwise<T: Scalar>(matrices: &[DMatrix<T>], vectors: &Points<T>) -> Result<Points<T>> {
    let rows = vectors.as_vectors()?;
    if rows.nrows() != matrices.len()
        || matrices.iter().any(|m| m.ncols() != rows.ncols() || m.nrows() != rows.ncols())
    {
        return Err(ManifoldError::shape_mismatch(
            format!("{} samples of dimension {}", matrices.len(), rows.ncols()),
            format!("{} samples of dimension {}", rows.nrows(), rows.ncols()),
        ));
    }
    let mut out = DMatrix::zeros(rows.nrows(), rows.ncols());
    for (i, m) in matrices.iter().enumerate() {
        let v = m * rows.row(i).transpose();
        out.set_row(i, &v.transpose());
    }
    Ok(Points::Vector(out))
}

/// Per-sample matrix product `aᵢ · bᵢ` of two batches of equal length.
fn matmul_batch<T: Scalar>(a: &[DMatrix<T>], b: &[DMatrix<T>]) -> Vec<DMatrix<T>> {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).collect()
}

/// See [`LieGroup::group_exp`].
pub fn group_exp<T, G>(
    group: &G,
    tangent_vec: &TangentVectors<T>,
    base_point: Option<&Points<T>>,
    point_type: Option<PointType>,
) -> Result<Points<T>>
where
    T: Scalar,
    G: LieGroup<T> + ?Sized,
{
    let point_type = resolve_point_type(group, point_type);
    let identity = group.get_identity(Some(point_type))?;
    let n = check_operands(tangent_vec, base_point, &identity, point_type)?;

    let identity = group.regularize(&identity, Some(point_type))?;
    let base_point = match base_point {
        Some(base) => group.regularize(base, Some(point_type))?,
        None => identity.clone(),
    };
    let tangent_vec = tangent_vec.broadcast_to(n)?;
    let base_point = base_point.broadcast_to(n)?;

    if base_point.allclose(&identity) {
        tracing::debug!(group = group.name(), n_samples = n, "group_exp at the identity");
        return group.group_exp_from_identity(&tangent_vec, Some(point_type));
    }

    tracing::debug!(group = group.name(), n_samples = n, "group_exp away from the identity");
    let tangent_vec_at_id = match point_type {
        PointType::Vector => {
            let inverse_jacobians = left_jacobians(group, &base_point, n)?
                .into_iter()
                .map(|j| {
                    j.try_inverse().ok_or_else(|| {
                        ManifoldError::numerical_error("jacobian of the left translation is singular")
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            apply_rowwise(&inverse_jacobians, &tangent_vec)?
        }
        PointType::Matrix => {
            let inverse_base = group.inverse(&base_point, Some(point_type))?.broadcast_to(n)?;
            Points::Matrix(matmul_batch(
                inverse_base.as_matrices()?,
                tangent_vec.as_matrices()?,
            ))
        }
    };

    let exp_at_id = group.group_exp_from_identity(&tangent_vec_at_id, Some(point_type))?;
    let exp = group.compose(&base_point, &exp_at_id, Some(point_type))?;
    group.regularize(&exp, Some(point_type))
}

/// See [`LieGroup::group_log`].
pub fn group_log<T, G>(
    group: &G,
    point: &Points<T>,
    base_point: Option<&Points<T>>,
    point_type: Option<PointType>,
) -> Result<TangentVectors<T>>
where
    T: Scalar,
    G: LieGroup<T> + ?Sized,
{
    let point_type = resolve_point_type(group, point_type);
    let identity = group.get_identity(Some(point_type))?;
    let n = check_operands(point, base_point, &identity, point_type)?;

    let identity = group.regularize(&identity, Some(point_type))?;
    let point = group.regularize(point, Some(point_type))?.broadcast_to(n)?;
    let base_point = match base_point {
        Some(base) => group.regularize(base, Some(point_type))?,
        None => identity.clone(),
    }
    .broadcast_to(n)?;

    if base_point.allclose(&identity) {
        tracing::debug!(group = group.name(), n_samples = n, "group_log at the identity");
        return group.group_log_from_identity(&point, Some(point_type));
    }

    tracing::debug!(group = group.name(), n_samples = n, "group_log away from the identity");
    let inverse_base = group.inverse(&base_point, Some(point_type))?;
    let point_near_id = group.compose(&inverse_base, &point, Some(point_type))?;
    let log_at_id = group.group_log_from_identity(&point_near_id, Some(point_type))?;

    let log = match point_type {
        PointType::Vector => {
            let jacobians = left_jacobians(group, &base_point, n)?;
            apply_rowwise(&jacobians, &log_at_id)?
        }
        PointType::Matrix => Points::Matrix(matmul_batch(
            base_point.as_matrices()?,
            log_at_id.as_matrices()?,
        )),
    };
    debug_assert_eq!(log.n_samples(), n, "group_log must keep one sample per input");
    Ok(log)
}

/// See [`LieGroup::lie_bracket`].
pub fn lie_bracket<T, G>(
    group: &G,
    tangent_vec_a: &TangentVectors<T>,
    tangent_vec_b: &TangentVectors<T>,
    base_point: Option<&Points<T>>,
) -> Result<TangentVectors<T>>
where
    T: Scalar,
    G: LieGroup<T> + ?Sized,
{
    tangent_vec_a.expect_layout(PointType::Matrix)?;
    let mut n = broadcast_len(tangent_vec_a, tangent_vec_b)?;

    let base_point = match base_point {
        Some(base) => base.clone(),
        None => group.get_identity(Some(PointType::Matrix))?,
    };
    n = broadcast_len(&tangent_vec_a.broadcast_to(n)?, &base_point)?;

    let inverse_base = group
        .inverse(&base_point, Some(PointType::Matrix))?
        .broadcast_to(n)?;
    let a = tangent_vec_a.broadcast_to(n)?;
    let b = tangent_vec_b.broadcast_to(n)?;

    let bracket = inverse_base
        .as_matrices()?
        .iter()
        .zip(a.as_matrices()?.iter().zip(b.as_matrices()?.iter()))
        .map(|(p_inv, (a, b))| a * p_inv * b - b * p_inv * a)
        .collect();
    Ok(Points::Matrix(bracket))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        lie::group::LieGroupState,
        manifold::Manifold,
        test_utils::AffineLine,
    };
    use approx::assert_relative_eq;
    use nalgebra::dvector;

    /// GL(2) restricted to what the bracket and the matrix branch need.
    #[derive(Debug)]
    struct Gl2 {
        state: LieGroupState<f64>,
    }

    impl Gl2 {
        fn new() -> Self {
            Self {
                state: LieGroupState::new(4, PointType::Matrix).unwrap(),
            }
        }
    }

    impl Manifold<f64> for Gl2 {
        fn name(&self) -> &str {
            "Gl2"
        }

        fn dimension(&self) -> usize {
            4
        }
    }

    impl LieGroup<f64> for Gl2 {
        fn state(&self) -> &LieGroupState<f64> {
            &self.state
        }

        fn state_mut(&mut self) -> &mut LieGroupState<f64> {
            &mut self.state
        }

        fn get_identity(&self, _point_type: Option<PointType>) -> Result<Points<f64>> {
            Ok(Points::matrix(DMatrix::identity(2, 2)))
        }

        fn compose(
            &self,
            a: &Points<f64>,
            b: &Points<f64>,
            _point_type: Option<PointType>,
        ) -> Result<Points<f64>> {
            let n = broadcast_len(a, b)?;
            let (a, b) = (a.broadcast_to(n)?, b.broadcast_to(n)?);
            Ok(Points::Matrix(matmul_batch(a.as_matrices()?, b.as_matrices()?)))
        }

        fn inverse(&self, point: &Points<f64>, _point_type: Option<PointType>) -> Result<Points<f64>> {
            point
                .as_matrices()?
                .iter()
                .map(|m| {
                    m.clone()
                        .try_inverse()
                        .ok_or_else(|| ManifoldError::numerical_error("singular"))
                })
                .collect::<Result<Vec<_>>>()
                .map(Points::Matrix)
        }

        fn regularize(&self, point: &Points<f64>, _point_type: Option<PointType>) -> Result<Points<f64>> {
            Ok(point.clone())
        }

        fn group_exp_from_identity(
            &self,
            tangent_vec: &TangentVectors<f64>,
            _point_type: Option<PointType>,
        ) -> Result<Points<f64>> {
            Ok(Points::Matrix(
                tangent_vec.as_matrices()?.iter().map(|m| m.exp()).collect(),
            ))
        }
    }

    #[test]
    fn test_lie_bracket_at_identity_is_commutator() {
        let group = Gl2::new();
        let a = Points::matrix(DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 0.0, 0.0]));
        let b = Points::matrix(DMatrix::from_row_slice(2, 2, &[0.0, 0.0, 1.0, 0.0]));

        let bracket = group.lie_bracket(&a, &b, None).unwrap();
        let expected = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, -1.0]);
        assert_relative_eq!(bracket.as_matrices().unwrap()[0], expected, epsilon = 1e-14);
    }

    #[test]
    fn test_lie_bracket_broadcasts_base_points() {
        let group = Gl2::new();
        let a = Points::matrix(DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 0.0, 1.0]));
        let b = Points::matrix(DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 3.0]));
        let p = DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 1.0, 1.0]);
        let bases = Points::matrices(vec![DMatrix::identity(2, 2), p.clone()]);

        let bracket = group.lie_bracket(&a, &b, Some(&bases)).unwrap();
        assert_eq!(bracket.n_samples(), 2);

        let (a, b) = (&a.as_matrices().unwrap()[0], &b.as_matrices().unwrap()[0]);
        let p_inv = p.try_inverse().unwrap();
        let expected = a * &p_inv * b - b * &p_inv * a;
        assert_relative_eq!(bracket.as_matrices().unwrap()[1], expected, epsilon = 1e-12);
    }

    #[test]
    fn test_lie_bracket_rejects_vector_layout() {
        let group = Gl2::new();
        let v = Points::vector(dvector![1.0, 2.0, 3.0, 4.0]);
        assert!(group.lie_bracket(&v, &v, None).unwrap_err().is_shape_error());
    }

    #[test]
    fn test_matrix_exp_away_from_identity_translates_on_the_left() {
        let group = Gl2::new();
        let p = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 0.0, 1.0]);
        let x = DMatrix::from_row_slice(2, 2, &[0.1, 0.2, -0.3, 0.0]);
        let tangent = Points::matrix(&p * &x);

        let exp = group
            .group_exp(&tangent, Some(&Points::matrix(p.clone())), None)
            .unwrap();
        assert_relative_eq!(exp.as_matrices().unwrap()[0], &p * x.exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_point_type_override_must_match_operands() {
        let group = AffineLine::<f64>::new();
        let tangent = Points::vector(dvector![0.1, 0.2]);
        let err = group
            .group_exp(&tangent, None, Some(PointType::Matrix))
            .unwrap_err();
        assert!(err.is_shape_error());
    }

    #[test]
    fn test_vector_exp_log_roundtrip_away_from_identity() {
        let group = AffineLine::<f64>::new();
        let base = Points::vector(dvector![0.4, -1.0]);
        let tangent = Points::vector(dvector![0.3, 0.7]);

        let exp = group.group_exp(&tangent, Some(&base), None).unwrap();
        let log = group.group_log(&exp, Some(&base), None).unwrap();
        assert!(log.allclose(&tangent));
    }

    #[test]
    fn test_incompatible_batches_fail_before_numerics() {
        let group = AffineLine::<f64>::new();
        let tangents = Points::vectors(DMatrix::from_element(3, 2, 0.1));
        let bases = Points::vectors(DMatrix::from_element(2, 2, 0.5));
        assert!(group
            .group_exp(&tangents, Some(&bases), None)
            .unwrap_err()
            .is_shape_error());
        assert!(group
            .group_log(&tangents, Some(&bases), None)
            .unwrap_err()
            .is_shape_error());
    }
}
