//! Integration tests for the generic group exponential and logarithm.
//!
//! The group under test is the Heisenberg group in exponential-like
//! coordinates `(x, y, z)`, with product
//! `(x, y, z)·(x', y', z') = (x + x', y + y', z + z' + x·y')`.

use geomlie_core::{
    error::{ManifoldError, Result},
    lie::{InvariantMetric, LieGroup, LieGroupState},
    manifold::Manifold,
    points::{broadcast_len, Points, TangentVectors},
    types::{DMatrix, PointType, TranslationSide},
};
use nalgebra::dvector;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[derive(Debug)]
struct Heisenberg {
    state: LieGroupState<f64>,
}

impl Heisenberg {
    fn new() -> Self {
        Self {
            state: LieGroupState::new(3, PointType::Vector).unwrap(),
        }
    }

    fn map_rows(
        &self,
        points: &Points<f64>,
        f: impl Fn(f64, f64, f64) -> [f64; 3],
    ) -> Result<Points<f64>> {
        let rows = points.as_vectors()?;
        let mut out = DMatrix::zeros(rows.nrows(), 3);
        for i in 0..rows.nrows() {
            let v = f(rows[(i, 0)], rows[(i, 1)], rows[(i, 2)]);
            for j in 0..3 {
                out[(i, j)] = v[j];
            }
        }
        Ok(Points::Vector(out))
    }
}

impl Manifold<f64> for Heisenberg {
    fn name(&self) -> &str {
        "Heisenberg"
    }

    fn dimension(&self) -> usize {
        3
    }
}

impl LieGroup<f64> for Heisenberg {
    fn state(&self) -> &LieGroupState<f64> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut LieGroupState<f64> {
        &mut self.state
    }

    fn get_identity(&self, point_type: Option<PointType>) -> Result<Points<f64>> {
        match point_type.unwrap_or(PointType::Vector) {
            PointType::Vector => Ok(Points::vector(dvector![0.0, 0.0, 0.0])),
            PointType::Matrix => Err(ManifoldError::shape_mismatch("vector layout", "matrix layout")),
        }
    }

    fn compose(
        &self,
        a: &Points<f64>,
        b: &Points<f64>,
        _point_type: Option<PointType>,
    ) -> Result<Points<f64>> {
        let n = broadcast_len(a, b)?;
        let (a, b) = (a.broadcast_to(n)?, b.broadcast_to(n)?);
        let (ra, rb) = (a.as_vectors()?, b.as_vectors()?);
        Ok(Points::Vector(DMatrix::from_fn(n, 3, |i, j| match j {
            2 => ra[(i, 2)] + rb[(i, 2)] + ra[(i, 0)] * rb[(i, 1)],
            _ => ra[(i, j)] + rb[(i, j)],
        })))
    }

    fn inverse(&self, point: &Points<f64>, _point_type: Option<PointType>) -> Result<Points<f64>> {
        self.map_rows(point, |x, y, z| [-x, -y, -z + x * y])
    }

    fn regularize(&self, point: &Points<f64>, _point_type: Option<PointType>) -> Result<Points<f64>> {
        Ok(point.clone())
    }

    fn jacobian_translation(
        &self,
        point: &Points<f64>,
        side: TranslationSide,
        _point_type: Option<PointType>,
    ) -> Result<Vec<DMatrix<f64>>> {
        let rows = point.as_vectors()?;
        Ok(rows
            .row_iter()
            .map(|r| {
                let mut j = DMatrix::identity(3, 3);
                match side {
                    TranslationSide::Left => j[(2, 1)] = r[0],
                    TranslationSide::Right => j[(2, 0)] = r[1],
                }
                j
            })
            .collect())
    }

    fn group_exp_from_identity(
        &self,
        tangent_vec: &TangentVectors<f64>,
        _point_type: Option<PointType>,
    ) -> Result<Points<f64>> {
        self.map_rows(tangent_vec, |a, b, c| [a, b, c + 0.5 * a * b])
    }

    fn group_log_from_identity(
        &self,
        point: &Points<f64>,
        _point_type: Option<PointType>,
    ) -> Result<TangentVectors<f64>> {
        self.map_rows(point, |x, y, z| [x, y, z - 0.5 * x * y])
    }
}

fn rows(data: &[f64]) -> Points<f64> {
    Points::vectors(DMatrix::from_row_slice(data.len() / 3, 3, data))
}

#[test]
fn test_exp_of_zero_is_the_regularized_base_point() {
    let group = Heisenberg::new();
    let base = rows(&[1.0, -2.0, 0.5, 0.3, 0.3, 0.3]);
    let zero = Points::vector(dvector![0.0, 0.0, 0.0]);

    let exp = group.group_exp(&zero, Some(&base), None).unwrap();
    let regularized = group.regularize(&base, None).unwrap();
    assert!(exp.allclose(&regularized));
}

#[test]
fn test_one_tangent_many_base_points() {
    let group = Heisenberg::new();
    let tangent = Points::vector(dvector![0.2, -0.1, 0.4]);
    let bases = rows(&[1.0, 0.0, 0.0, 0.0, 2.0, 1.0, -1.0, 0.5, 3.0]);

    let batched = group.group_exp(&tangent, Some(&bases), None).unwrap();
    assert_eq!(batched.n_samples(), 3);

    for i in 0..3 {
        let base = bases.sample(i).unwrap();
        let alone = group.group_exp(&tangent, Some(&base), None).unwrap();
        assert!(batched.sample(i).unwrap().allclose(&alone));
    }
}

#[test]
fn test_mixed_identity_batch_takes_the_translated_branch() {
    // One base point is the identity, the other is not: the translated
    // formula must agree with the identity formula on the first sample.
    let group = Heisenberg::new();
    let tangent = rows(&[0.5, 0.5, 0.0, 0.5, 0.5, 0.0]);
    let bases = rows(&[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);

    let exp = group.group_exp(&tangent, Some(&bases), None).unwrap();
    let at_identity = group.group_exp_from_identity(&tangent.sample(0).unwrap(), None).unwrap();
    assert!(exp.sample(0).unwrap().allclose(&at_identity));
}

#[test]
fn test_incompatible_batch_sizes() {
    let group = Heisenberg::new();
    let three = rows(&[0.1; 9]);
    let two = rows(&[0.2; 6]);

    let err = group.group_exp(&three, Some(&two), None).unwrap_err();
    assert!(err.is_shape_error());
    let err = group.group_log(&three, Some(&two), None).unwrap_err();
    assert!(err.is_shape_error());
}

#[test]
fn test_wrong_sample_dimension() {
    let group = Heisenberg::new();
    let tangent = Points::vector(dvector![0.1, 0.2]);
    assert!(group.group_exp(&tangent, None, None).unwrap_err().is_shape_error());
}

#[test]
fn test_log_of_identity_is_zero() {
    let group = Heisenberg::new();
    let id = group.identity().unwrap();
    let log = group.group_log(&id, None, None).unwrap();
    assert_eq!(log.max_abs(), 0.0);
}

#[test]
fn test_left_metric_is_left_invariant() {
    let group = Heisenberg::new();
    let g = DMatrix::from_row_slice(3, 3, &[2.0, 0.1, 0.0, 0.1, 1.0, 0.2, 0.0, 0.2, 3.0]);
    let metric = InvariantMetric::new(g, TranslationSide::Left).unwrap();

    let base = Points::vector(dvector![0.7, -1.3, 2.0]);
    let u = Points::vector(dvector![0.3, 0.1, -0.2]);
    let v = Points::vector(dvector![-0.5, 0.4, 0.9]);

    // Push u and v forward to the base point with the left Jacobian.
    let jacobians = group
        .jacobian_translation(&base, TranslationSide::Left, None)
        .unwrap();
    let jacobian = &jacobians[0];
    let push = |w: &Points<f64>| Points::vector(jacobian * w.vector_at(0).unwrap());

    let at_base = metric
        .inner_product(&group, &push(&u), &push(&v), Some(&base))
        .unwrap();
    let at_identity = metric.inner_product_at_identity(&u, &v).unwrap();
    approx::assert_relative_eq!(at_base[0], at_identity[0], epsilon = 1e-12);
}

#[test]
fn test_registered_metrics_keep_order() {
    let mut group = Heisenberg::new();
    group
        .add_metric(InvariantMetric::canonical(3, TranslationSide::Right))
        .unwrap();
    group
        .add_metric(InvariantMetric::canonical(3, TranslationSide::Left))
        .unwrap();
    let sides: Vec<_> = group.metrics().iter().map(|m| m.side()).collect();
    assert_eq!(sides, vec![TranslationSide::Right, TranslationSide::Left]);
}

proptest! {
    #[test]
    fn prop_exp_log_roundtrip(
        t in prop::array::uniform3(-2.0f64..2.0),
        b in prop::array::uniform3(-2.0f64..2.0),
    ) {
        let group = Heisenberg::new();
        let tangent = Points::vector(dvector![t[0], t[1], t[2]]);
        let base = Points::vector(dvector![b[0], b[1], b[2]]);

        let exp = group.group_exp(&tangent, Some(&base), None).unwrap();
        let log = group.group_log(&exp, Some(&base), None).unwrap();
        prop_assert!(log.allclose_with(&tangent, 1e-9, 1e-9));

        let point = exp;
        let back = group
            .group_exp(&group.group_log(&point, Some(&base), None).unwrap(), Some(&base), None)
            .unwrap();
        prop_assert!(back.allclose_with(&point, 1e-9, 1e-9));
    }

    #[test]
    fn prop_exp_log_roundtrip_at_identity(t in prop::array::uniform3(-3.0f64..3.0)) {
        let group = Heisenberg::new();
        let tangent = Points::vector(dvector![t[0], t[1], t[2]]);
        let exp = group.group_exp(&tangent, None, None).unwrap();
        let log = group.group_log(&exp, None, None).unwrap();
        prop_assert!(log.allclose_with(&tangent, 1e-12, 1e-12));
    }
}
