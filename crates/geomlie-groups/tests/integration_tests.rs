//! Integration tests for geomlie-groups
//!
//! These tests drive the concrete groups through the generic exponential,
//! logarithm, metric and barycenter machinery of geomlie-core.

use approx::assert_relative_eq;
use geomlie_core::{
    lie::{InvariantMetric, LieGroup},
    manifold::Manifold,
    points::Points,
    test_utils::{random_matrix, random_rotation_vectors, seeded_rng},
    types::{DMatrix, PointType, TranslationSide},
};
use geomlie_groups::{
    special_orthogonal::skew_matrix, Euclidean, GeneralLinear, SpecialOrthogonal3,
};
use nalgebra::{dvector, Vector3};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn so3() -> SpecialOrthogonal3<f64> {
    SpecialOrthogonal3::new().unwrap()
}

fn skew_points(v: &Points<f64>) -> Points<f64> {
    let rows = v.as_vectors().unwrap();
    Points::matrices(
        (0..rows.nrows())
            .map(|i| {
                let s = skew_matrix(&Vector3::new(rows[(i, 0)], rows[(i, 1)], rows[(i, 2)]));
                DMatrix::from_fn(3, 3, |r, c| s[(r, c)])
            })
            .collect(),
    )
}

#[test]
fn test_so3_zero_tangent_at_matrix_identity() {
    let group = so3();
    let zero = Points::matrix(DMatrix::zeros(3, 3));
    let exp = group
        .group_exp_from_identity(&zero, Some(PointType::Matrix))
        .unwrap();
    assert_relative_eq!(exp.as_matrices().unwrap()[0], DMatrix::identity(3, 3), epsilon = 1e-14);
}

#[test]
fn test_so3_layouts_agree_through_rodrigues() {
    let group = so3();
    let mut rng = seeded_rng(11);
    let v = random_rotation_vectors::<f64>(&mut rng, 5, 3.0);

    let via_vectors = group
        .matrix_from_rotation_vector(&group.group_exp(&v, None, None).unwrap())
        .unwrap();
    let via_matrices = group
        .group_exp(&skew_points(&v), None, Some(PointType::Matrix))
        .unwrap();
    assert!(via_vectors.allclose_with(&via_matrices, 1e-8, 1e-8));

    let back = group.rotation_vector_from_matrix(&via_matrices).unwrap();
    assert!(back.allclose_with(&group.regularize(&v, None).unwrap(), 1e-8, 1e-8));
}

#[test]
fn test_so3_compose_matches_matrix_product() {
    let group = so3();
    let a = Points::vector(dvector![0.3, -0.4, 1.1]);
    let b = Points::vector(dvector![-0.9, 0.2, 0.5]);

    let ab = group.compose(&a, &b, None).unwrap();
    let ma = group.matrix_from_rotation_vector(&a).unwrap();
    let mb = group.matrix_from_rotation_vector(&b).unwrap();
    let mab = group.compose(&ma, &mb, Some(PointType::Matrix)).unwrap();
    assert!(group
        .matrix_from_rotation_vector(&ab)
        .unwrap()
        .allclose_with(&mab, 1e-10, 1e-10));
}

#[test]
fn test_so3_broadcast_one_tangent_many_bases() {
    let group = so3();
    let mut rng = seeded_rng(5);
    let bases = random_rotation_vectors::<f64>(&mut rng, 4, 2.0);
    let tangent = Points::vector(dvector![0.1, 0.2, -0.3]);

    let batched = group.group_exp(&tangent, Some(&bases), None).unwrap();
    assert_eq!(batched.n_samples(), 4);
    for i in 0..4 {
        let alone = group
            .group_exp(&tangent, Some(&bases.sample(i).unwrap()), None)
            .unwrap();
        assert!(batched.sample(i).unwrap().allclose(&alone));
    }
}

#[test]
fn test_so3_incompatible_batches() {
    let group = so3();
    let mut rng = seeded_rng(1);
    let three = random_rotation_vectors::<f64>(&mut rng, 3, 1.0);
    let two = random_rotation_vectors::<f64>(&mut rng, 2, 1.0);
    assert!(group.group_exp(&three, Some(&two), None).unwrap_err().is_shape_error());
    assert!(group.group_log(&three, Some(&two), None).unwrap_err().is_shape_error());
}

#[test]
fn test_so3_exp_of_zero_is_base_point() {
    let group = so3();
    let base = Points::vector(dvector![0.0, 4.0, 0.0]);
    let zero = Points::vector(dvector![0.0, 0.0, 0.0]);
    let exp = group.group_exp(&zero, Some(&base), None).unwrap();
    assert!(exp.allclose(&group.regularize(&base, None).unwrap()));
}

#[test]
fn test_so3_left_metric_is_left_invariant() {
    let group = so3();
    let g = DMatrix::from_row_slice(3, 3, &[2.0, 0.3, 0.0, 0.3, 1.0, 0.1, 0.0, 0.1, 1.5]);
    let metric = InvariantMetric::new(g.clone(), TranslationSide::Left).unwrap();

    let base = Points::vector(dvector![0.4, 0.9, -0.6]);
    let u = Points::vector(dvector![1.0, 0.0, 0.5]);
    let v = Points::vector(dvector![-0.2, 0.7, 0.3]);

    let jacobians = group
        .jacobian_translation(&base, TranslationSide::Left, None)
        .unwrap();
    let jacobian = &jacobians[0];
    let push = |w: &Points<f64>| Points::vector(jacobian * w.vector_at(0).unwrap());

    let at_base = metric.inner_product(&group, &push(&u), &push(&v), Some(&base)).unwrap();
    let at_identity = metric.inner_product_at_identity(&u, &v).unwrap();
    assert_relative_eq!(at_base[0], at_identity[0], epsilon = 1e-10);

    let expected = u.vector_at(0).unwrap().dot(&(&g * v.vector_at(0).unwrap()));
    assert_relative_eq!(at_identity[0], expected, epsilon = 1e-12);
}

#[test]
fn test_so3_barycenter() {
    let group = so3();
    let single = Points::vector(dvector![0.2, -0.5, 0.7]);
    let mean = group.group_exponential_barycenter(&single, None, None).unwrap();
    assert!(mean.allclose(&single));

    // Rotations about a common axis commute, so the barycenter is the
    // weighted mean of the angles.
    let points = Points::from_vectors(&[dvector![0.0, 0.0, 0.2], dvector![0.0, 0.0, 0.8]]).unwrap();
    let mean = group
        .group_exponential_barycenter(&points, Some(&[1.0, 2.0][..]), None)
        .unwrap();
    assert!(mean.allclose(&Points::vector(dvector![0.0, 0.0, 0.6])));
}

#[test]
fn test_so3_lie_bracket_is_cross_product() {
    let group = so3();
    let a = Vector3::new(1.0, 0.0, 0.5);
    let b = Vector3::new(0.0, 2.0, -1.0);
    let skew = |v: &Vector3<f64>| {
        let s = skew_matrix(v);
        Points::matrix(DMatrix::from_fn(3, 3, |r, c| s[(r, c)]))
    };
    let bracket = group.lie_bracket(&skew(&a), &skew(&b), None).unwrap();
    assert!(bracket.allclose(&skew(&a.cross(&b))));
}

#[test]
fn test_gl_exp_log_roundtrip_away_from_identity() {
    let group = GeneralLinear::<f64>::new(3).unwrap();
    let mut rng = seeded_rng(23);
    let base = Points::matrix(DMatrix::identity(3, 3) * 2.0 + random_matrix::<f64>(&mut rng, 3) * 0.3);
    let tangent = Points::matrix(random_matrix::<f64>(&mut rng, 3) * 0.4);

    let point = group.group_exp(&tangent, Some(&base), None).unwrap();
    assert_eq!(group.belongs(&point, 1e-10).unwrap(), vec![true]);
    let log = group.group_log(&point, Some(&base), None).unwrap();
    assert!(log.allclose_with(&tangent, 1e-6, 1e-8));
}

#[test]
fn test_gl_barycenter_of_commuting_matrices() {
    let group = GeneralLinear::<f64>::new(2).unwrap();
    let points = Points::matrices(vec![
        DMatrix::from_diagonal(&dvector![1.0, 4.0]),
        DMatrix::from_diagonal(&dvector![4.0, 1.0]),
    ]);
    let mean = group.group_exponential_barycenter(&points, None, None).unwrap();
    assert!(mean.allclose_with(&Points::matrix(DMatrix::identity(2, 2) * 2.0), 1e-8, 1e-8));
}

#[test]
fn test_euclidean_metrics_registration() {
    let mut space = Euclidean::<f64>::new(2).unwrap();
    space
        .add_metric(InvariantMetric::canonical(2, TranslationSide::Left))
        .unwrap();
    assert!(space
        .add_metric(InvariantMetric::canonical(3, TranslationSide::Left))
        .unwrap_err()
        .is_shape_error());
    assert_eq!(space.metrics().len(), 1);
}

#[test]
fn test_gl_single_precision_exp_log_roundtrip() {
    let group = GeneralLinear::<f32>::new(3).unwrap();
    let mut rng = seeded_rng(29);
    for _ in 0..20 {
        let tangent = Points::matrix(random_matrix::<f32>(&mut rng, 3) * 0.4);
        let point = group.group_exp(&tangent, None, None).unwrap();
        let log = group.group_log(&point, None, None).unwrap();
        assert!(log.allclose_with(&tangent, 1e-3, 1e-4));
    }
}

#[test]
fn test_so3_single_precision_matrix_layout_roundtrip() {
    let group = SpecialOrthogonal3::<f32>::new().unwrap();
    let mut rng = seeded_rng(31);
    let v = random_rotation_vectors::<f32>(&mut rng, 8, 2.0);

    let rotations = group.matrix_from_rotation_vector(&v).unwrap();
    let log = group
        .group_log(&rotations, None, Some(PointType::Matrix))
        .unwrap();
    let back = group
        .group_exp(&log, None, Some(PointType::Matrix))
        .unwrap();
    assert!(back.allclose_with(&rotations, 1e-4, 1e-4));

    let vectors = group.group_log(&group.group_exp(&v, None, None).unwrap(), None, None).unwrap();
    assert!(vectors.allclose_with(&v, 1e-4, 1e-4));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_so3_exp_log_roundtrip_at_identity(seed in any::<u64>()) {
        let group = so3();
        let mut rng = seeded_rng(seed);
        let v = random_rotation_vectors::<f64>(&mut rng, 3, 3.0);
        let exp = group.group_exp(&v, None, None).unwrap();
        let log = group.group_log(&exp, None, None).unwrap();
        prop_assert!(log.allclose_with(&v, 1e-9, 1e-9));
    }

    #[test]
    fn prop_so3_exp_log_roundtrip_away_from_identity(seed in any::<u64>()) {
        let group = so3();
        let mut rng = seeded_rng(seed);
        let base = random_rotation_vectors::<f64>(&mut rng, 1, 2.5);
        let v = random_rotation_vectors::<f64>(&mut rng, 3, 1.0);

        let exp = group.group_exp(&v, Some(&base), None).unwrap();
        let log = group.group_log(&exp, Some(&base), None).unwrap();
        prop_assert!(log.allclose_with(&v, 1e-7, 1e-8));
    }

    #[test]
    fn prop_so3_regularize_is_idempotent(seed in any::<u64>()) {
        let group = so3();
        let mut rng = seeded_rng(seed);
        let v = random_rotation_vectors::<f64>(&mut rng, 4, 12.0);
        let once = group.regularize(&v, None).unwrap();
        let twice = group.regularize(&once, None).unwrap();
        prop_assert!(twice.allclose_with(&once, 1e-12, 1e-12));
        let rows = once.as_vectors().unwrap();
        for i in 0..rows.nrows() {
            prop_assert!(rows.row(i).norm() <= std::f64::consts::PI + 1e-12);
        }
    }
}
