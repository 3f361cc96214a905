//! The Lie group trait and the state every group carries.
//!
//! A concrete group implements the identity, the composition law and the
//! inverse, and overrides whichever of the remaining operations it supports.
//! The exponential and logarithm at an arbitrary base point, the Lie bracket
//! and the metric bookkeeping are provided once for all groups.

use crate::{
    error::{ManifoldError, Result},
    lie::{exp_log, metric::InvariantMetric},
    manifold::{check_dimension, Manifold},
    points::{Points, TangentVectors},
    types::{DMatrix, PointType, Scalar, TranslationSide},
};

/// Dimension, layout and metrics owned by a Lie group.
#[derive(Debug, Clone)]
pub struct LieGroupState<T: Scalar> {
    dimension: usize,
    default_point_type: PointType,
    left_canonical_metric: InvariantMetric<T>,
    right_canonical_metric: InvariantMetric<T>,
    metrics: Vec<InvariantMetric<T>>,
}

impl<T: Scalar> LieGroupState<T> {
    /// Creates the state of a group of the given dimension.
    ///
    /// Both canonical metrics have the identity matrix as inner product at
    /// the identity. No metric is registered yet.
    ///
    /// # Errors
    ///
    /// Returns an error if `dimension` is zero.
    pub fn new(dimension: usize, default_point_type: PointType) -> Result<Self> {
        let dimension = check_dimension(dimension)?;
        Ok(Self {
            dimension,
            default_point_type,
            left_canonical_metric: InvariantMetric::canonical(dimension, TranslationSide::Left),
            right_canonical_metric: InvariantMetric::canonical(dimension, TranslationSide::Right),
            metrics: Vec::new(),
        })
    }

    /// Dimension of the group, i.e. of its Lie algebra.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Layout used when an operation is called without a `point_type`.
    pub fn default_point_type(&self) -> PointType {
        self.default_point_type
    }

    /// The left-invariant metric whose matrix at the identity is `I`.
    pub fn left_canonical_metric(&self) -> &InvariantMetric<T> {
        &self.left_canonical_metric
    }

    /// The right-invariant metric whose matrix at the identity is `I`.
    pub fn right_canonical_metric(&self) -> &InvariantMetric<T> {
        &self.right_canonical_metric
    }

    /// Registered metrics, in registration order.
    pub fn metrics(&self) -> &[InvariantMetric<T>] {
        &self.metrics
    }

    /// Appends a metric. Metrics are never removed.
    ///
    /// # Errors
    ///
    /// Returns a shape error if the metric does not act on the Lie algebra of
    /// this group.
    pub fn push_metric(&mut self, metric: InvariantMetric<T>) -> Result<()> {
        if metric.dimension() != self.dimension {
            return Err(ManifoldError::shape_mismatch(
                format!("a metric of dimension {}", self.dimension),
                format!("a metric of dimension {}", metric.dimension()),
            ));
        }
        self.metrics.push(metric);
        Ok(())
    }
}

/// Trait for Lie groups.
///
/// Points and tangent vectors are batches; their layout is carried by the
/// [`Points`] variant. Every `point_type` argument is an optional override
/// resolved against [`LieGroup::default_point_type`]. When it is given, the
/// operands must already be in that layout.
///
/// Optional operations fail with [`ManifoldError::NotImplemented`] naming
/// the operation unless the group overrides them.
pub trait LieGroup<T: Scalar>: Manifold<T> {
    /// Shared state of the group.
    fn state(&self) -> &LieGroupState<T>;

    /// Mutable access to the shared state.
    fn state_mut(&mut self) -> &mut LieGroupState<T>;

    /// Identity element as a batch of one.
    fn get_identity(&self, point_type: Option<PointType>) -> Result<Points<T>>;

    /// Group product `a · b`, broadcast over the batches.
    fn compose(
        &self,
        a: &Points<T>,
        b: &Points<T>,
        point_type: Option<PointType>,
    ) -> Result<Points<T>>;

    /// Group inverse of each sample.
    fn inverse(&self, point: &Points<T>, point_type: Option<PointType>) -> Result<Points<T>>;

    /// Default layout of points of this group.
    fn default_point_type(&self) -> PointType {
        self.state().default_point_type()
    }

    /// Identity element in the default layout.
    fn identity(&self) -> Result<Points<T>> {
        self.get_identity(None)
    }

    /// Maps each sample to its canonical representative. Must be idempotent.
    fn regularize(&self, point: &Points<T>, point_type: Option<PointType>) -> Result<Points<T>> {
        let _ = (point, point_type);
        Err(ManifoldError::not_implemented(format!(
            "regularize for {}",
            self.name()
        )))
    }

    /// Jacobian of the left or right translation by each sample, one
    /// (dimension × dimension) matrix per sample.
    fn jacobian_translation(
        &self,
        point: &Points<T>,
        side: TranslationSide,
        point_type: Option<PointType>,
    ) -> Result<Vec<DMatrix<T>>> {
        let _ = (point, side, point_type);
        Err(ManifoldError::not_implemented(format!(
            "jacobian_translation for {}",
            self.name()
        )))
    }

    /// Group exponential of tangent vectors at the identity.
    fn group_exp_from_identity(
        &self,
        tangent_vec: &TangentVectors<T>,
        point_type: Option<PointType>,
    ) -> Result<Points<T>> {
        let _ = (tangent_vec, point_type);
        Err(ManifoldError::not_implemented(format!(
            "group_exp_from_identity for {}",
            self.name()
        )))
    }

    /// Group logarithm of points at the identity.
    fn group_log_from_identity(
        &self,
        point: &Points<T>,
        point_type: Option<PointType>,
    ) -> Result<TangentVectors<T>> {
        let _ = (point, point_type);
        Err(ManifoldError::not_implemented(format!(
            "group_log_from_identity for {}",
            self.name()
        )))
    }

    /// Weighted exponential barycenter of a batch of points.
    ///
    /// `weights` defaults to 1 for every point.
    fn group_exponential_barycenter(
        &self,
        points: &Points<T>,
        weights: Option<&[T]>,
        point_type: Option<PointType>,
    ) -> Result<Points<T>> {
        let _ = (points, weights, point_type);
        Err(ManifoldError::not_implemented(format!(
            "group_exponential_barycenter for {}",
            self.name()
        )))
    }

    /// Group exponential of `tangent_vec` at `base_point` (identity if `None`).
    ///
    /// # Errors
    ///
    /// Shape and broadcasting errors are reported before any numerical work.
    /// Errors of the group's own operations propagate unchanged.
    fn group_exp(
        &self,
        tangent_vec: &TangentVectors<T>,
        base_point: Option<&Points<T>>,
        point_type: Option<PointType>,
    ) -> Result<Points<T>> {
        exp_log::group_exp(self, tangent_vec, base_point, point_type)
    }

    /// Group logarithm of `point` at `base_point` (identity if `None`).
    fn group_log(
        &self,
        point: &Points<T>,
        base_point: Option<&Points<T>>,
        point_type: Option<PointType>,
    ) -> Result<TangentVectors<T>> {
        exp_log::group_log(self, point, base_point, point_type)
    }

    /// Lie bracket `A·P⁻¹·B − B·P⁻¹·A` of matrix tangent vectors at `P`.
    fn lie_bracket(
        &self,
        tangent_vec_a: &TangentVectors<T>,
        tangent_vec_b: &TangentVectors<T>,
        base_point: Option<&Points<T>>,
    ) -> Result<TangentVectors<T>> {
        exp_log::lie_bracket(self, tangent_vec_a, tangent_vec_b, base_point)
    }

    /// Registers an invariant metric on this group.
    fn add_metric(&mut self, metric: InvariantMetric<T>) -> Result<()> {
        self.state_mut().push_metric(metric)
    }

    /// Registered metrics, in registration order.
    fn metrics(&self) -> &[InvariantMetric<T>] {
        self.state().metrics()
    }

    fn left_canonical_metric(&self) -> &InvariantMetric<T> {
        self.state().left_canonical_metric()
    }

    fn right_canonical_metric(&self) -> &InvariantMetric<T> {
        self.state().right_canonical_metric()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dvector;

    /// A group implementing only the required operations.
    #[derive(Debug)]
    struct BareGroup {
        state: LieGroupState<f64>,
    }

    impl BareGroup {
        fn new() -> Self {
            Self {
                state: LieGroupState::new(2, PointType::Vector).unwrap(),
            }
        }
    }

    impl Manifold<f64> for BareGroup {
        fn name(&self) -> &str {
            "BareGroup"
        }

        fn dimension(&self) -> usize {
            self.state.dimension()
        }
    }

    impl LieGroup<f64> for BareGroup {
        fn state(&self) -> &LieGroupState<f64> {
            &self.state
        }

        fn state_mut(&mut self) -> &mut LieGroupState<f64> {
            &mut self.state
        }

        fn get_identity(&self, _point_type: Option<PointType>) -> Result<Points<f64>> {
            Ok(Points::vector(dvector![0.0, 0.0]))
        }

        fn compose(
            &self,
            a: &Points<f64>,
            b: &Points<f64>,
            _point_type: Option<PointType>,
        ) -> Result<Points<f64>> {
            a.add(b)
        }

        fn inverse(&self, point: &Points<f64>, _point_type: Option<PointType>) -> Result<Points<f64>> {
            Ok(point.scale(-1.0))
        }
    }

    fn feature_of(err: ManifoldError) -> String {
        match err {
            ManifoldError::NotImplemented { feature } => feature,
            other => panic!("expected NotImplemented, got {other:?}"),
        }
    }

    #[test]
    fn test_state_rejects_zero_dimension() {
        assert!(LieGroupState::<f64>::new(0, PointType::Vector).is_err());
    }

    #[test]
    fn test_canonical_metrics_are_identity() {
        let group = BareGroup::new();
        let left = group.left_canonical_metric();
        assert_eq!(left.side(), TranslationSide::Left);
        assert_eq!(left.matrix(), &DMatrix::identity(2, 2));
        assert_eq!(group.right_canonical_metric().side(), TranslationSide::Right);
        assert!(group.metrics().is_empty());
    }

    #[test]
    fn test_optional_operations_are_not_implemented() {
        let group = BareGroup::new();
        let p = Points::vector(dvector![1.0, 2.0]);

        assert!(feature_of(group.regularize(&p, None).unwrap_err()).starts_with("regularize"));
        assert!(feature_of(
            group
                .jacobian_translation(&p, TranslationSide::Left, None)
                .unwrap_err()
        )
        .starts_with("jacobian_translation"));
        assert!(feature_of(group.group_exp_from_identity(&p, None).unwrap_err())
            .starts_with("group_exp_from_identity"));
        assert!(feature_of(group.group_log_from_identity(&p, None).unwrap_err())
            .starts_with("group_log_from_identity"));
        assert!(feature_of(group.group_exponential_barycenter(&p, None, None).unwrap_err())
            .starts_with("group_exponential_barycenter"));
    }

    #[test]
    fn test_group_exp_surfaces_missing_regularize() {
        let group = BareGroup::new();
        let v = Points::vector(dvector![0.1, 0.2]);
        let err = group.group_exp(&v, None, None).unwrap_err();
        assert!(feature_of(err).contains("BareGroup"));
    }

    #[test]
    fn test_add_metric_appends() {
        let mut group = BareGroup::new();
        let g = DMatrix::from_row_slice(2, 2, &[2.0, 0.5, 0.5, 1.0]);
        let metric = InvariantMetric::new(g.clone(), TranslationSide::Left).unwrap();
        group.add_metric(metric.clone()).unwrap();
        group.add_metric(InvariantMetric::canonical(2, TranslationSide::Right)).unwrap();

        assert_eq!(group.metrics().len(), 2);
        assert_eq!(group.metrics()[0].matrix(), &g);

        let wrong = InvariantMetric::canonical(3, TranslationSide::Left);
        assert!(group.add_metric(wrong).unwrap_err().is_shape_error());
        assert_eq!(group.metrics().len(), 2);
    }
}
