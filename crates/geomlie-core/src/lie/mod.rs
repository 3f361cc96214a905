//! Lie groups.
//!
//! - [`group`]: the [`LieGroup`] trait and the [`LieGroupState`] every group owns
//! - [`exp_log`]: group exponential, logarithm and Lie bracket at any base point
//! - [`metric`]: left- and right-invariant metrics

pub mod exp_log;
pub mod group;
pub mod metric;

pub use group::{LieGroup, LieGroupState};
pub use metric::InvariantMetric;
