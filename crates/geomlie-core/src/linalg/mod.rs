//! Batched matrix functions.
//!
//! - [`functions`]: the engine choosing between the symmetric fast path and
//!   the general algorithms
//! - [`symmetric`]: eigendecomposition-based functions of symmetric matrices
//! - [`general`]: exponential, logarithm, square root and QR of arbitrary
//!   matrices
//! - [`config`]: engine configuration

pub mod config;
pub mod functions;
pub mod general;
pub mod symmetric;

pub use config::{
    global_config, set_global_config, FallbackPolicy, MatrixFunctionConfig,
    MatrixFunctionConfigBuilder,
};
pub use functions::{expm, expsym, is_symmetric, logm, powerm, qr, sqrtm, MatrixFunctions};
pub use general::QrMode;
