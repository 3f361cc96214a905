//! General-purpose matrix functions for arbitrary square matrices.
//!
//! - exponential: scaling-and-squaring Padé approximant (nalgebra)
//! - square root: Denman–Beavers coupled iteration
//! - logarithm: real Schur form `X = Q T Qᵀ`, then inverse scaling and
//!   squaring on the quasi-triangular factor, i.e. repeated square roots
//!   until `T` is close to the identity, then the series
//!   `log(A) = 2 Σ Z^(2k+1) / (2k+1)` with `Z = (A - I)(A + I)⁻¹`
//!
//! None of these mask failures: non-finite entries, singular iterates and
//! non-convergence all surface as [`ManifoldError::NumericalError`].
//!
//! The square-root stopping rule is relative and floored at a multiple of
//! `n · ε` of the scalar type, so single precision converges as well.

use crate::{
    error::{ManifoldError, Result},
    linalg::config::MatrixFunctionConfig,
    types::{DMatrix, Scalar},
};
use num_traits::Float;

/// ‖A − I‖₁ under which the logarithm series is evaluated.
const LOG_SERIES_RADIUS: f64 = 0.25;

/// Maximum number of series terms of the logarithm.
const LOG_SERIES_TERMS: usize = 40;

/// Multiple of `n · ε` below which a square-root step is roundoff.
const SQRT_ROUNDOFF_FACTOR: f64 = 10.0;

/// QR sweeps allowed per row of the Schur decomposition.
const SCHUR_ITERATIONS_PER_ROW: usize = 100;

pub(crate) fn ensure_finite<T: Scalar>(x: &DMatrix<T>, what: &str) -> Result<()> {
    if x.iter().all(|v| <T as Float>::is_finite(*v)) {
        Ok(())
    } else {
        Err(ManifoldError::numerical_error(format!(
            "{} contains non-finite entries",
            what
        )))
    }
}

fn one_norm<T: Scalar>(x: &DMatrix<T>) -> T {
    x.column_iter()
        .map(|c| c.iter().fold(T::zero(), |acc, v| acc + <T as Float>::abs(*v)))
        .fold(T::zero(), <T as Float>::max)
}

fn inverse<T: Scalar>(x: &DMatrix<T>, what: &str) -> Result<DMatrix<T>> {
    x.clone()
        .try_inverse()
        .ok_or_else(|| ManifoldError::numerical_error(format!("{} is singular", what)))
}

/// Relative step change at which the square-root iteration stops for `n × n`
/// matrices: the configured tolerance, but never below `c · n · ε`.
fn sqrt_tolerance<T: Scalar>(n: usize, config: &MatrixFunctionConfig) -> T {
    let roundoff = <T as Scalar>::from_f64(SQRT_ROUNDOFF_FACTOR)
        * <T as Scalar>::from_usize(n.max(1))
        * T::EPSILON;
    <T as Float>::max(<T as Scalar>::from_f64(config.sqrt_tolerance), roundoff)
}

/// Matrix exponential of a general square matrix.
pub fn expm_general<T: Scalar>(x: &DMatrix<T>) -> Result<DMatrix<T>> {
    ensure_finite(x, "exponential input")?;
    let result = x.exp();
    ensure_finite(&result, "matrix exponential")?;
    Ok(result)
}

/// Principal square root of a general square matrix.
///
/// Converges for matrices without eigenvalues on the closed negative real
/// axis. The zero matrix is its own square root; any other singular matrix
/// fails.
pub fn sqrtm_general<T: Scalar>(x: &DMatrix<T>, config: &MatrixFunctionConfig) -> Result<DMatrix<T>> {
    ensure_finite(x, "square root input")?;
    if x.iter().all(|v| *v == T::zero()) {
        return Ok(x.clone());
    }
    denman_beavers(x, config)
}

/// Coupled iteration `Y ← (Y + Z⁻¹)/2`, `Z ← (Z + Y⁻¹)/2` from `Y = X`, `Z = I`.
///
/// Stops when the relative step falls below [`sqrt_tolerance`], or when the
/// step has stopped shrinking once it is at the `√ε` level: past that point
/// the quadratic phase is over and only roundoff is left.
fn denman_beavers<T: Scalar>(x: &DMatrix<T>, config: &MatrixFunctionConfig) -> Result<DMatrix<T>> {
    let n = x.nrows();
    let half = <T as Scalar>::from_f64(0.5);
    let tol = sqrt_tolerance::<T>(n, config);
    let plateau = <T as Float>::sqrt(T::EPSILON);
    let mut y = x.clone();
    let mut z = DMatrix::<T>::identity(n, n);
    let mut previous_change = <T as Float>::infinity();

    for iteration in 0..config.sqrt_max_iterations {
        let y_inv = inverse(&y, "square root iterate")?;
        let z_inv = inverse(&z, "inverse square root iterate")?;
        let y_next = (&y + z_inv) * half;
        let z_next = (&z + y_inv) * half;

        let change = (&y_next - &y).norm();
        let scale = y_next.norm();
        y = y_next;
        z = z_next;
        ensure_finite(&y, "square root iterate")?;

        if change <= tol * scale {
            tracing::trace!(iterations = iteration + 1, "square root converged");
            return Ok(y);
        }
        if change <= plateau * scale && change >= previous_change {
            tracing::trace!(iterations = iteration + 1, "square root stagnated at roundoff");
            return Ok(y);
        }
        previous_change = change;
    }

    Err(ManifoldError::numerical_error(format!(
        "square root did not converge within {} iterations",
        config.sqrt_max_iterations
    )))
}

/// Principal logarithm of a general square matrix.
///
/// The matrix is reduced to real Schur form `Q T Qᵀ` and the logarithm is
/// taken on the quasi-triangular `T`, so `log(X) = Q log(T) Qᵀ`.
pub fn logm_general<T: Scalar>(x: &DMatrix<T>, config: &MatrixFunctionConfig) -> Result<DMatrix<T>> {
    ensure_finite(x, "logarithm input")?;
    let n = x.nrows();
    let schur = x
        .clone()
        .try_schur(T::EPSILON, SCHUR_ITERATIONS_PER_ROW * n.max(1))
        .ok_or_else(|| ManifoldError::numerical_error("Schur decomposition did not converge"))?;
    let (q, t) = schur.unpack();

    let log_t = log_quasi_triangular(&t, config)?;
    let result = &q * log_t * q.transpose();
    ensure_finite(&result, "matrix logarithm")?;
    Ok(result)
}

/// Inverse scaling and squaring on a Schur factor.
fn log_quasi_triangular<T: Scalar>(t: &DMatrix<T>, config: &MatrixFunctionConfig) -> Result<DMatrix<T>> {
    let n = t.nrows();
    let identity = DMatrix::<T>::identity(n, n);
    let radius = <T as Scalar>::from_f64(LOG_SERIES_RADIUS);

    let mut a = t.clone();
    let mut roots = 0usize;
    while one_norm(&(&a - &identity)) > radius {
        if roots == config.log_max_square_roots {
            return Err(ManifoldError::numerical_error(format!(
                "logarithm did not reach the identity after {} square roots",
                roots
            )));
        }
        a = denman_beavers(&a, config)?;
        roots += 1;
    }

    let z = (&a - &identity) * inverse(&(&a + &identity), "logarithm Cayley denominator")?;
    let z_squared = &z * &z;
    let mut power = z.clone();
    let mut sum = z;
    let eps = T::EPSILON;
    for k in 1..LOG_SERIES_TERMS {
        power = &power * &z_squared;
        let term = &power / <T as Scalar>::from_usize(2 * k + 1);
        let term_norm = term.norm();
        sum += term;
        if term_norm <= eps * sum.norm() {
            break;
        }
    }

    tracing::trace!(square_roots = roots, "logarithm series evaluated");
    let scale = <T as Float>::powi(<T as Scalar>::from_f64(2.0), roots as i32 + 1);
    Ok(sum * scale)
}

/// `exp(p · log(X))` for a general square matrix.
pub fn powm_general<T: Scalar>(
    x: &DMatrix<T>,
    power: T,
    config: &MatrixFunctionConfig,
) -> Result<DMatrix<T>> {
    let log = logm_general(x, config)?;
    expm_general(&(log * power))
}

/// Mode of the QR decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrMode {
    /// Q is (m, k), R is (k, n) with k = min(m, n).
    #[default]
    Reduced,
    /// Q is (m, m), R is (m, n).
    Complete,
}

/// QR decomposition of one (possibly rectangular) matrix.
pub fn qr_general<T: Scalar>(x: &DMatrix<T>, mode: QrMode) -> Result<(DMatrix<T>, DMatrix<T>)> {
    ensure_finite(x, "QR input")?;
    let (m, n) = x.shape();
    match mode {
        QrMode::Reduced => {
            let qr = x.clone().qr();
            Ok((qr.q(), qr.r()))
        }
        QrMode::Complete if m <= n => {
            let qr = x.clone().qr();
            Ok((qr.q(), qr.r()))
        }
        QrMode::Complete => {
            // Appending the identity yields a square Q whose first n columns
            // are the reduced factor.
            let mut augmented = DMatrix::<T>::zeros(m, n + m);
            augmented.columns_mut(0, n).copy_from(x);
            augmented.columns_mut(n, m).fill_with_identity();
            let q = augmented.qr().q();
            let r = q.transpose() * x;
            Ok((q, r))
        }
    }
}
