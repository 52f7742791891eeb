//! Damped least-squares Jacobian inversion

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Matrix3, Vector3};

use super::KinematicsError;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Solve `q_dot = (J^T J + damping I)^-1 J^T v`.
///
/// For any real `J` and positive `damping` the normal matrix is symmetric
/// positive definite, so it is factorised with a Cholesky decomposition. Near
/// singular configurations this trades tracking accuracy for bounded joint
/// rates.
pub fn damped_least_squares(
    jacobian: &Matrix3<f64>,
    v: &Vector3<f64>,
    damping: f64,
) -> Result<Vector3<f64>, KinematicsError> {
    // Also rejects NaN
    if !(damping > 0.0) {
        return Err(KinematicsError::NonPositiveDamping(damping));
    }

    if jacobian.iter().chain(v.iter()).any(|x| !x.is_finite()) {
        return Err(KinematicsError::NonFinite);
    }

    let jt = jacobian.transpose();
    let normal = jt * jacobian + Matrix3::identity() * damping;

    let chol = normal
        .cholesky()
        .ok_or(KinematicsError::NotPositiveDefinite)?;

    Ok(chol.solve(&(jt * v)))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
