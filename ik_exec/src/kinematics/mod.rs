//! Arm kinematics module
//!
//! Forward kinematics and position Jacobian of the three joint revolute arm,
//! plus the damped least-squares solver used to invert the Jacobian.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod arm;
mod damped_ls;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use arm::*;
pub use damped_ls::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of revolute joints on the arm.
pub const NUM_JOINTS: usize = 3;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during kinematics calculations.
#[derive(Debug, thiserror::Error)]
pub enum KinematicsError {
    #[error("The damping factor must be positive, found {0}")]
    NonPositiveDamping(f64),

    #[error("The Jacobian or the demanded velocity contains a NaN or infinite value")]
    NonFinite,

    #[error("The damped normal matrix is not positive definite")]
    NotPositiveDefinite,
}
