//! IK control module
//!
//! Closed-loop differential inverse kinematics. Each cycle the position error
//! (or the demanded velocity) is mapped into joint rates through a damped
//! least-squares inverse of the arm's position Jacobian, and the rates are
//! integrated into the joint positions.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod mode;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use mode::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during IkCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum IkCtrlError {
    #[error("Cannot load the IkCtrl parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Invalid IkCtrl parameters: {0}")]
    InvalidParams(String),

    #[error("Cannot create the IkCtrl archive: {0}")]
    ArchiveError(#[from] util::archive::ArchiveError),

    #[error("Mode {0} is not a valid mode, expected 1, 2 or 3")]
    InvalidModeRequest(i64),

    #[error("Mode {0:?} requires a target position but the request has none")]
    MissingTarget(ControllerMode),
}
