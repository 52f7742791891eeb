//! # Mode selection telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Request to change the operating mode of the IK controller.
///
/// Valid mode codes are:
/// - `1`: track the fixed `target_position_m`
/// - `2`: follow the latest linear velocity command
/// - `3`: track the latest randomly sampled target, re-arming on every arrival
///
/// Any other code is rejected and stops the controller. A mode 1 request
/// without a `target_position_m` is rejected and leaves the controller as it
/// was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeSelectRequest {
    /// The requested mode code.
    pub mode: i64,

    /// Target position of the end effector, required by mode 1 and ignored by
    /// the other modes.
    ///
    /// Units: meters,
    /// Frame: Arm base
    #[serde(default)]
    pub target_position_m: Option<[f64; 3]>,
}

/// Response to a mode selection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSelectResponse {
    /// True if the request was accepted and tracking has started.
    pub accepted: bool,

    /// The mode code from the request.
    pub mode: i64,
}
