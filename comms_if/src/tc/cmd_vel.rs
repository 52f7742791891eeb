//! # Velocity telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A linear velocity demand for the end effector.
///
/// Only the most recent command is used, older ones are overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CmdVel {
    /// Linear velocity of the end effector.
    ///
    /// Units: meters/second,
    /// Frame: Arm base
    pub linear_ms: [f64; 3],
}
