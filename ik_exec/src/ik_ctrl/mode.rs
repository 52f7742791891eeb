//! Controller operating modes

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use std::convert::TryFrom;

use super::IkCtrlError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The operating mode of the IK controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControllerMode {
    /// No mode has been selected yet.
    Idle,

    /// Drive the end effector to a fixed target, then stop (mode 1).
    TrackFixedTarget,

    /// Follow the latest linear velocity command (mode 2).
    TrackVelocity,

    /// Drive the end effector to the latest sampled target, and on arrival
    /// pick up the next one (mode 3).
    TrackRepeatingRandomTarget,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ControllerMode {
    fn default() -> Self {
        ControllerMode::Idle
    }
}

impl ControllerMode {
    /// The mode code used by mode selection requests, `0` for `Idle`.
    pub fn code(&self) -> i64 {
        match self {
            ControllerMode::Idle => 0,
            ControllerMode::TrackFixedTarget => 1,
            ControllerMode::TrackVelocity => 2,
            ControllerMode::TrackRepeatingRandomTarget => 3,
        }
    }

    /// True if the mode is driven by a position error (and so can converge).
    pub fn is_position_tracking(&self) -> bool {
        match self {
            ControllerMode::TrackFixedTarget | ControllerMode::TrackRepeatingRandomTarget => true,
            ControllerMode::Idle | ControllerMode::TrackVelocity => false,
        }
    }
}

impl TryFrom<i64> for ControllerMode {
    type Error = IkCtrlError;

    /// Convert a requested mode code into a mode.
    ///
    /// `Idle` cannot be requested, so only 1, 2 and 3 are valid.
    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(ControllerMode::TrackFixedTarget),
            2 => Ok(ControllerMode::TrackVelocity),
            3 => Ok(ControllerMode::TrackRepeatingRandomTarget),
            c => Err(IkCtrlError::InvalidModeRequest(c)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mode_codes() {
        for code in 1..=3 {
            assert_eq!(ControllerMode::try_from(code).unwrap().code(), code);
        }

        for code in [-1, 0, 4, 100].iter() {
            assert!(matches!(
                ControllerMode::try_from(*code),
                Err(IkCtrlError::InvalidModeRequest(c)) if c == *code
            ));
        }
    }
}
