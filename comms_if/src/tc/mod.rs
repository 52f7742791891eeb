//! # Telecommand module
//!
//! This module provides telecommand functionality to the communications
//! interface.
//!
//! Telecommands are serialised as externally tagged JSON, for example:
//!
//! ```json
//! {"ModeSelect": {"mode": 1, "target_position_m": [0.3, 0.0, 0.4]}}
//! {"CmdVel": {"linear_ms": [0.0, 0.05, 0.0]}}
//! ```

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod cmd_vel;
pub mod mode_select;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Internal
pub use cmd_vel::CmdVel;
pub use mode_select::{ModeSelectRequest, ModeSelectResponse};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the arm by an operator or a
/// script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Tc {
    /// Select the controller's operating mode (and target).
    ModeSelect(ModeSelectRequest),

    /// Linear velocity demand used while in velocity tracking mode.
    CmdVel(CmdVel),
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
