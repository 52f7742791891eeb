//! Parameters structure for IkCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::IkCtrlError;
use crate::kinematics::{ArmParams, NUM_JOINTS};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for IK control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    // ---- CYCLE ----
    /// Rate at which the controller is ticked.
    ///
    /// Units: Hz
    pub frequency_hz: f64,

    // ---- CONTROL LAW ----
    /// Proportional gain on the position error.
    ///
    /// Units: 1/second
    pub k_p: f64,

    /// Damping of the least-squares Jacobian inverse.
    pub damping: f64,

    /// Position error under which a target is considered reached.
    ///
    /// Units: meters
    pub convergence_threshold_m: f64,

    // ---- ARM ----
    /// Joint configuration at startup.
    ///
    /// Units: radians
    pub initial_joint_pos_rad: [f64; NUM_JOINTS],

    /// Names of the joints, as published in the joint state.
    pub joint_names: Vec<String>,

    /// Frame in which the end effector position is expressed.
    pub source_frame: String,

    /// Frame of the end effector.
    pub target_frame: String,

    /// Geometry of the arm.
    pub arm: ArmParams,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            frequency_hz: 100.0,
            k_p: 1.2,
            damping: 0.01,
            convergence_threshold_m: 1e-3,
            initial_joint_pos_rad: [0.0, 0.0, 1.4],
            joint_names: vec![
                String::from("joint_1"),
                String::from("joint_2"),
                String::from("joint_3"),
            ],
            source_frame: String::from("link_0"),
            target_frame: String::from("end_effector"),
            arm: ArmParams::default(),
        }
    }
}

impl Params {
    /// Check the parameters are usable by the controller.
    pub fn validate(&self) -> Result<(), IkCtrlError> {
        let positive = [
            ("frequency_hz", self.frequency_hz),
            ("k_p", self.k_p),
            ("damping", self.damping),
            ("convergence_threshold_m", self.convergence_threshold_m),
        ];

        for (name, value) in positive.iter() {
            if !(*value > 0.0) || !value.is_finite() {
                return Err(IkCtrlError::InvalidParams(format!(
                    "{} must be positive, found {}",
                    name, value
                )));
            }
        }

        if self.joint_names.len() != NUM_JOINTS {
            return Err(IkCtrlError::InvalidParams(format!(
                "expected {} joint names, found {}",
                NUM_JOINTS,
                self.joint_names.len()
            )));
        }

        Ok(())
    }

    /// Period of one controller tick.
    ///
    /// Units: seconds
    pub fn period_s(&self) -> f64 {
        1.0 / self.frequency_hz
    }
}
