//! # Joint state message
//!
//! Published once per controller cycle with the integrated joint positions and the demanded joint
//! rates.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The state of every joint of the arm at a point in time.
///
/// The three vectors are index aligned, so `position_rad[i]` and `velocity_rads[i]` belong to the
/// joint called `name[i]`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JointState {
    /// Time at which the state was produced
    pub timestamp: DateTime<Utc>,

    /// Names of the joints
    pub name: Vec<String>,

    /// Joint positions.
    ///
    /// Units: radians, wrapped into [0, 2pi)
    pub position_rad: Vec<f64>,

    /// Joint rates.
    ///
    /// Units: radians/second
    pub velocity_rads: Vec<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl JointState {
    /// Build a new joint state stamped with the current time.
    pub fn now(name: &[String], position_rad: &[f64], velocity_rads: &[f64]) -> Self {
        Self {
            timestamp: Utc::now(),
            name: name.to_vec(),
            position_rad: position_rad.to_vec(),
            velocity_rads: velocity_rads.to_vec(),
        }
    }

    /// Get the position of the named joint, or `None` if there is no such joint.
    pub fn position_of(&self, name: &str) -> Option<f64> {
        self.name
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.position_rad.get(i).copied())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_position_of() {
        let names = vec![
            String::from("joint_1"),
            String::from("joint_2"),
            String::from("joint_3"),
        ];
        let js = JointState::now(&names, &[0.1, 0.2, 0.3], &[0.0; 3]);

        assert_eq!(js.position_of("joint_2"), Some(0.2));
        assert_eq!(js.position_of("joint_4"), None);
    }
}
