//! # Pose source
//!
//! The controller closes its loop on the end effector position reported by a
//! pose source. The source is looked up by frame names so that a transform
//! tree can sit behind it. `ForwardKinematicsPose` answers lookups from the
//! last joint state the executable published.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;
use std::convert::TryInto;

// Internal
use crate::kinematics::{Arm, ArmParams, NUM_JOINTS};
use comms_if::eqpt::JointState;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A source of end effector position feedback.
pub trait PoseSource {
    /// Get the position of `target_frame` expressed in `source_frame`.
    fn lookup_position_m(
        &mut self,
        source_frame: &str,
        target_frame: &str,
    ) -> Result<Vector3<f64>, PoseLookupError>;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised by a failed pose lookup. None of these are fatal, the caller
/// is expected to try again next cycle.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum PoseLookupError {
    #[error("Frame \"{0}\" is not known to the pose source")]
    UnknownFrame(String),

    #[error("No joint state has been received yet")]
    NoJointState,

    #[error("The joint state has no position for joint \"{0}\"")]
    MissingJoint(String),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Pose source computing the end effector position from the published joint
/// state.
pub struct ForwardKinematicsPose {
    arm: Arm,

    base_frame: String,
    ee_frame: String,

    joint_names: Vec<String>,

    joint_state: Option<JointState>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ForwardKinematicsPose {
    pub fn new(
        arm_params: ArmParams,
        base_frame: &str,
        ee_frame: &str,
        joint_names: &[String],
    ) -> Self {
        Self {
            arm: Arm::new(arm_params),
            base_frame: String::from(base_frame),
            ee_frame: String::from(ee_frame),
            joint_names: joint_names.to_vec(),
            joint_state: None,
        }
    }

    /// Provide a new joint state for the following lookups.
    pub fn update(&mut self, joint_state: JointState) {
        self.joint_state = Some(joint_state);
    }

    /// Pull the configured joints out of the last joint state, in order.
    fn joint_positions_rad(&self) -> Result<[f64; NUM_JOINTS], PoseLookupError> {
        let js = self
            .joint_state
            .as_ref()
            .ok_or(PoseLookupError::NoJointState)?;

        let positions = self
            .joint_names
            .iter()
            .map(|n| {
                js.position_of(n)
                    .ok_or_else(|| PoseLookupError::MissingJoint(n.clone()))
            })
            .collect::<Result<Vec<f64>, _>>()?;

        positions
            .as_slice()
            .try_into()
            .map_err(|_| PoseLookupError::MissingJoint(format!("{} joints", NUM_JOINTS)))
    }
}

impl PoseSource for ForwardKinematicsPose {
    fn lookup_position_m(
        &mut self,
        source_frame: &str,
        target_frame: &str,
    ) -> Result<Vector3<f64>, PoseLookupError> {
        if source_frame != self.base_frame {
            return Err(PoseLookupError::UnknownFrame(String::from(source_frame)));
        }
        if target_frame != self.ee_frame {
            return Err(PoseLookupError::UnknownFrame(String::from(target_frame)));
        }

        let q_rad = self.joint_positions_rad()?;

        Ok(self.arm.ee_position_m(&q_rad))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn names() -> Vec<String> {
        vec![
            String::from("joint_1"),
            String::from("joint_2"),
            String::from("joint_3"),
        ]
    }

    fn source() -> ForwardKinematicsPose {
        ForwardKinematicsPose::new(ArmParams::default(), "link_0", "end_effector", &names())
    }

    #[test]
    fn test_lookup() {
        let mut ps = source();
        let q = [0.3, 0.2, 1.4];

        assert_eq!(
            ps.lookup_position_m("link_0", "end_effector"),
            Err(PoseLookupError::NoJointState)
        );

        ps.update(JointState::now(&names(), &q, &[0.0; 3]));

        let p = ps.lookup_position_m("link_0", "end_effector").unwrap();
        let expected = Arm::new(ArmParams::default()).ee_position_m(&q);
        assert!((p - expected).norm() < 1e-12);
    }

    #[test]
    fn test_joint_order_follows_names() {
        let mut ps = source();

        // Published out of order
        let shuffled = vec![
            String::from("joint_3"),
            String::from("joint_1"),
            String::from("joint_2"),
        ];
        ps.update(JointState::now(&shuffled, &[1.4, 0.3, 0.2], &[0.0; 3]));

        let p = ps.lookup_position_m("link_0", "end_effector").unwrap();
        let expected = Arm::new(ArmParams::default()).ee_position_m(&[0.3, 0.2, 1.4]);
        assert!((p - expected).norm() < 1e-12);
    }

    #[test]
    fn test_lookup_errors() {
        let mut ps = source();
        ps.update(JointState::now(&names()[..2], &[0.0, 0.0], &[0.0; 2]));

        assert_eq!(
            ps.lookup_position_m("world", "end_effector"),
            Err(PoseLookupError::UnknownFrame(String::from("world")))
        );
        assert_eq!(
            ps.lookup_position_m("link_0", "gripper"),
            Err(PoseLookupError::UnknownFrame(String::from("gripper")))
        );
        assert_eq!(
            ps.lookup_position_m("link_0", "end_effector"),
            Err(PoseLookupError::MissingJoint(String::from("joint_3")))
        );
    }
}
