//! # IK library.
//!
//! This library allows other crates in the workspace, and the benchmarks, to access items defined
//! inside the IK executable crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Arm kinematics - forward kinematics, position Jacobian and the damped least-squares solver
pub mod kinematics;

/// IK control module - drives the end effector to a target or along a velocity
pub mod ik_ctrl;

/// Target sampler module - generates random reachable targets for the controller
pub mod target_sampler;

/// Pose source - end effector position feedback for the controller
pub mod pose_source;

/// Global data store for the executable
pub mod data_store;
