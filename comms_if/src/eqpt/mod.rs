//! # Equipment Interface
//!
//! This module defines the interface structures which are published by the arm executables.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod joint_state;

// -----------------------------------------------------------------------------------------------
// REEXPORTS
// -----------------------------------------------------------------------------------------------

pub use joint_state::JointState;
