//! # Data Store

use log::{info, warn};
use nalgebra::Vector3;

use crate::{ik_ctrl, pose_source::PoseLookupError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    // IkCtrl
    pub ik_ctrl: ik_ctrl::IkCtrl,
    pub ik_ctrl_input: ik_ctrl::InputData,
    pub ik_ctrl_output: ik_ctrl::OutputData,
    pub ik_ctrl_status_rpt: ik_ctrl::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of consecutive failed pose lookups
    pub num_consec_pose_lookup_failures: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears the IkCtrl input except for the latest random target, which the
    /// caller refreshes from the sampler slot.
    pub fn cycle_start(&mut self, random_target_m: Vector3<f64>) {
        self.ik_ctrl_input = ik_ctrl::InputData {
            ee_position_m: None,
            random_target_m,
        };
        self.ik_ctrl_status_rpt = ik_ctrl::StatusReport::default();
    }

    /// Record the result of this cycle's pose lookup in the IkCtrl input.
    pub fn record_pose_lookup(&mut self, result: Result<Vector3<f64>, PoseLookupError>) {
        match result {
            Ok(p) => {
                if self.num_consec_pose_lookup_failures > 0 {
                    info!(
                        "Pose lookup recovered after {} failed cycles",
                        self.num_consec_pose_lookup_failures
                    );
                }
                self.num_consec_pose_lookup_failures = 0;
                self.ik_ctrl_input.ee_position_m = Some(p);
            }
            Err(e) => {
                self.num_consec_pose_lookup_failures += 1;
                warn!(
                    "Could not look up the end effector position ({} consecutive): {}",
                    self.num_consec_pose_lookup_failures, e
                );
                self.ik_ctrl_input.ee_position_m = None;
            }
        }
    }
}
