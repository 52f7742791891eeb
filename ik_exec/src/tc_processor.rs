//! # Telecommand processor module
//!
//! The telecommand processor handles the TCs coming from the script.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use nalgebra::Vector3;

// Internal
use comms_if::tc::Tc;
use ik_lib::data_store::DataStore;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore to send commands to different modules.
/// `random_target_m` is the latest candidate from the target sampler.
pub(crate) fn exec(ds: &mut DataStore, tc: &Tc, random_target_m: Vector3<f64>) {
    match tc {
        Tc::ModeSelect(req) => {
            debug!("Received ModeSelect command: {:?}", req);

            let rsp = ds.ik_ctrl.mode_select(req, random_target_m);

            if rsp.accepted {
                debug!("ModeSelect response: {:?}", rsp);
            } else {
                warn!("ModeSelect response: {:?}", rsp);
            }
        }
        Tc::CmdVel(cmd) => {
            debug!("Received CmdVel command: {:?}", cmd);
            ds.ik_ctrl.set_cmd_vel(cmd);
        }
    }
}
