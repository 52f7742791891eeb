//! Main IK executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Start the target sampler on its own thread
//!     - Main loop:
//!         - Telecommand processing
//!         - End effector pose lookup
//!         - IK control processing
//!         - Joint state publication
//!         - Archiving
//!
//! # Modules
//!
//! All modules (e.g. `ik_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use comms_if::eqpt::JointState;
use ik_lib::{
    data_store::DataStore,
    ik_ctrl::ControllerMode,
    pose_source::{ForwardKinematicsPose, PoseSource},
    target_sampler::TargetSampler,
};

mod tc_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, trace, warn};
use nalgebra::Vector3;
use std::env;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;

// Internal
use util::{
    archive::Archived,
    latest::Latest,
    logger::{logger_init, LevelFilter},
    module::{CycleEnd, CycleTimer, State},
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("ik_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(
        LevelFilter::Debug,
        &[("ik_lib::target_sampler", LevelFilter::Info)],
        &session,
    )
    .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("IK Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD SCRIPT ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    if args.len() != 2 {
        return Err(eyre!(
            "Expected exactly one argument (the TC script), found {}",
            args.len() - 1
        ));
    }

    info!("Loading script from \"{}\"", &args[1]);

    let mut si = ScriptInterpreter::new(&args[1]).wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} TCs\n",
        si.get_duration(),
        si.get_num_tcs()
    );

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.ik_ctrl
        .init("ik_ctrl.toml", &session)
        .wrap_err("Failed to initialise IkCtrl")?;
    info!("IkCtrl init complete");

    let mut target_sampler = TargetSampler::default();
    target_sampler
        .init("target_sampler.toml", &session)
        .wrap_err("Failed to initialise TargetSampler")?;
    info!("TargetSampler init complete");

    info!("Module initialisation complete\n");

    // Copy out what the loop needs from the controller parameters
    let mut cycle_timer = CycleTimer::from_frequency_hz(ds.ik_ctrl.params().frequency_hz);
    let joint_names = ds.ik_ctrl.params().joint_names.clone();
    let source_frame = ds.ik_ctrl.params().source_frame.clone();
    let target_frame = ds.ik_ctrl.params().target_frame.clone();

    // ---- POSE SOURCE ----

    let mut pose_source = ForwardKinematicsPose::new(
        ds.ik_ctrl.arm().params().clone(),
        &source_frame,
        &target_frame,
        &joint_names,
    );
    pose_source.update(JointState::now(
        &joint_names,
        &ds.ik_ctrl.state().joint_pos_rad,
        &[0.0; 3],
    ));

    // ---- TARGET SAMPLER THREAD ----

    let latest_target = Latest::new(Vector3::<f64>::zeros());
    let stop_sampler = Arc::new(AtomicBool::new(false));

    let sampler_handle = {
        let latest_target = latest_target.clone();
        let stop_sampler = stop_sampler.clone();

        thread::Builder::new()
            .name(String::from("target_sampler"))
            .spawn(move || run_sampler(target_sampler, latest_target, stop_sampler))
            .wrap_err("Failed to start the TargetSampler thread")?
    };
    info!("TargetSampler thread started");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut end_of_script = false;

    loop {
        cycle_timer.start();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(latest_target.get());

        // ---- TELECOMMAND PROCESSING ----

        match si.get_pending_tcs() {
            PendingTcs::None => (),
            PendingTcs::Some(tc_vec) => {
                for tc in tc_vec.iter() {
                    tc_processor::exec(&mut ds, tc, latest_target.get());
                }
            }
            PendingTcs::EndOfScript => {
                if !end_of_script {
                    info!("End of TC script reached");
                    end_of_script = true;
                }

                // Let a fixed target finish, anything else stops straight away
                let state = ds.ik_ctrl.state();
                if !(state.is_active && state.mode == ControllerMode::TrackFixedTarget) {
                    info!("Stopping");
                    break;
                }
            }
        }

        // ---- POSE LOOKUP ----

        if ds.ik_ctrl.state().is_active {
            let result = pose_source.lookup_position_m(&source_frame, &target_frame);
            ds.record_pose_lookup(result);
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        if let Some((o, r)) = ds.ik_ctrl.proc_or_warn(&ds.ik_ctrl_input, "IkCtrl") {
            ds.ik_ctrl_output = o;
            ds.ik_ctrl_status_rpt = r;
        }

        // ---- JOINT STATE ----

        let joint_state = JointState::now(
            &joint_names,
            &ds.ik_ctrl_output.joint_pos_rad,
            &ds.ik_ctrl_output.joint_rate_rads,
        );
        trace!("Joint state: {:?}", joint_state);

        pose_source.update(joint_state);

        // ---- WRITE ARCHIVES ----

        if let Err(e) = ds.ik_ctrl.write() {
            warn!("Could not archive IkCtrl data: {}", e);
        }

        // ---- CYCLE MANAGEMENT ----

        match cycle_timer.end_and_sleep() {
            CycleEnd::OnTime(_) => ds.num_consec_cycle_overruns = 0,
            CycleEnd::Overrun(by) => {
                ds.num_consec_cycle_overruns += 1;
                warn!(
                    "Cycle overran by {:.06} s ({} consecutive)",
                    by.as_secs_f64(),
                    ds.num_consec_cycle_overruns
                );
                debug!("IkCtrl status on overrun: {:?}", ds.ik_ctrl_status_rpt);
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    stop_sampler.store(true, Ordering::Relaxed);
    if sampler_handle.join().is_err() {
        warn!("TargetSampler thread panicked");
    }

    info!("End of execution after {} cycles", ds.num_cycles);

    Ok(())
}

/// Run the target sampler at its own rate until `stop` is set.
///
/// Accepted candidates overwrite the value in `latest_target`.
fn run_sampler(mut sampler: TargetSampler, latest_target: Latest<Vector3<f64>>, stop: Arc<AtomicBool>) {
    let mut cycle_timer = CycleTimer::from_frequency_hz(sampler.params().frequency_hz);

    while !stop.load(Ordering::Relaxed) {
        cycle_timer.start();

        if let Some((Some(c), _)) = sampler.proc_or_warn(&(), "TargetSampler") {
            latest_target.set(c);
        }

        if let Err(e) = sampler.write() {
            warn!("Could not archive TargetSampler data: {}", e);
        }

        if let CycleEnd::Overrun(by) = cycle_timer.end_and_sleep() {
            debug!("TargetSampler cycle overran by {:.06} s", by.as_secs_f64());
        }
    }

    debug!("TargetSampler thread stopped");
}
