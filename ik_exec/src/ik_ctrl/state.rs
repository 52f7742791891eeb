//! Implementations for the IkCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use nalgebra::Vector3;
use serde::Serialize;
use std::convert::TryFrom;

// Internal
use super::{ControllerMode, IkCtrlError, Params};
use crate::kinematics::{damped_least_squares, Arm, NUM_JOINTS};
use comms_if::tc::{CmdVel, ModeSelectRequest, ModeSelectResponse};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    maths::wrap_to_2pi,
    module::State,
    params,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// IK control module state
pub struct IkCtrl {
    pub(crate) params: Params,

    arm: Arm,

    pub(crate) state: ControllerState,

    /// Most recent linear velocity demand, used in `TrackVelocity`.
    ///
    /// Units: meters/second
    pub(crate) cmd_vel_ms: Vector3<f64>,

    /// Last end effector position received from the pose source.
    ///
    /// Units: meters
    pub(crate) last_position_m: Vector3<f64>,

    pub(crate) report: StatusReport,

    pub(crate) output: OutputData,
    arch_output: Archiver,
}

/// The controller's view of the arm and its current task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControllerState {
    /// Current operating mode
    pub mode: ControllerMode,

    /// Target end effector position, only meaningful when `mode` isn't `Idle`.
    ///
    /// Units: meters
    pub target_m: Vector3<f64>,

    /// Estimated joint positions.
    ///
    /// Units: radians, each in [0, 2pi)
    pub joint_pos_rad: [f64; NUM_JOINTS],

    /// If false the controller does nothing and demands zero rates.
    pub is_active: bool,
}

/// Input data to IK Control.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputData {
    /// Position of the end effector from the pose source, or `None` if the
    /// lookup failed this cycle.
    ///
    /// Units: meters
    pub ee_position_m: Option<Vector3<f64>>,

    /// The most recently accepted random target.
    ///
    /// Units: meters
    pub random_target_m: Vector3<f64>,
}

/// Output joint state from IkCtrl.
#[derive(Clone, Copy, Serialize, Debug, Default, PartialEq)]
pub struct OutputData {
    /// Integrated joint positions.
    ///
    /// Units: radians, each in [0, 2pi)
    pub joint_pos_rad: [f64; NUM_JOINTS],

    /// Demanded joint rates.
    ///
    /// Units: radians/second
    pub joint_rate_rads: [f64; NUM_JOINTS],
}

/// Status report for IkCtrl processing.
#[derive(Clone, Copy, Serialize, Debug, Default, PartialEq)]
pub struct StatusReport {
    /// Mode the cycle ran in
    pub mode: ControllerMode,

    /// True if the controller was active at the start of the cycle
    pub active: bool,

    /// True if the pose lookup failed and the previous output was held
    pub pose_stale: bool,

    /// Norm of the position error at the start of the cycle.
    ///
    /// Units: meters
    pub error_norm_m: f64,

    /// True if the target was reached this cycle
    pub converged: bool,

    /// True if a new random target was picked up after converging
    pub rearmed: bool,
}

/// Flat record written to the output archive each cycle.
#[derive(Serialize)]
struct ArchRecord {
    time_s: f64,
    mode: ControllerMode,
    active: bool,
    pose_stale: bool,
    converged: bool,
    error_norm_m: f64,
    target_x_m: f64,
    target_y_m: f64,
    target_z_m: f64,
    pos_1_rad: f64,
    pos_2_rad: f64,
    pos_3_rad: f64,
    rate_1_rads: f64,
    rate_2_rads: f64,
    rate_3_rads: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for IkCtrl {
    fn default() -> Self {
        Self::from_valid_params(Params::default())
    }
}

impl State for IkCtrl {
    type InitData = &'static str;
    type InitError = IkCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = IkCtrlError;

    /// Initialise the IkCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data)?;

        *self = Self::new(params)?;

        self.arch_output = Archiver::from_path(session, "ik_ctrl/output.csv")?;

        Ok(())
    }

    /// Perform one tick of IK control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport {
            mode: self.state.mode,
            active: self.state.is_active,
            ..Default::default()
        };

        // Inactive controller keeps the joints where they are
        if !self.state.is_active {
            self.output = OutputData {
                joint_pos_rad: self.state.joint_pos_rad,
                joint_rate_rads: [0.0; NUM_JOINTS],
            };

            return Ok((self.output, self.report));
        }

        let position_m = match input_data.ee_position_m {
            Some(p) => {
                self.last_position_m = p;
                p
            }
            None => {
                warn!(
                    "No end effector position this cycle, holding the previous output \
                    (last known position {:?})",
                    self.last_position_m.as_slice()
                );
                self.report.pose_stale = true;
                self.report.error_norm_m = (self.state.target_m - self.last_position_m).norm();

                return Ok((self.output, self.report));
            }
        };

        let error_m = self.state.target_m - position_m;
        self.report.error_norm_m = error_m.norm();

        // Cartesian velocity demand
        let v_ms = match self.state.mode {
            ControllerMode::TrackFixedTarget | ControllerMode::TrackRepeatingRandomTarget => {
                error_m * self.params.k_p
            }
            ControllerMode::TrackVelocity => self.cmd_vel_ms,
            ControllerMode::Idle => Vector3::zeros(),
        };

        // Map into joint space
        let jacobian = self.arm.position_jacobian(&self.state.joint_pos_rad);
        let mut q_dot = match damped_least_squares(&jacobian, &v_ms, self.params.damping) {
            Ok(q) => q,
            Err(e) => {
                warn!("Cannot compute joint rates, demanding zero: {}", e);
                Vector3::zeros()
            }
        };

        // Convergence only makes sense when tracking a position
        if self.state.mode.is_position_tracking()
            && self.report.error_norm_m < self.params.convergence_threshold_m
        {
            info!(
                "Finished at x: {:.4}, y: {:.4}, z: {:.4}",
                position_m[0], position_m[1], position_m[2]
            );

            q_dot = Vector3::zeros();
            self.state.is_active = false;
            self.report.converged = true;

            if self.state.mode == ControllerMode::TrackRepeatingRandomTarget {
                self.state.target_m = input_data.random_target_m;
                self.state.is_active = true;
                self.report.rearmed = true;

                debug!(
                    "Re-armed with random target {:?}",
                    self.state.target_m.as_slice()
                );
            }
        }

        // Integrate the rates into the joint positions
        let dt_s = self.params.period_s();
        let mut joint_rate_rads = [0.0; NUM_JOINTS];
        for i in 0..NUM_JOINTS {
            joint_rate_rads[i] = q_dot[i];
            self.state.joint_pos_rad[i] = wrap_to_2pi(self.state.joint_pos_rad[i] + q_dot[i] * dt_s);
        }

        self.output = OutputData {
            joint_pos_rad: self.state.joint_pos_rad,
            joint_rate_rads,
        };

        trace!(
            "IkCtrl output:\n    pos: {:?}\n    rate: {:?}\n    err: {:.6}",
            self.output.joint_pos_rad,
            self.output.joint_rate_rads,
            self.report.error_norm_m
        );

        Ok((self.output, self.report))
    }
}

impl Archived for IkCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_output.serialise(ArchRecord {
            time_s: session::get_elapsed_seconds(),
            mode: self.report.mode,
            active: self.report.active,
            pose_stale: self.report.pose_stale,
            converged: self.report.converged,
            error_norm_m: self.report.error_norm_m,
            target_x_m: self.state.target_m[0],
            target_y_m: self.state.target_m[1],
            target_z_m: self.state.target_m[2],
            pos_1_rad: self.output.joint_pos_rad[0],
            pos_2_rad: self.output.joint_pos_rad[1],
            pos_3_rad: self.output.joint_pos_rad[2],
            rate_1_rads: self.output.joint_rate_rads[0],
            rate_2_rads: self.output.joint_rate_rads[1],
            rate_3_rads: self.output.joint_rate_rads[2],
        })
    }
}

impl IkCtrl {
    /// Create a new controller from the given parameters.
    ///
    /// The controller starts `Idle` at the parameter's initial joint
    /// configuration.
    pub fn new(params: Params) -> Result<Self, IkCtrlError> {
        params.validate()?;

        Ok(Self::from_valid_params(params))
    }

    fn from_valid_params(params: Params) -> Self {
        let mut joint_pos_rad = params.initial_joint_pos_rad;
        for q in joint_pos_rad.iter_mut() {
            *q = wrap_to_2pi(*q);
        }

        let arm = Arm::new(params.arm.clone());
        let last_position_m = arm.ee_position_m(&joint_pos_rad);

        Self {
            arm,
            state: ControllerState {
                mode: ControllerMode::Idle,
                target_m: Vector3::zeros(),
                joint_pos_rad,
                is_active: false,
            },
            cmd_vel_ms: Vector3::zeros(),
            last_position_m,
            report: StatusReport::default(),
            output: OutputData {
                joint_pos_rad,
                joint_rate_rads: [0.0; NUM_JOINTS],
            },
            arch_output: Archiver::default(),
            params,
        }
    }

    /// Handle a mode selection request.
    ///
    /// `random_target_m` is the latest accepted random target, used when
    /// repeating random tracking is requested. An unknown mode is rejected and
    /// puts the controller back to `Idle`. A fixed target request without a
    /// position is rejected and leaves the controller untouched. The new mode
    /// takes effect on the next cycle.
    pub fn mode_select(
        &mut self,
        request: &ModeSelectRequest,
        random_target_m: Vector3<f64>,
    ) -> ModeSelectResponse {
        let accepted = match self.try_mode_select(request, random_target_m) {
            Ok(()) => {
                info!(
                    "Mode {:?} selected, target {:?}",
                    self.state.mode,
                    self.state.target_m.as_slice()
                );
                true
            }
            Err(e) => {
                warn!("Mode selection rejected: {}", e);
                false
            }
        };

        ModeSelectResponse {
            accepted,
            mode: request.mode,
        }
    }

    fn try_mode_select(
        &mut self,
        request: &ModeSelectRequest,
        random_target_m: Vector3<f64>,
    ) -> Result<(), IkCtrlError> {
        // An unknown mode stops any tracking in progress
        let mode = match ControllerMode::try_from(request.mode) {
            Ok(m) => m,
            Err(e) => {
                self.state.mode = ControllerMode::Idle;
                self.state.is_active = false;
                return Err(e);
            }
        };

        match mode {
            ControllerMode::TrackFixedTarget => match request.target_position_m {
                Some(t) => self.state.target_m = Vector3::from(t),
                None => return Err(IkCtrlError::MissingTarget(mode)),
            },
            ControllerMode::TrackRepeatingRandomTarget => self.state.target_m = random_target_m,
            ControllerMode::TrackVelocity | ControllerMode::Idle => (),
        }

        self.state.mode = mode;
        self.state.is_active = true;

        Ok(())
    }

    /// Set the linear velocity demand used in velocity tracking mode.
    pub fn set_cmd_vel(&mut self, cmd: &CmdVel) {
        self.cmd_vel_ms = Vector3::from(cmd.linear_ms);
    }

    /// Get the current controller state.
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Get the controller's parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Get the arm model used by the controller.
    pub fn arm(&self) -> &Arm {
        &self.arm
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::TAU;

    /// Run one tick with the end effector position given by the forward
    /// kinematics of the controller's own joint estimate.
    fn tick(ctrl: &mut IkCtrl, random_target_m: Vector3<f64>) -> (OutputData, StatusReport) {
        let p = ctrl.arm().ee_position_m(&ctrl.state().joint_pos_rad);

        ctrl.proc(&InputData {
            ee_position_m: Some(p),
            random_target_m,
        })
        .unwrap()
    }

    fn error_norm(ctrl: &IkCtrl) -> f64 {
        (ctrl.state().target_m - ctrl.arm().ee_position_m(&ctrl.state().joint_pos_rad)).norm()
    }

    fn select(ctrl: &mut IkCtrl, mode: i64, target: Option<[f64; 3]>) -> ModeSelectResponse {
        ctrl.mode_select(
            &ModeSelectRequest {
                mode,
                target_position_m: target,
            },
            Vector3::zeros(),
        )
    }

    fn assert_wrapped(q: &[f64; NUM_JOINTS]) {
        for a in q.iter() {
            assert!(*a >= 0.0 && *a < TAU, "Joint angle {} not in [0, 2pi)", a);
        }
    }

    #[test]
    fn test_starts_idle() {
        let ctrl = IkCtrl::new(Params::default()).unwrap();

        assert_eq!(ctrl.state().mode, ControllerMode::Idle);
        assert!(!ctrl.state().is_active);
        assert_eq!(ctrl.state().joint_pos_rad, [0.0, 0.0, 1.4]);
    }

    #[test]
    fn test_idle_is_noop() {
        let mut ctrl = IkCtrl::new(Params::default()).unwrap();
        let q0 = ctrl.state().joint_pos_rad;

        for _ in 0..10 {
            let (out, rpt) = ctrl
                .proc(&InputData {
                    ee_position_m: Some(Vector3::new(1.0, 2.0, 3.0)),
                    random_target_m: Vector3::new(0.1, 0.1, 0.1),
                })
                .unwrap();

            assert_eq!(out.joint_pos_rad, q0);
            assert_eq!(out.joint_rate_rads, [0.0; NUM_JOINTS]);
            assert!(!rpt.active);
        }

        // A missing pose doesn't matter when idle either
        let (out, _) = ctrl.proc(&InputData::default()).unwrap();
        assert_eq!(out.joint_pos_rad, q0);
        assert_eq!(out.joint_rate_rads, [0.0; NUM_JOINTS]);
    }

    #[test]
    fn test_fixed_target_converges() {
        let mut ctrl = IkCtrl::new(Params::default()).unwrap();

        let rsp = select(&mut ctrl, 1, Some([0.3, 0.0, 0.4]));
        assert_eq!(
            rsp,
            ModeSelectResponse {
                accepted: true,
                mode: 1
            }
        );
        assert!(ctrl.state().is_active);
        assert_eq!(ctrl.state().target_m, Vector3::new(0.3, 0.0, 0.4));

        let mut prev_err = error_norm(&ctrl);
        let mut num_ticks = 0;

        while ctrl.state().is_active {
            let (out, rpt) = tick(&mut ctrl, Vector3::zeros());
            num_ticks += 1;
            assert!(num_ticks < 20_000, "Did not converge");
            assert_wrapped(&out.joint_pos_rad);

            if rpt.converged {
                assert!(rpt.error_norm_m < 1e-3);
                assert!(!rpt.rearmed);
                assert_eq!(out.joint_rate_rads, [0.0; NUM_JOINTS]);
                break;
            }

            let err = error_norm(&ctrl);
            assert!(
                err < prev_err,
                "Error increased from {} to {} on tick {}",
                prev_err,
                err,
                num_ticks
            );
            prev_err = err;
        }

        assert!(!ctrl.state().is_active);
        assert!(error_norm(&ctrl) < 1e-3);

        // Stays put once finished
        let q = ctrl.state().joint_pos_rad;
        let (out, _) = tick(&mut ctrl, Vector3::zeros());
        assert_eq!(out.joint_pos_rad, q);
        assert_eq!(out.joint_rate_rads, [0.0; NUM_JOINTS]);
    }

    #[test]
    fn test_reselect_restarts_tracking() {
        let mut ctrl = IkCtrl::new(Params::default()).unwrap();

        select(&mut ctrl, 1, Some([0.3, 0.0, 0.4]));
        for _ in 0..50 {
            tick(&mut ctrl, Vector3::zeros());
        }
        let q = ctrl.state().joint_pos_rad;

        // Same request again continues from where the arm is now
        select(&mut ctrl, 1, Some([0.3, 0.0, 0.4]));
        assert!(ctrl.state().is_active);
        assert_eq!(ctrl.state().joint_pos_rad, q);
    }

    #[test]
    fn test_velocity_mode() {
        let mut ctrl = IkCtrl::new(Params::default()).unwrap();
        let v = [0.0, 0.05, -0.02];

        ctrl.set_cmd_vel(&CmdVel { linear_ms: v });
        assert!(select(&mut ctrl, 2, None).accepted);

        let p0 = ctrl.arm().ee_position_m(&ctrl.state().joint_pos_rad);
        for _ in 0..100 {
            let (_, rpt) = tick(&mut ctrl, Vector3::zeros());
            assert!(!rpt.converged);
        }
        let p1 = ctrl.arm().ee_position_m(&ctrl.state().joint_pos_rad);

        // One second at v, the damping costs a little accuracy
        let moved = p1 - p0;
        let v = Vector3::from(v);
        assert!(moved.dot(&v) > 0.0);
        assert!((moved - v).norm() < 0.2 * v.norm());
        assert!(ctrl.state().is_active);
    }

    #[test]
    fn test_velocity_mode_never_converges() {
        let mut ctrl = IkCtrl::new(Params::default()).unwrap();

        // Zero velocity with the target on top of the end effector
        select(&mut ctrl, 2, None);
        ctrl.state.target_m = ctrl.arm().ee_position_m(&ctrl.state().joint_pos_rad);

        let (out, rpt) = tick(&mut ctrl, Vector3::zeros());
        assert!(!rpt.converged);
        assert!(ctrl.state().is_active);
        assert_eq!(out.joint_rate_rads, [0.0; NUM_JOINTS]);
    }

    #[test]
    fn test_angles_stay_wrapped() {
        let mut ctrl = IkCtrl::new(Params::default()).unwrap();

        select(&mut ctrl, 2, None);

        for (i, v) in [[1.0, -2.0, 0.5], [-3.0, 0.0, 4.0], [0.0, 10.0, -10.0]]
            .iter()
            .cycle()
            .take(3000)
            .enumerate()
        {
            if i % 100 == 0 {
                ctrl.set_cmd_vel(&CmdVel { linear_ms: *v });
            }
            let (out, _) = tick(&mut ctrl, Vector3::zeros());
            assert_wrapped(&out.joint_pos_rad);
            assert_wrapped(&ctrl.state().joint_pos_rad);
        }
    }

    #[test]
    fn test_pose_lookup_failure_holds_output() {
        let mut ctrl = IkCtrl::new(Params::default()).unwrap();

        select(&mut ctrl, 1, Some([0.3, 0.0, 0.4]));
        let mut prev = OutputData::default();
        for _ in 0..10 {
            prev = tick(&mut ctrl, Vector3::zeros()).0;
        }
        let q = ctrl.state().joint_pos_rad;

        let (out, rpt) = ctrl.proc(&InputData::default()).unwrap();

        assert!(rpt.pose_stale);
        assert_eq!(out, prev);
        assert_eq!(ctrl.state().joint_pos_rad, q);
        assert!(ctrl.state().is_active);

        // And carries on once the pose is back
        let (out, rpt) = tick(&mut ctrl, Vector3::zeros());
        assert!(!rpt.pose_stale);
        assert_ne!(out.joint_pos_rad, q);
    }

    #[test]
    fn test_random_target_without_candidate() {
        let mut ctrl = IkCtrl::new(Params::default()).unwrap();

        // Nothing sampled yet, so the target is the zero initialised slot
        assert!(select(&mut ctrl, 3, None).accepted);
        assert_eq!(ctrl.state().mode, ControllerMode::TrackRepeatingRandomTarget);
        assert_eq!(ctrl.state().target_m, Vector3::zeros());

        // New candidates don't change the target until it's reached
        tick(&mut ctrl, Vector3::new(0.2, 0.2, 0.4));
        assert_eq!(ctrl.state().target_m, Vector3::zeros());
    }

    #[test]
    fn test_random_target_rearms() {
        let mut ctrl = IkCtrl::new(Params::default()).unwrap();
        let here = ctrl.arm().ee_position_m(&ctrl.state().joint_pos_rad);

        // Select with the current position as the candidate so the first
        // tick converges
        ctrl.mode_select(
            &ModeSelectRequest {
                mode: 3,
                target_position_m: None,
            },
            here,
        );
        assert_eq!(ctrl.state().target_m, here);

        let q = ctrl.state().joint_pos_rad;
        let next = Vector3::new(0.25, 0.1, 0.35);
        let (out, rpt) = tick(&mut ctrl, next);

        assert!(rpt.converged);
        assert!(rpt.rearmed);
        assert_eq!(out.joint_rate_rads, [0.0; NUM_JOINTS]);
        assert_eq!(out.joint_pos_rad, q);
        assert!(ctrl.state().is_active);
        assert_eq!(ctrl.state().target_m, next);

        // Then tracks the new candidate all the way
        let mut num_ticks = 0;
        loop {
            let (_, rpt) = tick(&mut ctrl, Vector3::new(0.3, 0.0, 0.4));
            num_ticks += 1;
            assert!(num_ticks < 20_000, "Did not converge");

            if rpt.converged {
                assert!(rpt.rearmed);
                break;
            }
        }
        assert!((ctrl.arm().ee_position_m(&ctrl.state().joint_pos_rad) - next).norm() < 1e-3);
        assert_eq!(ctrl.state().target_m, Vector3::new(0.3, 0.0, 0.4));
        assert!(ctrl.state().is_active);
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let mut ctrl = IkCtrl::new(Params::default()).unwrap();
        let before = *ctrl.state();

        for mode in [0, 4, -1].iter() {
            let rsp = select(&mut ctrl, *mode, Some([0.3, 0.0, 0.4]));

            assert_eq!(
                rsp,
                ModeSelectResponse {
                    accepted: false,
                    mode: *mode
                }
            );
            assert_eq!(*ctrl.state(), before);
        }
    }

    #[test]
    fn test_invalid_mode_stops_tracking() {
        let mut ctrl = IkCtrl::new(Params::default()).unwrap();

        assert!(select(&mut ctrl, 1, Some([0.3, 0.0, 0.4])).accepted);
        for _ in 0..10 {
            tick(&mut ctrl, Vector3::zeros());
        }
        let q = ctrl.state().joint_pos_rad;

        let rsp = select(&mut ctrl, 7, None);
        assert_eq!(
            rsp,
            ModeSelectResponse {
                accepted: false,
                mode: 7
            }
        );
        assert_eq!(ctrl.state().mode, ControllerMode::Idle);
        assert!(!ctrl.state().is_active);

        let (out, rpt) = tick(&mut ctrl, Vector3::zeros());
        assert!(!rpt.active);
        assert_eq!(out.joint_rate_rads, [0.0; NUM_JOINTS]);
        assert_eq!(out.joint_pos_rad, q);
        assert_eq!(ctrl.state().joint_pos_rad, q);
    }

    #[test]
    fn test_fixed_target_requires_position() {
        let mut ctrl = IkCtrl::new(Params::default()).unwrap();

        assert!(!select(&mut ctrl, 1, None).accepted);
        assert!(!ctrl.state().is_active);
        assert_eq!(ctrl.state().mode, ControllerMode::Idle);
    }

    #[test]
    fn test_invalid_params() {
        let mut params = Params::default();
        params.frequency_hz = 0.0;

        assert!(matches!(
            IkCtrl::new(params),
            Err(IkCtrlError::InvalidParams(_))
        ));
    }
}
