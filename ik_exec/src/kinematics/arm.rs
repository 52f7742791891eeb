//! Modified Denavit-Hartenberg arm model

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Isometry3, Matrix3, Vector3};
use serde::{Deserialize, Serialize};

// Internal
use super::NUM_JOINTS;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Modified (Craig) DH parameters of a single revolute link.
///
/// The transform from the previous frame to this link's frame is
/// `Rx(alpha) * Tx(a) * Rz(q + offset) * Tz(d)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkParams {
    /// Distance along the previous x axis.
    ///
    /// Units: meters
    pub a_m: f64,

    /// Twist about the previous x axis.
    ///
    /// Units: radians
    pub alpha_rad: f64,

    /// Distance along this link's z axis.
    ///
    /// Units: meters
    pub d_m: f64,

    /// Constant offset added to the joint angle.
    ///
    /// Units: radians
    #[serde(default)]
    pub offset_rad: f64,
}

/// Geometry of the arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmParams {
    /// The links, from the base outwards.
    pub links: [LinkParams; NUM_JOINTS],

    /// Offset of the end effector along the last link's x axis.
    ///
    /// Units: meters
    pub tool_x_m: f64,
}

/// A three joint revolute arm.
#[derive(Debug, Clone, Default)]
pub struct Arm {
    params: ArmParams,
}

/// Frames of the arm for a particular joint configuration, all expressed in
/// the base frame.
#[derive(Debug, Clone, Copy)]
pub struct ArmFrames {
    /// Frame of each joint. The joint rotates about this frame's z axis.
    pub joints: [Isometry3<f64>; NUM_JOINTS],

    /// End effector frame.
    pub tool: Isometry3<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ArmParams {
    /// The RRR arm: a 0.2 m base column, a shoulder twisted by pi/2 and
    /// offset 0.02 m, a 0.25 m upper arm and a 0.28 m forearm.
    fn default() -> Self {
        Self {
            links: [
                LinkParams {
                    a_m: 0.0,
                    alpha_rad: 0.0,
                    d_m: 0.2,
                    offset_rad: 0.0,
                },
                LinkParams {
                    a_m: 0.0,
                    alpha_rad: std::f64::consts::FRAC_PI_2,
                    d_m: 0.02,
                    offset_rad: 0.0,
                },
                LinkParams {
                    a_m: 0.25,
                    alpha_rad: 0.0,
                    d_m: 0.0,
                    offset_rad: 0.0,
                },
            ],
            tool_x_m: 0.28,
        }
    }
}

impl LinkParams {
    /// Transform from the previous link's frame to this one for the joint
    /// angle `q_rad`.
    pub fn transform(&self, q_rad: f64) -> Isometry3<f64> {
        Isometry3::rotation(Vector3::x() * self.alpha_rad)
            * Isometry3::translation(self.a_m, 0.0, 0.0)
            * Isometry3::rotation(Vector3::z() * (q_rad + self.offset_rad))
            * Isometry3::translation(0.0, 0.0, self.d_m)
    }
}

impl Arm {
    /// Create a new arm from its geometry.
    pub fn new(params: ArmParams) -> Self {
        Self { params }
    }

    /// Get the geometry of the arm.
    pub fn params(&self) -> &ArmParams {
        &self.params
    }

    /// Compute every frame of the arm at the joint configuration `q_rad`.
    pub fn forward(&self, q_rad: &[f64; NUM_JOINTS]) -> ArmFrames {
        let mut joints = [Isometry3::identity(); NUM_JOINTS];
        let mut frame = Isometry3::identity();

        for (i, link) in self.params.links.iter().enumerate() {
            frame *= link.transform(q_rad[i]);
            joints[i] = frame;
        }

        ArmFrames {
            joints,
            tool: frame * Isometry3::translation(self.params.tool_x_m, 0.0, 0.0),
        }
    }

    /// Position of the end effector in the base frame.
    ///
    /// Units: meters
    pub fn ee_position_m(&self, q_rad: &[f64; NUM_JOINTS]) -> Vector3<f64> {
        self.forward(q_rad).tool.translation.vector
    }

    /// The linear (position) block of the base frame geometric Jacobian.
    ///
    /// Column `i` is `z_i x (p_ee - p_i)`, where `z_i` and `p_i` are the axis
    /// and origin of joint `i`.
    pub fn position_jacobian(&self, q_rad: &[f64; NUM_JOINTS]) -> Matrix3<f64> {
        let frames = self.forward(q_rad);
        let p_ee = frames.tool.translation.vector;

        let mut cols = [Vector3::zeros(); NUM_JOINTS];
        for (col, joint) in cols.iter_mut().zip(frames.joints.iter()) {
            let z = joint.rotation * Vector3::z();
            *col = z.cross(&(p_ee - joint.translation.vector));
        }

        Matrix3::from_columns(&cols)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
