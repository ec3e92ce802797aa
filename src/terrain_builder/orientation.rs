//! Quaternion to Terrain Builder Euler angle conversion
//!
//! World Creator stores orientation as a Y-up, left-handed quaternion.
//! Terrain Builder wants yaw/pitch/roll in degrees in a Z-up frame. Two
//! extraction algorithms have produced shipped files over time, so both are
//! kept behind [`RotationStrategy`]:
//!
//! - [`RotationStrategy::Basis`] remaps the rotation into Z-up space and reads
//!   the angles off the rotated basis vectors, with an explicit branch for
//!   gimbal lock. This is the default.
//! - [`RotationStrategy::Direct`] applies closed-form quaternion to Euler
//!   formulas without any axis remap or gimbal handling. Only useful to
//!   reproduce legacy output.

use glam::{DMat3, DQuat, DVec3};
use std::f64::consts::FRAC_PI_2;

/// `|up.y|` above which the basis extraction treats the rotation as gimbal locked
pub const GIMBAL_THRESHOLD: f64 = 0.999;

/// Quaternions shorter than this cannot be normalized
const MIN_QUAT_LENGTH: f64 = 1e-6;

/// Swaps the Y and Z axes (Y-up <-> Z-up)
const SWAP_YZ: DMat3 = DMat3::from_cols(DVec3::X, DVec3::Z, DVec3::Y);

/// Angle extraction algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationStrategy {
    /// Basis-vector extraction in Z-up space with gimbal lock handling
    #[default]
    Basis,
    /// Legacy closed-form conversion, no remap, no gimbal handling
    Direct,
}

/// Terrain Builder rotation in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerAngles {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl EulerAngles {
    fn from_radians(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self {
            yaw: yaw.to_degrees(),
            pitch: pitch.to_degrees(),
            roll: roll.to_degrees(),
        }
    }
}

/// Converts source quaternions with a fixed strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct OrientationConverter {
    strategy: RotationStrategy,
}

impl OrientationConverter {
    pub fn new(strategy: RotationStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> RotationStrategy {
        self.strategy
    }

    /// Convert an `[x, y, z, w]` quaternion.
    ///
    /// The input is normalized first. Returns `None` when it has a
    /// non-finite component or (near) zero length.
    pub fn convert(&self, quat: [f32; 4]) -> Option<EulerAngles> {
        let q = normalize(quat)?;
        Some(match self.strategy {
            RotationStrategy::Basis => basis_euler(q),
            RotationStrategy::Direct => direct_euler(q),
        })
    }
}

fn normalize(quat: [f32; 4]) -> Option<DQuat> {
    let [x, y, z, w] = quat.map(f64::from);
    let q = DQuat::from_xyzw(x, y, z, w);
    if !q.is_finite() {
        return None;
    }
    let length = q.length();
    if length < MIN_QUAT_LENGTH {
        return None;
    }
    Some(q / length)
}

/// Legacy closed-form extraction from a unit quaternion.
///
/// yaw = rotY, pitch = rotX, roll = rotZ.
pub fn direct_euler(q: DQuat) -> EulerAngles {
    let (x, y, z, w) = (q.x, q.y, q.z, q.w);

    let rot_x = (2.0 * x * y - 2.0 * z * w).clamp(-1.0, 1.0).asin();
    let rot_y = (2.0 * y * w - 2.0 * x * z).atan2(1.0 - 2.0 * y * y - 2.0 * z * z);
    let rot_z = (2.0 * x * w - 2.0 * y * z).atan2(1.0 - 2.0 * x * x - 2.0 * z * z);

    EulerAngles::from_radians(rot_y, rot_x, rot_z)
}

/// Basis-vector extraction in Z-up space from a unit quaternion.
///
/// yaw = zRot (heading), pitch = xRot, roll = yRot.
pub fn basis_euler(q: DQuat) -> EulerAngles {
    let m = SWAP_YZ * DMat3::from_quat(q) * SWAP_YZ;
    let dir = m.y_axis;
    let up = m.z_axis;
    let aside = dir.cross(up);

    let (x_rot, y_rot, z_rot) = if up.y.abs() < GIMBAL_THRESHOLD {
        let x_rot = -up.y.asin();
        let s = if x_rot.cos() >= 0.0 { 1.0 } else { -1.0 };
        (
            x_rot,
            (up.x * s).atan2(up.z * s),
            (-aside.y * s).atan2(dir.y * s),
        )
    } else if up.y < 0.0 {
        (FRAC_PI_2, dir.x.atan2(dir.z), 0.0)
    } else {
        (-FRAC_PI_2, (-dir.x).atan2(-dir.z), 0.0)
    };

    EulerAngles::from_radians(z_rot, x_rot, y_rot)
}
