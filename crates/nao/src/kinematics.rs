//! Forward kinematics of the Nao legs in the torso frame.
//!
//! The torso frame has `x` forward, `y` to the left and `z` up, with the
//! origin between the hips at the height of the torso centre.

use crate::joints::{LegJoints, Side};
use glam::Vec3;

pub const HIP_OFFSET_Y: f32 = 0.05;
pub const HIP_OFFSET_Z: f32 = 0.085;
pub const THIGH_LENGTH: f32 = 0.1;
pub const TIBIA_LENGTH: f32 = 0.1029;
pub const FOOT_HEIGHT: f32 = 0.045_19;
pub const FOOT_LENGTH: f32 = 0.16;
pub const FOOT_WIDTH: f32 = 0.088;

/// Joint positions of one leg plus the orientation of its sole, all relative
/// to the torso.
#[derive(Copy, Clone, Debug)]
pub struct LegPose {
    pub hip: Vec3,
    pub knee: Vec3,
    pub ankle: Vec3,
    pub sole: Vec3,
    /// Sole pitch relative to the torso, positive when the toes point down.
    pub sole_pitch: f32,
    /// Sole roll relative to the torso.
    pub sole_roll: f32,
    /// Sole yaw relative to the torso.
    pub sole_yaw: f32,
}

#[must_use]
pub fn leg_pose(side: Side, joints: &LegJoints) -> LegPose {
    let hip = Vec3::new(0.0, side.sign() * HIP_OFFSET_Y, -HIP_OFFSET_Z);

    // Sagittal chain, angles measured from the downward vertical.
    let thigh_angle = -joints.hip_pitch;
    let tibia_angle = thigh_angle - joints.knee_pitch;
    let knee_sagittal = glam::Vec2::new(
        THIGH_LENGTH * thigh_angle.sin(),
        -THIGH_LENGTH * thigh_angle.cos(),
    );
    let ankle_sagittal = knee_sagittal
        + glam::Vec2::new(
            TIBIA_LENGTH * tibia_angle.sin(),
            -TIBIA_LENGTH * tibia_angle.cos(),
        );

    // Hip roll swings the whole chain sideways around the hip.
    let (roll_sin, roll_cos) = joints.hip_roll.sin_cos();
    let lift = |p: glam::Vec2| Vec3::new(p.x, -p.y * roll_sin, p.y * roll_cos);

    let knee = hip + lift(knee_sagittal);
    let ankle = hip + lift(ankle_sagittal);
    let sole = ankle + Vec3::new(0.0, -FOOT_HEIGHT * roll_sin, -FOOT_HEIGHT * roll_cos);

    LegPose {
        hip,
        knee,
        ankle,
        sole,
        sole_pitch: joints.hip_pitch + joints.knee_pitch + joints.ankle_pitch,
        sole_roll: joints.hip_roll + joints.ankle_roll,
        sole_yaw: -side.sign() * joints.hip_yaw_pitch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joints::BodyJoints;

    #[test]
    fn straight_leg_hangs_below_hip() {
        let pose = leg_pose(Side::Left, &LegJoints::default());
        let expected = HIP_OFFSET_Z + THIGH_LENGTH + TIBIA_LENGTH + FOOT_HEIGHT;
        assert!((pose.sole.z + expected).abs() < 1e-6);
        assert!(pose.sole.x.abs() < 1e-6);
        assert!((pose.sole.y - HIP_OFFSET_Y).abs() < 1e-6);
    }

    #[test]
    fn stand_pose_has_flat_soles_under_the_hips() {
        for side in [Side::Left, Side::Right] {
            let pose = leg_pose(side, BodyJoints::STAND.leg(side));
            assert!(pose.sole_pitch.abs() < 1e-6);
            assert!(pose.sole_roll.abs() < 1e-6);
            assert!(pose.sole.x.abs() < 0.01, "sole.x = {}", pose.sole.x);
            assert!(pose.sole.z < -0.3 && pose.sole.z > -0.32, "sole.z = {}", pose.sole.z);
        }
    }

    #[test]
    fn swinging_hip_forward_moves_sole_forward() {
        let mut joints = LegJoints::default();
        joints.hip_pitch = -0.5;
        let pose = leg_pose(Side::Right, &joints);
        assert!(pose.sole.x > 0.05);
    }
}
