//! Joint layout of the Nao lower body.
//!
//! Angles follow the robot's own conventions: a negative hip pitch swings the
//! leg forward, a positive knee pitch bends the knee and a negative ankle
//! pitch lifts the toes. Both hip rolls are positive when the leg moves
//! towards the robot's left.

/// Number of actuated joints driven by an action.
pub const JOINT_COUNT: usize = 2 * LegJoints::COUNT;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// `+1` for the left leg, `-1` for the right one.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LegJoints {
    pub hip_yaw_pitch: f32,
    pub hip_roll: f32,
    pub hip_pitch: f32,
    pub knee_pitch: f32,
    pub ankle_pitch: f32,
    pub ankle_roll: f32,
}

impl LegJoints {
    pub const COUNT: usize = 6;

    #[must_use]
    pub const fn fill(value: f32) -> Self {
        Self {
            hip_yaw_pitch: value,
            hip_roll: value,
            hip_pitch: value,
            knee_pitch: value,
            ankle_pitch: value,
            ankle_roll: value,
        }
    }

    #[must_use]
    pub const fn to_array(self) -> [f32; Self::COUNT] {
        [
            self.hip_yaw_pitch,
            self.hip_roll,
            self.hip_pitch,
            self.knee_pitch,
            self.ankle_pitch,
            self.ankle_roll,
        ]
    }

    #[must_use]
    pub const fn from_array(values: [f32; Self::COUNT]) -> Self {
        Self {
            hip_yaw_pitch: values[0],
            hip_roll: values[1],
            hip_pitch: values[2],
            knee_pitch: values[3],
            ankle_pitch: values[4],
            ankle_roll: values[5],
        }
    }

    #[must_use]
    pub fn map(self, f: impl FnMut(f32) -> f32) -> Self {
        Self::from_array(self.to_array().map(f))
    }

    /// Applies `f` joint by joint to `self` and `other`.
    #[must_use]
    pub fn zip_with(self, other: Self, mut f: impl FnMut(f32, f32) -> f32) -> Self {
        let a = self.to_array();
        let b = other.to_array();
        Self::from_array(std::array::from_fn(|i| f(a[i], b[i])))
    }

    #[must_use]
    pub fn clamp(self, lower: Self, upper: Self) -> Self {
        self.zip_with(lower, f32::max).zip_with(upper, f32::min)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BodyJoints {
    pub left: LegJoints,
    pub right: LegJoints,
}

impl BodyJoints {
    /// Slightly crouched posture with flat feet, the pose a zero action holds.
    pub const STAND: Self = Self {
        left: LegJoints {
            hip_yaw_pitch: 0.0,
            hip_roll: 0.0,
            hip_pitch: -0.44,
            knee_pitch: 0.94,
            ankle_pitch: -0.5,
            ankle_roll: 0.0,
        },
        right: LegJoints {
            hip_yaw_pitch: 0.0,
            hip_roll: 0.0,
            hip_pitch: -0.44,
            knee_pitch: 0.94,
            ankle_pitch: -0.5,
            ankle_roll: 0.0,
        },
    };

    pub const LOWER_LIMITS: Self = Self {
        left: LegJoints {
            hip_yaw_pitch: -1.145,
            hip_roll: -0.379,
            hip_pitch: -1.535,
            knee_pitch: -0.092,
            ankle_pitch: -1.189,
            ankle_roll: -0.397,
        },
        right: LegJoints {
            hip_yaw_pitch: -1.145,
            hip_roll: -0.790,
            hip_pitch: -1.535,
            knee_pitch: -0.092,
            ankle_pitch: -1.189,
            ankle_roll: -0.769,
        },
    };

    pub const UPPER_LIMITS: Self = Self {
        left: LegJoints {
            hip_yaw_pitch: 0.741,
            hip_roll: 0.790,
            hip_pitch: 0.484,
            knee_pitch: 2.112,
            ankle_pitch: 0.923,
            ankle_roll: 0.769,
        },
        right: LegJoints {
            hip_yaw_pitch: 0.741,
            hip_roll: 0.379,
            hip_pitch: 0.484,
            knee_pitch: 2.112,
            ankle_pitch: 0.923,
            ankle_roll: 0.397,
        },
    };

    #[must_use]
    pub const fn fill(value: f32) -> Self {
        Self {
            left: LegJoints::fill(value),
            right: LegJoints::fill(value),
        }
    }

    #[must_use]
    pub const fn leg(&self, side: Side) -> &LegJoints {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Left leg first, then right leg, each in [`LegJoints::to_array`] order.
    #[must_use]
    pub fn to_array(self) -> [f32; JOINT_COUNT] {
        let left = self.left.to_array();
        let right = self.right.to_array();
        std::array::from_fn(|i| {
            if i < LegJoints::COUNT {
                left[i]
            } else {
                right[i - LegJoints::COUNT]
            }
        })
    }

    /// Inverse of [`BodyJoints::to_array`]; `None` when the slice has the
    /// wrong length.
    #[must_use]
    pub fn from_slice(values: &[f32]) -> Option<Self> {
        if values.len() != JOINT_COUNT {
            return None;
        }
        Some(Self {
            left: LegJoints::from_array(std::array::from_fn(|i| values[i])),
            right: LegJoints::from_array(std::array::from_fn(|i| values[LegJoints::COUNT + i])),
        })
    }

    #[must_use]
    pub fn map(self, mut f: impl FnMut(f32) -> f32) -> Self {
        Self {
            left: self.left.map(&mut f),
            right: self.right.map(&mut f),
        }
    }

    #[must_use]
    pub fn zip_with(self, other: Self, mut f: impl FnMut(f32, f32) -> f32) -> Self {
        Self {
            left: self.left.zip_with(other.left, &mut f),
            right: self.right.zip_with(other.right, &mut f),
        }
    }

    #[must_use]
    pub fn clamp_to_limits(self) -> Self {
        Self {
            left: self.left.clamp(Self::LOWER_LIMITS.left, Self::UPPER_LIMITS.left),
            right: self.right.clamp(Self::LOWER_LIMITS.right, Self::UPPER_LIMITS.right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_layout_round_trips() {
        let joints = BodyJoints::STAND;
        let array = joints.to_array();
        assert_eq!(array[2], -0.44);
        assert_eq!(array[LegJoints::COUNT + 3], 0.94);
        assert_eq!(BodyJoints::from_slice(&array), Some(joints));
        assert_eq!(BodyJoints::from_slice(&array[1..]), None);
    }

    #[test]
    fn stand_pose_is_within_limits() {
        assert_eq!(BodyJoints::STAND.clamp_to_limits(), BodyJoints::STAND);
    }

    #[test]
    fn clamp_saturates_both_ends() {
        let clamped = BodyJoints::fill(10.0).clamp_to_limits();
        assert_eq!(clamped, BodyJoints::UPPER_LIMITS);
        let clamped = BodyJoints::fill(-10.0).clamp_to_limits();
        assert_eq!(clamped, BodyJoints::LOWER_LIMITS);
    }
}
