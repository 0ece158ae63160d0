//! # Nao Walking Environment
//!
//! [`NaoWalking`] steps a reduced-order Nao model. An action holds one value
//! in `[-1, 1]` per leg joint and is mapped to joint position targets around
//! [`BodyJoints::STAND`], so the zero action keeps the robot standing.
//!
//! Every [`Env::step`] runs `frame_skip` substeps of `timestep` seconds:
//!
//! 1. joint servos move towards their targets,
//! 2. the soles are placed on the terrain and the torso follows the soles
//!    that touch it,
//! 3. the torso tilts like an inverted pendulum once the centre of mass
//!    leaves the feet, and is held by the ankles otherwise,
//! 4. foot pressure is distributed over the eight FSRs.

use glam::{EulerRot, Quat};

use crate::env::{Env, WalkingEnv};
use crate::error::EnvError;
use crate::joints::{BodyJoints, Side, JOINT_COUNT};
use crate::kinematics::{self, LegPose, FOOT_LENGTH, FOOT_WIDTH};
use crate::rewards::{RewardInputs, RewardTerms};
use crate::terrain::Terrain;
use crate::tomatoes::TomatoThrower;
use crate::types::{Fsr, Marker, Segment, SegmentKind, Skeleton, Transition, Vec3};

const GRAVITY: f32 = 9.81;
const MASS: f32 = 5.305;
/// Maximum joint target offset reachable with an action of magnitude one.
const ACTION_SCALE: f32 = 0.5;
const SERVO_TIME_CONSTANT: f32 = 0.02;
const MAX_JOINT_VELOCITY: f32 = 6.0;
/// Height of the centre of mass above the torso origin.
const COM_OFFSET_Z: f32 = 0.02;
const TORSO_RADIUS: f32 = 0.06;
const HEAD_OFFSET_Z: f32 = 0.2;
const CONTACT_TOLERANCE: f32 = 0.002;
const ANKLE_STIFFNESS: f32 = 80.0;
const ANKLE_DAMPING: f32 = 12.0;
const MIN_PENDULUM_HEIGHT: f32 = 0.1;
const LYING_DAMPING: f32 = 0.9;
const MAX_TILT: f32 = std::f32::consts::FRAC_PI_2;
const ACCELERATION_FILTER: f32 = 0.2;
const FALL_TILT: f32 = 1.0;
const FALL_HEIGHT: f32 = 0.2;
const OBSERVATION_SIZE: usize = 2 * JOINT_COUNT + 3 + 3 + 8;
const SIDES: [Side; 2] = [Side::Left, Side::Right];
/// Length of ground drawn on either side of the torso.
const PROFILE_HALF_WIDTH: f32 = 2.0;

/// What holds the torso up during a substep.
#[derive(Copy, Clone, Debug)]
struct Support {
    /// Soles touching the ground, left then right.
    soles: [bool; 2],
    /// False while the robot is airborne.
    grounded: bool,
}

impl Support {
    fn on_feet(&self) -> bool {
        self.soles.contains(&true)
    }

    fn lying(&self) -> bool {
        self.grounded && !self.on_feet()
    }
}

/// Configuration for a [`NaoWalking`] environment
#[derive(Clone, Debug)]
pub struct NaoWalkingConfig {
    /// Throw tomatoes at the robot at random intervals
    pub throw_tomatoes: bool,
    /// Seed for terrain generation and tomato throws
    pub seed: u64,
    /// Physics substep length in seconds
    pub timestep: f32,
    /// Substeps per environment step
    pub frame_skip: usize,
    /// Steps after which an episode reports truncation
    pub max_episode_steps: usize,
}

impl Default for NaoWalkingConfig {
    fn default() -> Self {
        Self {
            throw_tomatoes: false,
            seed: 0,
            timestep: 0.004,
            frame_skip: 3, // 12 ms, the Nao's motion cycle
            max_episode_steps: 2500,
        }
    }
}

pub struct NaoWalking {
    config: NaoWalkingConfig,
    terrain: Terrain,
    tomatoes: Option<TomatoThrower>,

    joints: BodyJoints,
    joint_velocities: BodyJoints,
    targets: BodyJoints,

    position: Vec3,
    velocity: Vec3,
    roll: f32,
    pitch: f32,
    yaw: f32,
    /// Roll, pitch and yaw rates.
    angular_velocity: Vec3,

    /// World position where each sole touched down, while it stays in contact.
    anchors: [Option<Vec3>; 2],
    previous_sole_yaw: [f32; 2],
    vertical_acceleration: f32,
    fsr: [Fsr; 2],

    previous_action: Vec<f32>,
    episode_steps: usize,
    tomato_hits: u32,
    fallen: bool,
}

impl NaoWalking {
    /// Creates the environment on flat ground and resets it.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::InvalidTiming`] unless `timestep` is positive and
    /// finite and `frame_skip` is at least one.
    pub fn new(config: NaoWalkingConfig) -> Result<Self, EnvError> {
        if !(config.timestep.is_finite() && config.timestep > 0.0) || config.frame_skip == 0 {
            return Err(EnvError::InvalidTiming {
                timestep: config.timestep,
                frame_skip: config.frame_skip,
            });
        }
        let tomatoes = config
            .throw_tomatoes
            .then(|| TomatoThrower::new(config.seed.wrapping_add(1)));
        let mut env = Self {
            terrain: Terrain::flat(),
            tomatoes,
            joints: BodyJoints::STAND,
            joint_velocities: BodyJoints::default(),
            targets: BodyJoints::STAND,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            roll: 0.0,
            pitch: 0.0,
            yaw: 0.0,
            angular_velocity: Vec3::ZERO,
            anchors: [None; 2],
            previous_sole_yaw: [0.0; 2],
            vertical_acceleration: 0.0,
            fsr: [Fsr::default(); 2],
            previous_action: vec![0.0; JOINT_COUNT],
            episode_steps: 0,
            tomato_hits: 0,
            fallen: false,
            config,
        };
        env.reset();
        tracing::info!(
            dt = env.dt(),
            throw_tomatoes = env.config.throw_tomatoes,
            "Nao walking environment ready"
        );
        Ok(env)
    }

    #[must_use]
    pub fn config(&self) -> &NaoWalkingConfig {
        &self.config
    }

    #[must_use]
    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    #[must_use]
    pub fn joints(&self) -> &BodyJoints {
        &self.joints
    }

    #[must_use]
    pub fn torso_position(&self) -> Vec3 {
        self.position
    }

    /// Roll, pitch and yaw of the torso in radians.
    #[must_use]
    pub fn torso_orientation(&self) -> Vec3 {
        Vec3::new(self.roll, self.pitch, self.yaw)
    }

    /// Torso height above the ground directly below it.
    #[must_use]
    pub fn torso_height(&self) -> f32 {
        self.position.z - self.terrain.height_at(self.position.x, self.position.y)
    }

    #[must_use]
    pub fn tomatoes(&self) -> Option<&TomatoThrower> {
        self.tomatoes.as_ref()
    }

    #[must_use]
    pub fn episode_steps(&self) -> usize {
        self.episode_steps
    }

    #[must_use]
    pub fn has_fallen(&self) -> bool {
        self.roll.abs().max(self.pitch.abs()) > FALL_TILT || self.torso_height() < FALL_HEIGHT
    }

    fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::ZYX, self.yaw, self.pitch, self.roll)
    }

    fn center_of_mass(&self) -> Vec3 {
        self.position + Vec3::from(self.rotation() * glam::Vec3::new(0.0, 0.0, COM_OFFSET_Z))
    }

    fn leg_poses(&self) -> [LegPose; 2] {
        SIDES.map(|side| kinematics::leg_pose(side, self.joints.leg(side)))
    }

    /// Torso angular velocity in the torso frame, from the roll, pitch and
    /// yaw rates.
    fn body_rates(&self) -> Vec3 {
        euler_rates_to_body(self.roll, self.pitch, self.angular_velocity)
    }

    fn observation(&self) -> Vec<f32> {
        let gravity = self.rotation().inverse() * glam::Vec3::NEG_Z;
        let mut observation = Vec::with_capacity(OBSERVATION_SIZE);
        observation.extend(self.joints.to_array());
        observation.extend(self.joint_velocities.to_array());
        observation.extend(self.body_rates().to_array());
        observation.extend(gravity.to_array());
        observation.extend(self.fsr[0].to_array());
        observation.extend(self.fsr[1].to_array());
        observation
    }

    fn validate_action(action: &[f32]) -> Result<(), EnvError> {
        if action.len() != JOINT_COUNT {
            return Err(EnvError::ActionShape {
                expected: JOINT_COUNT,
                actual: action.len(),
            });
        }
        if let Some(index) = action.iter().position(|value| !value.is_finite()) {
            return Err(EnvError::NonFiniteAction { index });
        }
        Ok(())
    }

    fn substep(&mut self, h: f32) {
        self.update_joints(h);

        let rotation = self.rotation();
        let poses = self.leg_poses();
        let offsets = poses.map(|pose| Vec3::from(rotation * pose.sole));

        let old_vertical_velocity = self.velocity.z;
        let support = self.resolve_support(&offsets, h);
        self.follow_anchors(&offsets, support, h);
        self.update_yaw(&poses, support, h);
        self.update_tilt(&poses, &offsets, support, h);

        let raw_acceleration = (self.velocity.z - old_vertical_velocity) / h;
        self.vertical_acceleration += ACCELERATION_FILTER * (raw_acceleration - self.vertical_acceleration);
        self.update_fsr(&poses, &offsets, support.soles);
    }

    fn update_joints(&mut self, h: f32) {
        let blend = 1.0 - (-h / SERVO_TIME_CONSTANT).exp();
        let max_delta = MAX_JOINT_VELOCITY * h;
        let next = self
            .joints
            .zip_with(self.targets, |current, target| {
                current + ((target - current) * blend).clamp(-max_delta, max_delta)
            })
            .clamp_to_limits();
        self.joint_velocities = next.zip_with(self.joints, |new, old| (new - old) / h);
        self.joints = next;
    }

    /// Moves the torso vertically so neither the soles nor the torso sink
    /// into the ground.
    fn resolve_support(&mut self, offsets: &[Vec3; 2], h: f32) -> Support {
        let sole_support = offsets.map(|offset| {
            let foot = self.position + offset;
            self.terrain.height_at(foot.x, foot.y) - offset.z
        });
        let body_support = self.terrain.height_at(self.position.x, self.position.y) + TORSO_RADIUS;
        let support = sole_support[0].max(sole_support[1]).max(body_support);

        let free_velocity = self.velocity.z - GRAVITY * h;
        let free_height = self.position.z + free_velocity * h;
        if free_height > support {
            self.velocity.z = free_velocity;
            self.position.z = free_height;
            return Support {
                soles: [false; 2],
                grounded: false,
            };
        }

        self.velocity.z = (support - self.position.z) / h;
        self.position.z = support;
        Support {
            soles: sole_support.map(|height| height >= support - CONTACT_TOLERANCE),
            grounded: true,
        }
    }

    /// Soles in contact do not slip, so the torso is carried by them.
    fn follow_anchors(&mut self, offsets: &[Vec3; 2], support: Support, h: f32) {
        let mut carried = Vec3::ZERO;
        let mut count = 0;
        for (i, offset) in offsets.iter().enumerate() {
            if !support.soles[i] {
                self.anchors[i] = None;
                continue;
            }
            let anchor = *self.anchors[i].get_or_insert(self.position + *offset);
            carried += anchor - *offset;
            count += 1;
        }

        if count > 0 {
            let carried = carried * (1.0 / count as f32);
            self.velocity.x = (carried.x - self.position.x) / h;
            self.velocity.y = (carried.y - self.position.y) / h;
            self.position.x = carried.x;
            self.position.y = carried.y;
            return;
        }

        if support.lying() {
            self.velocity.x *= LYING_DAMPING;
            self.velocity.y *= LYING_DAMPING;
        }
        self.position.x += self.velocity.x * h;
        self.position.y += self.velocity.y * h;
    }

    /// Twisting the hip yaw of a stance leg turns the torso the other way.
    fn update_yaw(&mut self, poses: &[LegPose; 2], support: Support, h: f32) {
        let mut rate = 0.0;
        let mut count = 0;
        for (i, pose) in poses.iter().enumerate() {
            if support.soles[i] {
                rate -= (pose.sole_yaw - self.previous_sole_yaw[i]) / h;
                count += 1;
            }
            self.previous_sole_yaw[i] = pose.sole_yaw;
        }
        if count > 0 {
            self.angular_velocity.z = rate / count as f32;
        } else if support.lying() {
            self.angular_velocity.z = 0.0;
        }
        self.yaw += self.angular_velocity.z * h;
    }

    fn update_tilt(&mut self, poses: &[LegPose; 2], offsets: &[Vec3; 2], support: Support, h: f32) {
        let contacts = support.soles;
        let com = self.center_of_mass();
        let (mut roll_acceleration, mut pitch_acceleration) = (0.0, 0.0);

        if support.on_feet() {
            let (min, max) = self.support_bounds(poses, offsets, contacts);
            let inside = (min.x..=max.x).contains(&com.x) && (min.y..=max.y).contains(&com.y);
            let pressure_x = com.x.clamp(min.x, max.x);
            let pressure_y = com.y.clamp(min.y, max.y);
            let (offset_x, offset_y) = (com.x - pressure_x, com.y - pressure_y);

            let (yaw_sin, yaw_cos) = self.yaw.sin_cos();
            let forward = offset_x * yaw_cos + offset_y * yaw_sin;
            let left = -offset_x * yaw_sin + offset_y * yaw_cos;

            let mut sole_height = 0.0;
            let mut sole_pitch = 0.0;
            let mut sole_roll = 0.0;
            let mut count = 0.0;
            for (i, pose) in poses.iter().enumerate() {
                if contacts[i] {
                    sole_height += self.position.z + offsets[i].z;
                    sole_pitch += pose.sole_pitch;
                    sole_roll += pose.sole_roll;
                    count += 1.0;
                }
            }
            let pendulum_height = (com.z - sole_height / count).max(MIN_PENDULUM_HEIGHT);
            let gain = GRAVITY / (pendulum_height * pendulum_height);
            pitch_acceleration += gain * forward;
            roll_acceleration -= gain * left;

            // Ankles only hold the torso while the centre of mass is above the feet.
            if inside {
                let flat_pitch = -sole_pitch / count;
                let flat_roll = -sole_roll / count;
                pitch_acceleration +=
                    -ANKLE_STIFFNESS * (self.pitch - flat_pitch) - ANKLE_DAMPING * self.angular_velocity.y;
                roll_acceleration +=
                    -ANKLE_STIFFNESS * (self.roll - flat_roll) - ANKLE_DAMPING * self.angular_velocity.x;
            }
        } else if support.lying() {
            self.angular_velocity.x *= LYING_DAMPING;
            self.angular_velocity.y *= LYING_DAMPING;
        }

        self.angular_velocity.x += roll_acceleration * h;
        self.angular_velocity.y += pitch_acceleration * h;
        self.roll += self.angular_velocity.x * h;
        self.pitch += self.angular_velocity.y * h;

        if self.roll.abs() >= MAX_TILT {
            self.roll = self.roll.clamp(-MAX_TILT, MAX_TILT);
            self.angular_velocity.x = 0.0;
        }
        if self.pitch.abs() >= MAX_TILT {
            self.pitch = self.pitch.clamp(-MAX_TILT, MAX_TILT);
            self.angular_velocity.y = 0.0;
        }
    }

    /// Axis aligned bounds of the contacting soles in world coordinates.
    fn support_bounds(&self, poses: &[LegPose; 2], offsets: &[Vec3; 2], contacts: [bool; 2]) -> (Vec3, Vec3) {
        let mut min = Vec3::new(f32::INFINITY, f32::INFINITY, 0.0);
        let mut max = Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, 0.0);
        for (i, pose) in poses.iter().enumerate() {
            if !contacts[i] {
                continue;
            }
            let center = self.position + offsets[i];
            let (sin, cos) = (self.yaw + pose.sole_yaw).sin_cos();
            for (along, across) in [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)] {
                let a = along * FOOT_LENGTH / 2.0;
                let b = across * FOOT_WIDTH / 2.0;
                let x = center.x + a * cos - b * sin;
                let y = center.y + a * sin + b * cos;
                min.x = min.x.min(x);
                min.y = min.y.min(y);
                max.x = max.x.max(x);
                max.y = max.y.max(y);
            }
        }
        (min, max)
    }

    fn update_fsr(&mut self, poses: &[LegPose; 2], offsets: &[Vec3; 2], contacts: [bool; 2]) {
        self.fsr = [Fsr::default(); 2];
        if !contacts.contains(&true) {
            return;
        }

        let load = MASS * (GRAVITY + self.vertical_acceleration).max(0.0) / GRAVITY;
        let com = self.center_of_mass();
        let centers = offsets.map(|offset| self.position + offset);

        let shares = if contacts == [true, true] {
            let distance_left = com.planar_distance(centers[0]);
            let distance_right = com.planar_distance(centers[1]);
            let total = distance_left + distance_right;
            if total > f32::EPSILON {
                [distance_right / total, distance_left / total]
            } else {
                [0.5, 0.5]
            }
        } else if contacts[0] {
            [1.0, 0.0]
        } else {
            [0.0, 1.0]
        };

        for (i, pose) in poses.iter().enumerate() {
            if !contacts[i] {
                continue;
            }
            let foot_load = load * shares[i];
            let (sin, cos) = (self.yaw + pose.sole_yaw).sin_cos();
            let dx = com.x - centers[i].x;
            let dy = com.y - centers[i].y;
            let along = (dx * cos + dy * sin) / (FOOT_LENGTH / 2.0);
            let across = (-dx * sin + dy * cos) / (FOOT_WIDTH / 2.0);
            let front = (along.clamp(-1.0, 1.0) + 1.0) / 2.0;
            let left = (across.clamp(-1.0, 1.0) + 1.0) / 2.0;
            self.fsr[i] = Fsr {
                front_left: foot_load * front * left,
                front_right: foot_load * front * (1.0 - left),
                rear_left: foot_load * (1.0 - front) * left,
                rear_right: foot_load * (1.0 - front) * (1.0 - left),
            };
        }
    }

    fn apply_tomato_hits(&mut self, h: f32) {
        let Some(thrower) = self.tomatoes.as_mut() else {
            return;
        };
        let hits = thrower.update(h, self.position, TORSO_RADIUS, &self.terrain);
        if hits.is_empty() {
            return;
        }

        let com = self.center_of_mass();
        let ground = self.terrain.height_at(com.x, com.y);
        let pivot = Vec3::new(com.x, com.y, ground);
        let inertia = MASS * (com.z - ground).max(MIN_PENDULUM_HEIGHT).powi(2);

        for hit in &hits {
            let lever = glam::Vec3::from(hit.position - pivot);
            let torque = lever.cross(glam::Vec3::from(hit.impulse));
            self.angular_velocity.x += torque.x / inertia;
            self.angular_velocity.y += torque.y / inertia;
            self.velocity += hit.impulse * (1.0 / MASS);
        }
        self.tomato_hits += hits.len() as u32;
    }
}

impl Env for NaoWalking {
    fn step(&mut self, action: &[f32]) -> Result<Transition, EnvError> {
        Self::validate_action(action)?;

        let action = BodyJoints::from_slice(action)
            .ok_or(EnvError::ActionShape {
                expected: JOINT_COUNT,
                actual: action.len(),
            })?
            .map(|value| value.clamp(-1.0, 1.0));
        self.targets = BodyJoints::STAND
            .zip_with(action, |stand, value| stand + value * ACTION_SCALE)
            .clamp_to_limits();

        self.tomato_hits = 0;
        let start_x = self.position.x;
        for _ in 0..self.config.frame_skip {
            self.apply_tomato_hits(self.config.timestep);
            self.substep(self.config.timestep);
        }
        self.episode_steps += 1;

        let action = action.to_array();
        let action_change: f32 = action
            .iter()
            .zip(&self.previous_action)
            .map(|(new, old)| (new - old).powi(2))
            .sum();
        self.previous_action = action.to_vec();

        let terms = RewardTerms::compute(&RewardInputs {
            forward_velocity: (self.position.x - start_x) / self.dt(),
            roll: self.roll,
            pitch: self.pitch,
            torso_height: self.torso_height(),
            action_change,
            tomato_hits: self.tomato_hits,
        });

        let terminated = self.has_fallen();
        if terminated && !self.fallen {
            tracing::debug!(step = self.episode_steps, "robot fell");
        }
        self.fallen = terminated;

        Ok(Transition {
            observation: self.observation(),
            reward: terms.total(),
            terminated,
            truncated: self.episode_steps >= self.config.max_episode_steps,
            infos: terms.to_infos(),
        })
    }

    fn reset(&mut self) -> Vec<f32> {
        self.joints = BodyJoints::STAND;
        self.joint_velocities = BodyJoints::default();
        self.targets = BodyJoints::STAND;

        let sole_depth = self.leg_poses()[0].sole.z;
        self.position = Vec3::new(0.0, 0.0, self.terrain.height_at(0.0, 0.0) - sole_depth);
        self.velocity = Vec3::ZERO;
        self.roll = 0.0;
        self.pitch = 0.0;
        self.yaw = 0.0;
        self.angular_velocity = Vec3::ZERO;
        self.anchors = [None; 2];
        self.previous_sole_yaw = self.leg_poses().map(|pose| pose.sole_yaw);
        self.vertical_acceleration = 0.0;
        self.previous_action = vec![0.0; JOINT_COUNT];
        self.episode_steps = 0;
        self.tomato_hits = 0;
        self.fallen = false;
        if let Some(thrower) = self.tomatoes.as_mut() {
            thrower.reset();
        }

        // Settle once so contacts and foot pressure reflect the standing pose.
        self.substep(self.config.timestep);
        self.velocity = Vec3::ZERO;
        self.vertical_acceleration = 0.0;
        self.observation()
    }

    fn dt(&self) -> f32 {
        self.config.timestep * self.config.frame_skip as f32
    }

    fn obs_size(&self) -> usize {
        OBSERVATION_SIZE
    }

    fn action_size(&self) -> usize {
        JOINT_COUNT
    }
}

impl WalkingEnv for NaoWalking {
    fn left_fsr(&self) -> Fsr {
        self.fsr[0]
    }

    fn right_fsr(&self) -> Fsr {
        self.fsr[1]
    }

    fn gyroscope(&self) -> Vec3 {
        self.body_rates()
    }

    fn initialize_terrain(&mut self, max_height: f32, step_height: f32) -> Result<(), EnvError> {
        let mut rng = fastrand::Rng::with_seed(self.config.seed);
        self.terrain = Terrain::generate(max_height, step_height, &mut rng)?;
        tracing::info!(max_height, step_height, seed = self.config.seed, "terrain initialized");
        // Keep the robot on top of whatever is now under its feet.
        let ground = self.terrain.height_at(self.position.x, self.position.y);
        let sole_depth = self.leg_poses()[0].sole.z;
        self.position.z = self.position.z.max(ground - sole_depth);
        Ok(())
    }

    fn skeleton(&self) -> Skeleton {
        let rotation = self.rotation();
        let to_world = |p: glam::Vec3| self.position + Vec3::from(rotation * p);

        let mut segments = vec![Segment {
            from: to_world(glam::Vec3::new(0.0, 0.0, -kinematics::HIP_OFFSET_Z)),
            to: to_world(glam::Vec3::new(0.0, 0.0, HEAD_OFFSET_Z)),
            kind: SegmentKind::Torso,
        }];

        for (side, pose) in SIDES.iter().zip(self.leg_poses()) {
            let kind = match side {
                Side::Left => SegmentKind::LeftLeg,
                Side::Right => SegmentKind::RightLeg,
            };
            let toe = Quat::from_rotation_y(pose.sole_pitch) * glam::Vec3::new(FOOT_LENGTH / 2.0, 0.0, 0.0);
            let chain = [pose.hip, pose.knee, pose.ankle, pose.sole];
            for pair in chain.windows(2) {
                segments.push(Segment {
                    from: to_world(pair[0]),
                    to: to_world(pair[1]),
                    kind,
                });
            }
            segments.push(Segment {
                from: to_world(pose.sole - toe),
                to: to_world(pose.sole + toe),
                kind,
            });
        }

        // Ground profile along the walking direction.
        let cell = self.terrain.cell_size();
        let first_cell = (self.position.x / cell).floor() * cell - PROFILE_HALF_WIDTH;
        let cells = (2.0 * PROFILE_HALF_WIDTH / cell).round() as usize;
        let mut previous: Option<Vec3> = None;
        for index in 0..=cells {
            let x = first_cell + index as f32 * cell;
            let height = self.terrain.height_at(x + cell / 2.0, self.position.y);
            let start = Vec3::new(x, self.position.y, height);
            if let Some(previous) = previous {
                if (previous.z - height).abs() > f32::EPSILON {
                    segments.push(Segment { from: previous, to: start, kind: SegmentKind::Terrain });
                }
            }
            let end = Vec3::new(x + cell, self.position.y, height);
            segments.push(Segment { from: start, to: end, kind: SegmentKind::Terrain });
            previous = Some(end);
        }

        let markers = self
            .tomatoes
            .iter()
            .flat_map(TomatoThrower::in_flight)
            .map(|tomato| Marker {
                position: tomato.position,
                radius: crate::tomatoes::TOMATO_RADIUS,
            })
            .collect();

        Skeleton {
            segments,
            markers,
            focus: self.position,
        }
    }
}

/// Maps roll, pitch and yaw rates (ZYX Euler angles) to body rates.
fn euler_rates_to_body(roll: f32, pitch: f32, rates: Vec3) -> Vec3 {
    let (roll_sin, roll_cos) = roll.sin_cos();
    let (pitch_sin, pitch_cos) = pitch.sin_cos();
    Vec3::new(
        rates.x - rates.z * pitch_sin,
        rates.y * roll_cos + rates.z * roll_sin * pitch_cos,
        -rates.y * roll_sin + rates.z * roll_cos * pitch_cos,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn upright_rates_are_body_rates() {
        let rates = Vec3::new(0.1, -0.2, 0.3);
        assert!(close(euler_rates_to_body(0.0, 0.0, rates), rates));
    }

    #[test]
    fn gyroscope_reports_torso_frame_when_tilted() {
        let mut env = NaoWalking::new(NaoWalkingConfig::default()).unwrap();
        env.pitch = 1.2;
        env.angular_velocity = Vec3::new(0.0, 0.0, 1.0);
        let expected = Vec3::new(-(1.2f32).sin(), 0.0, (1.2f32).cos());
        assert!(close(env.gyroscope(), expected), "{:?}", env.gyroscope());

        let observation = env.observation();
        let gyro = &observation[2 * JOINT_COUNT..2 * JOINT_COUNT + 3];
        assert!(close(Vec3::new(gyro[0], gyro[1], gyro[2]), expected));
    }

    #[test]
    fn rates_keep_their_magnitude() {
        // Body rates are a rotation of the angular velocity vector.
        let rates = Vec3::new(0.0, 0.7, 0.0);
        let body = euler_rates_to_body(0.4, 0.0, rates);
        assert!((body.length() - 0.7).abs() < 1e-4);
        assert!(close(body, Vec3::new(0.0, 0.7 * (0.4f32).cos(), -0.7 * (0.4f32).sin())));
    }

    #[test]
    fn terrain_profile_stays_bounded_far_from_origin() {
        let mut env = NaoWalking::new(NaoWalkingConfig::default()).unwrap();
        env.position.x = 1.0e8;
        let terrain = env
            .skeleton()
            .segments
            .into_iter()
            .filter(|segment| segment.kind == SegmentKind::Terrain)
            .count();
        let cells = (2.0 * PROFILE_HALF_WIDTH / env.terrain.cell_size()).round() as usize + 1;
        assert!((1..=2 * cells).contains(&terrain), "{terrain} terrain segments");
    }

    #[test]
    fn rejects_unusable_timing() {
        for (timestep, frame_skip) in [(0.0, 3), (-0.004, 3), (f32::NAN, 3), (0.004, 0)] {
            let result = NaoWalking::new(NaoWalkingConfig {
                timestep,
                frame_skip,
                ..Default::default()
            });
            assert!(matches!(result, Err(EnvError::InvalidTiming { .. })));
        }
    }
}
