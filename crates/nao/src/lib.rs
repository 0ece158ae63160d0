#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
//! # Nao Walking Environment
//!
//! A reduced-order simulation of the Nao humanoid for locomotion experiments.
//!
//! The crate exposes a Gym-style [`Env`] interface plus the Nao specific
//! sensor accessors in [`WalkingEnv`], and a concrete environment,
//! [`NaoWalking`], implementing both.
//!
//! ## Model
//!
//! The robot is modelled as a torso carried by two six-joint legs. Joint
//! servos track position targets with a first-order lag, leg forward
//! kinematics place the soles, and the torso is held up by whichever soles
//! touch the [`Terrain`]. Tilt follows an inverted pendulum about the support
//! area: inside the feet the ankles hold the torso, outside it the robot tips
//! over. This is enough to drive foot-pressure and gyroscope signals that look
//! like the real robot's, and is not meant as a rigid-body solver.
//!
//! ## Usage
//!
//! ```rust
//! use nao::{Env, NaoWalking, NaoWalkingConfig};
//!
//! let mut env = NaoWalking::new(NaoWalkingConfig::default())?;
//! let observation = env.reset();
//! assert_eq!(observation.len(), env.obs_size());
//!
//! let action = vec![0.0; env.action_size()];
//! let transition = env.step(&action)?;
//! assert!(transition.reward.is_finite());
//! # Ok::<(), nao::EnvError>(())
//! ```

pub mod env;
pub mod error;
pub mod joints;
pub mod kinematics;
pub mod rewards;
pub mod terrain;
pub mod tomatoes;
pub mod types;
pub mod walking;

pub use env::{Env, WalkingEnv};
pub use error::EnvError;
pub use joints::{BodyJoints, LegJoints, Side};
pub use rewards::{RewardTerm, RewardTerms};
pub use terrain::Terrain;
pub use tomatoes::{Tomato, TomatoThrower};
pub use types::{Fsr, Infos, Marker, Segment, SegmentKind, Skeleton, Transition, Vec3};
pub use walking::{NaoWalking, NaoWalkingConfig};
