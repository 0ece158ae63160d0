use crate::error::EnvError;
use crate::types::{Fsr, Skeleton, Transition, Vec3};

/// Gym-style stepping interface shared by every environment the driver runs.
///
/// [`step`](Env::step) consumes one action vector and yields a
/// [`Transition`]; the driver never resets on its own, so `terminated` and
/// `truncated` are informational.
pub trait Env {
    /// Advance the environment by one action.
    ///
    /// # Errors
    ///
    /// Returns an [`EnvError`] when the action does not fit the action space.
    fn step(&mut self, action: &[f32]) -> Result<Transition, EnvError>;

    /// Puts the robot back into its starting pose and returns the first
    /// observation.
    fn reset(&mut self) -> Vec<f32>;

    /// Simulated time covered by one [`Env::step`], in seconds.
    fn dt(&self) -> f32;

    /// Size of the observation vector.
    fn obs_size(&self) -> usize;

    /// Size of the action space.
    fn action_size(&self) -> usize;
}

/// Sensors and scene access of a walking robot environment.
pub trait WalkingEnv: Env {
    fn left_fsr(&self) -> Fsr;

    fn right_fsr(&self) -> Fsr;

    /// Torso angular velocity in rad/s, expressed in the torso frame.
    fn gyroscope(&self) -> Vec3;

    /// Replaces the ground with stepped terrain.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::InvalidTerrain`] for unusable parameters.
    fn initialize_terrain(&mut self, _max_height: f32, _step_height: f32) -> Result<(), EnvError> {
        Ok(())
    }

    /// Drawing primitives for the current state.
    fn skeleton(&self) -> Skeleton {
        Skeleton::default()
    }
}
