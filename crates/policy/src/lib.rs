#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::cast_precision_loss)]
//! Pretrained control policies.
//!
//! A [`Policy`] maps an observation vector to an action vector. The only
//! implementation shipped here is [`MlpPolicy`], a feed-forward actor network
//! exported to JSON by the training tooling (see [`file::PolicyFile`] for the
//! layout).

pub mod error;
pub mod file;
pub mod mlp;
pub mod nn;

pub use error::PolicyError;
pub use file::PolicyFile;
pub use mlp::MlpPolicy;
pub use nn::{Activation, Dense};

/// Something that picks actions.
pub trait Policy {
    /// Predicts an action for `observation`.
    ///
    /// With `deterministic` set the policy returns its most likely action,
    /// otherwise it may sample. The second element carries recurrent state
    /// and is `None` for feed-forward policies.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::ObservationShape`] when `observation` does not
    /// have [`Policy::observation_size`] elements.
    fn predict(
        &mut self,
        observation: &[f32],
        deterministic: bool,
    ) -> Result<(Vec<f32>, Option<Vec<f32>>), PolicyError>;

    fn observation_size(&self) -> usize;

    fn action_size(&self) -> usize;
}
