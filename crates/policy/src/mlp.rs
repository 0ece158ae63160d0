use std::path::Path;

use crate::error::PolicyError;
use crate::file::{Normalization, PolicyFile};
use crate::nn::Dense;
use crate::Policy;

/// Feed-forward Gaussian actor.
pub struct MlpPolicy {
    layers: Vec<Dense>,
    observation_size: usize,
    action_size: usize,
    log_std: Option<Vec<f32>>,
    normalization: Option<Normalization>,
    action_low: Vec<f32>,
    action_high: Vec<f32>,
    rng: fastrand::Rng,
}

impl MlpPolicy {
    /// Reads a JSON policy file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, is not a valid policy file, or
    /// describes inconsistent layer shapes.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let policy = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            layers = policy.layers.len(),
            observation_size = policy.observation_size,
            action_size = policy.action_size,
            "policy loaded"
        );
        Ok(policy)
    }

    /// # Errors
    ///
    /// See [`MlpPolicy::load`].
    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        Self::from_file(serde_json::from_str(json)?)
    }

    /// Validates `file` and builds the network.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Shape`] when any size disagrees with the
    /// declared observation and action sizes.
    pub fn from_file(file: PolicyFile) -> Result<Self, PolicyError> {
        if file.layers.is_empty() {
            return Err(PolicyError::Shape("policy has no layers".into()));
        }

        let mut in_dim = file.observation_size;
        let mut layers = Vec::with_capacity(file.layers.len());
        for (index, layer) in file.layers.into_iter().enumerate() {
            let dense = Dense::new(layer.weights, layer.bias, in_dim, layer.activation)
                .map_err(|err| match err {
                    PolicyError::Shape(message) => PolicyError::Shape(format!("layer {index}: {message}")),
                    other => other,
                })?;
            in_dim = dense.out_dim();
            layers.push(dense);
        }
        if in_dim != file.action_size {
            return Err(PolicyError::Shape(format!(
                "network outputs {in_dim} values, expected {}",
                file.action_size
            )));
        }

        check_len("log_std", file.log_std.as_deref(), file.action_size)?;
        if let Some(normalization) = &file.normalization {
            check_len("normalization mean", Some(normalization.mean.as_slice()), file.observation_size)?;
            check_len("normalization var", Some(normalization.var.as_slice()), file.observation_size)?;
            if normalization.var.iter().any(|v| *v < 0.0) {
                return Err(PolicyError::Shape("negative normalization variance".into()));
            }
        }
        check_len("action_low", file.action_low.as_deref(), file.action_size)?;
        check_len("action_high", file.action_high.as_deref(), file.action_size)?;

        let action_low = file.action_low.unwrap_or_else(|| vec![-1.0; file.action_size]);
        let action_high = file.action_high.unwrap_or_else(|| vec![1.0; file.action_size]);
        if action_low.iter().zip(&action_high).any(|(low, high)| low > high) {
            return Err(PolicyError::Shape("action_low exceeds action_high".into()));
        }

        Ok(Self {
            layers,
            observation_size: file.observation_size,
            action_size: file.action_size,
            log_std: file.log_std,
            normalization: file.normalization,
            action_low,
            action_high,
            rng: fastrand::Rng::new(),
        })
    }

    /// Reseeds the sampler used for stochastic predictions.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    /// Mean of the action distribution before clipping.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::ObservationShape`] for a wrong-sized
    /// observation.
    pub fn mean_action(&self, observation: &[f32]) -> Result<Vec<f32>, PolicyError> {
        if observation.len() != self.observation_size {
            return Err(PolicyError::ObservationShape {
                expected: self.observation_size,
                actual: observation.len(),
            });
        }
        let mut x = match &self.normalization {
            Some(normalization) => normalization.apply(observation),
            None => observation.to_vec(),
        };
        for layer in &self.layers {
            x = layer.forward(&x);
        }
        Ok(x)
    }

    fn sample_normal(&self) -> f32 {
        // Box-Muller; 1 - u keeps the logarithm finite.
        let u1 = 1.0 - self.rng.f32();
        let u2 = self.rng.f32();
        (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos()
    }
}

impl Policy for MlpPolicy {
    fn predict(
        &mut self,
        observation: &[f32],
        deterministic: bool,
    ) -> Result<(Vec<f32>, Option<Vec<f32>>), PolicyError> {
        let mut action = self.mean_action(observation)?;
        if !deterministic {
            if let Some(log_std) = &self.log_std {
                for (value, log_std) in action.iter_mut().zip(log_std) {
                    *value += log_std.exp() * self.sample_normal();
                }
            }
        }
        for ((value, low), high) in action.iter_mut().zip(&self.action_low).zip(&self.action_high) {
            *value = value.clamp(*low, *high);
        }
        Ok((action, None))
    }

    fn observation_size(&self) -> usize {
        self.observation_size
    }

    fn action_size(&self) -> usize {
        self.action_size
    }
}

fn check_len(name: &str, values: Option<&[f32]>, expected: usize) -> Result<(), PolicyError> {
    match values {
        Some(values) if values.len() != expected => Err(PolicyError::Shape(format!(
            "{name} has {} elements, expected {expected}",
            values.len()
        ))),
        _ => Ok(()),
    }
}
