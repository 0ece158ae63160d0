//! On-disk policy format.
//!
//! ```json
//! {
//!   "observation_size": 38,
//!   "action_size": 12,
//!   "layers": [
//!     { "weights": [...], "bias": [...], "activation": "tanh" },
//!     { "weights": [...], "bias": [...], "activation": "identity" }
//!   ],
//!   "log_std": [...],
//!   "normalization": { "mean": [...], "var": [...], "clip": 10.0, "epsilon": 1e-8 },
//!   "action_low": [...],
//!   "action_high": [...]
//! }
//! ```
//!
//! Weights are row-major with one row per output. Everything after `layers`
//! is optional.

use serde::{Deserialize, Serialize};

use crate::nn::Activation;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolicyFile {
    pub observation_size: usize,
    pub action_size: usize,
    pub layers: Vec<LayerFile>,
    /// Log standard deviation of the Gaussian action distribution.
    pub log_std: Option<Vec<f32>>,
    pub normalization: Option<Normalization>,
    pub action_low: Option<Vec<f32>>,
    pub action_high: Option<Vec<f32>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LayerFile {
    pub weights: Vec<f32>,
    pub bias: Vec<f32>,
    #[serde(default)]
    pub activation: Activation,
}

/// Running observation statistics collected during training.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Normalization {
    pub mean: Vec<f32>,
    pub var: Vec<f32>,
    #[serde(default = "default_clip")]
    pub clip: f32,
    #[serde(default = "default_epsilon")]
    pub epsilon: f32,
}

fn default_clip() -> f32 {
    10.0
}

fn default_epsilon() -> f32 {
    1e-8
}

impl Normalization {
    /// `clamp((x - mean) / sqrt(var + epsilon), -clip, clip)`, element-wise.
    #[must_use]
    pub fn apply(&self, observation: &[f32]) -> Vec<f32> {
        observation
            .iter()
            .zip(self.mean.iter().zip(&self.var))
            .map(|(x, (mean, var))| ((x - mean) / (var + self.epsilon).sqrt()).clamp(-self.clip, self.clip))
            .collect()
    }
}
