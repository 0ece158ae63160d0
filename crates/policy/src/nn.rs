use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Tanh,
    Relu,
    #[default]
    Identity,
}

impl Activation {
    #[must_use]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Tanh => x.tanh(),
            Activation::Relu => x.max(0.0),
            Activation::Identity => x,
        }
    }
}

/// A fully connected layer followed by an activation.
#[derive(Clone, Debug)]
pub struct Dense {
    /// Row-major `out_dim x in_dim` weight matrix.
    weights: Vec<f32>,
    bias: Vec<f32>,
    in_dim: usize,
    activation: Activation,
}

impl Dense {
    /// Builds a layer taking `in_dim` inputs; the output size is the bias
    /// length.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Shape`] when the weight count does not equal
    /// `bias.len() * in_dim` or the layer would be empty.
    pub fn new(
        weights: Vec<f32>,
        bias: Vec<f32>,
        in_dim: usize,
        activation: Activation,
    ) -> Result<Self, PolicyError> {
        if in_dim == 0 || bias.is_empty() {
            return Err(PolicyError::Shape(format!(
                "layer with {in_dim} inputs and {} outputs",
                bias.len()
            )));
        }
        if weights.len() != bias.len() * in_dim {
            return Err(PolicyError::Shape(format!(
                "{} weights for a {}x{in_dim} layer",
                weights.len(),
                bias.len()
            )));
        }
        Ok(Self {
            weights,
            bias,
            in_dim,
            activation,
        })
    }

    #[must_use]
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    #[must_use]
    pub fn out_dim(&self) -> usize {
        self.bias.len()
    }

    /// `activation(W x + b)`. `x` must have [`Dense::in_dim`] elements.
    #[must_use]
    pub fn forward(&self, x: &[f32]) -> Vec<f32> {
        debug_assert_eq!(x.len(), self.in_dim);
        self.weights
            .chunks_exact(self.in_dim)
            .zip(&self.bias)
            .map(|(row, bias)| {
                let sum: f32 = row.iter().zip(x).map(|(w, x)| w * x).sum();
                self.activation.apply(sum + bias)
            })
            .collect()
    }
}
