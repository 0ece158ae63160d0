//! Reward shaping for the walking task.
//!
//! Each term is reported separately through [`crate::Infos`] so it can be
//! plotted; the step reward is their sum.

use crate::types::Infos;

/// Torso height above the ground in the standing pose.
pub const NOMINAL_TORSO_HEIGHT: f32 = 0.311;

const FORWARD_WEIGHT: f32 = 1.0;
const UPRIGHT_WEIGHT: f32 = 2.0;
const HEIGHT_WEIGHT: f32 = 10.0;
const ACTION_RATE_WEIGHT: f32 = 0.01;
const TOMATO_HIT_WEIGHT: f32 = 1.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RewardTerm {
    ForwardVelocity,
    Upright,
    TorsoHeight,
    ActionRate,
    TomatoHits,
}

impl RewardTerm {
    /// All terms in reporting order.
    pub const ALL: [Self; 5] = [
        Self::ForwardVelocity,
        Self::Upright,
        Self::TorsoHeight,
        Self::ActionRate,
        Self::TomatoHits,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ForwardVelocity => "forward_velocity",
            Self::Upright => "upright",
            Self::TorsoHeight => "torso_height",
            Self::ActionRate => "action_rate",
            Self::TomatoHits => "tomato_hits",
        }
    }
}

/// Inputs the reward terms are computed from.
#[derive(Copy, Clone, Debug, Default)]
pub struct RewardInputs {
    pub forward_velocity: f32,
    pub roll: f32,
    pub pitch: f32,
    pub torso_height: f32,
    /// Sum of squared differences between this and the previous action.
    pub action_change: f32,
    pub tomato_hits: u32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RewardTerms {
    values: [f32; RewardTerm::ALL.len()],
}

impl RewardTerms {
    #[must_use]
    pub fn compute(inputs: &RewardInputs) -> Self {
        let height_error = inputs.torso_height - NOMINAL_TORSO_HEIGHT;
        let values = RewardTerm::ALL.map(|term| match term {
            RewardTerm::ForwardVelocity => FORWARD_WEIGHT * inputs.forward_velocity,
            RewardTerm::Upright => -UPRIGHT_WEIGHT * (1.0 - inputs.roll.cos() * inputs.pitch.cos()),
            RewardTerm::TorsoHeight => -HEIGHT_WEIGHT * height_error * height_error,
            RewardTerm::ActionRate => -ACTION_RATE_WEIGHT * inputs.action_change,
            RewardTerm::TomatoHits => -TOMATO_HIT_WEIGHT * inputs.tomato_hits as f32,
        });
        Self { values }
    }

    #[must_use]
    pub fn get(&self, term: RewardTerm) -> f32 {
        let index = RewardTerm::ALL
            .iter()
            .position(|t| *t == term)
            .unwrap_or_default();
        self.values[index]
    }

    #[must_use]
    pub fn total(&self) -> f32 {
        self.values.iter().sum()
    }

    #[must_use]
    pub fn to_infos(&self) -> Infos {
        RewardTerm::ALL
            .iter()
            .zip(self.values)
            .map(|(term, value)| (term.name(), value))
            .collect()
    }
}
