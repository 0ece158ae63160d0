use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnvError {
    #[error("action has {actual} elements, expected {expected}")]
    ActionShape { expected: usize, actual: usize },
    #[error("action element {index} is not finite")]
    NonFiniteAction { index: usize },
    #[error("invalid terrain parameters: max_height={max_height}, step_height={step_height}")]
    InvalidTerrain { max_height: f32, step_height: f32 },
    #[error("invalid timing: timestep={timestep}, frame_skip={frame_skip}")]
    InvalidTiming { timestep: f32, frame_skip: usize },
}
