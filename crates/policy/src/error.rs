use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("failed to read policy file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse policy file")]
    Parse(#[from] serde_json::Error),
    #[error("inconsistent policy: {0}")]
    Shape(String),
    #[error("observation has {actual} elements, expected {expected}")]
    ObservationShape { expected: usize, actual: usize },
}
