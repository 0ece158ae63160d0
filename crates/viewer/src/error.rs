use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("figure '{figure}' has no line named '{line}'")]
    UnknownLine { figure: String, line: String },
    #[cfg(feature = "render")]
    #[error(transparent)]
    Window(#[from] anyhow::Error),
}
