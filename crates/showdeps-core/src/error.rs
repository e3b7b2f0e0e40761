use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShowdepsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no saved query found at {}; run a report (filter) first", .0.display())]
    MissingState(PathBuf),

    #[error("task command failed: {0}")]
    Collaborator(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("your system platform could not be determined to open image ({0})")]
    PlatformUnsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ShowdepsResult<T> = Result<T, ShowdepsError>;
