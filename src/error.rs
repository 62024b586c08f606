use thiserror::Error;

use crate::imagery::ImageryError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error: No shape drawn. Please draw a polygon or rectangle first.")]
    NoShapeDrawn,

    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("Imagery service error: {0}")]
    Imagery(#[from] ImageryError),
}

pub type Result<T> = std::result::Result<T, AppError>;
