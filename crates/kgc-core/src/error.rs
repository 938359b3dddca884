use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to read archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to watch directory: {0}")]
    Watch(#[from] notify::Error),

    #[error("Path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("No project selected")]
    NoProject,

    #[error("Heroes directory not found: {0}")]
    HeroesDirMissing(&'static str),

    #[error("Hero not found: {0}")]
    HeroNotFound(String),

    #[error("Could not parse sprite dimensions from asset file")]
    Descriptor,

    #[error("Invalid crop region: {0}")]
    InvalidCrop(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{tool} failed: {message}")]
    Tool { tool: &'static str, message: String },

    #[error("{0} timed out after {1} seconds")]
    Timeout(&'static str, u64),
}

pub type Result<T> = std::result::Result<T, CoreError>;
