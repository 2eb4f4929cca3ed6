//! Viewer error type

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while bootstrapping the viewer or building its scene
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Failed to create window: {0}")]
    WindowCreation(String),
    #[error("Failed to create event loop: {0}")]
    EventLoop(String),
    #[error("Failed to create surface: {0}")]
    Surface(String),
    #[error("No suitable GPU adapter found")]
    Adapter,
    #[error("Failed to create device: {0}")]
    Device(String),
    #[error("Failed to load asset {path}: {reason}")]
    Asset { path: PathBuf, reason: String },
    #[error("Shader error: {0}")]
    Shader(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl ViewerError {
    pub(crate) fn asset(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ViewerError::Asset {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type ViewerResult<T> = Result<T, ViewerError>;
