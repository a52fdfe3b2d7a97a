//! Error types for Glade

use thiserror::Error;

/// The main error type for Glade operations
#[derive(Debug, Error)]
pub enum GladeError {
    #[error("Terrain error: {0}")]
    TerrainError(String),

    #[error("Asset error: {0}")]
    AssetError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Audio error: {0}")]
    AudioError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for Glade operations
pub type Result<T> = std::result::Result<T, GladeError>;

impl From<toml::de::Error> for GladeError {
    fn from(err: toml::de::Error) -> Self {
        GladeError::ConfigError(err.to_string())
    }
}
