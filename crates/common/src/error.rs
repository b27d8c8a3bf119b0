//! Error types shared across Obscura crates.

use std::path::PathBuf;

/// Top-level error type for Obscura operations.
#[derive(Debug, thiserror::Error)]
pub enum ObscuraError {
    #[error("Vision error: {message}")]
    Vision { message: String },

    #[error("Audio error: {message}")]
    Audio { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ObscuraError.
pub type ObscuraResult<T> = Result<T, ObscuraError>;

impl ObscuraError {
    pub fn vision(msg: impl Into<String>) -> Self {
        Self::Vision {
            message: msg.into(),
        }
    }

    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }
}
