//! Error types shared across ClipMix crates.

use std::path::PathBuf;

/// Hint shown after any render failure.
pub const SHORT_CLIP_HINT: &str =
    "Very short source clips are the most common cause; try uploading longer clips.";

/// Top-level error type for ClipMix operations.
///
/// Every render stage has its own variant so the host can tell a broken
/// upload apart from an encoder failure while still showing the message
/// verbatim.
#[derive(Debug, thiserror::Error)]
pub enum ClipmixError {
    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Crop/trim error: {message}")]
    Transform { message: String },

    #[error("Concatenation error: {message}")]
    Concatenate { message: String },

    #[error("Encode error: {message}")]
    Encode { message: String },

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

/// Result type alias using ClipmixError.
pub type ClipmixResult<T> = Result<T, ClipmixError>;

/// The pipeline stage an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Decode,
    Transform,
    Concatenate,
    Encode,
    Setup,
}

impl FailureStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Decode => "decode",
            Self::Transform => "transform",
            Self::Concatenate => "concatenate",
            Self::Encode => "encode",
            Self::Setup => "setup",
        }
    }
}

impl ClipmixError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            message: msg.into(),
        }
    }

    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform {
            message: msg.into(),
        }
    }

    pub fn concatenate(msg: impl Into<String>) -> Self {
        Self::Concatenate {
            message: msg.into(),
        }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode {
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

    /// Which stage of the render produced this error.
    pub fn stage(&self) -> FailureStage {
        match self {
            Self::Decode { .. } | Self::FileNotFound { .. } => FailureStage::Decode,
            Self::Transform { .. } => FailureStage::Transform,
            Self::Concatenate { .. } => FailureStage::Concatenate,
            Self::Encode { .. } => FailureStage::Encode,
            _ => FailureStage::Setup,
        }
    }

    /// Generic hint shown alongside the verbatim failure message.
    pub fn user_hint(&self) -> &'static str {
        SHORT_CLIP_HINT
    }
}
